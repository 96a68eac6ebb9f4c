use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// A behavior tag carried by a cell.
///
/// The first three are *primary* traits and may be a cell's main trait. The
/// last three are auxiliary modifiers that only ever appear as secondary tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TraitTag {
    /// Grazes on plant food.
    Herbivore,
    /// Hunts other cells.
    Carnivore,
    /// Grazes and hunts.
    Omnivore,
    /// Speed multiplier.
    Fast,
    /// Energy-loss multiplier.
    Efficient,
    /// Strength multiplier.
    Strong,
}

impl TraitTag {
    /// Every tag, in table order.
    pub const ALL: [TraitTag; 6] = [
        Self::Herbivore,
        Self::Carnivore,
        Self::Omnivore,
        Self::Fast,
        Self::Efficient,
        Self::Strong,
    ];

    /// Tags that may act as a cell's main trait.
    pub const PRIMARY: [TraitTag; 3] = [Self::Herbivore, Self::Carnivore, Self::Omnivore];

    /// Modifier tags toggled by mutation.
    pub const AUXILIARY: [TraitTag; 3] = [Self::Fast, Self::Efficient, Self::Strong];

    /// `true` for `FAST`, `EFFICIENT` and `STRONG`.
    pub fn is_auxiliary(self) -> bool {
        matches!(self, Self::Fast | Self::Efficient | Self::Strong)
    }

    /// Parse a tag name, ignoring case.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "HERBIVORE" => Some(Self::Herbivore),
            "CARNIVORE" => Some(Self::Carnivore),
            "OMNIVORE" => Some(Self::Omnivore),
            "FAST" => Some(Self::Fast),
            "EFFICIENT" => Some(Self::Efficient),
            "STRONG" => Some(Self::Strong),
            _ => None,
        }
    }

    fn index(self) -> usize {
        match self {
            Self::Herbivore => 0,
            Self::Carnivore => 1,
            Self::Omnivore => 2,
            Self::Fast => 3,
            Self::Efficient => 4,
            Self::Strong => 5,
        }
    }
}

impl FromStr for TraitTag {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| CoreError::UnknownTrait(s.to_string()))
    }
}

impl fmt::Display for TraitTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Herbivore => write!(f, "HERBIVORE"),
            Self::Carnivore => write!(f, "CARNIVORE"),
            Self::Omnivore => write!(f, "OMNIVORE"),
            Self::Fast => write!(f, "FAST"),
            Self::Efficient => write!(f, "EFFICIENT"),
            Self::Strong => write!(f, "STRONG"),
        }
    }
}

/// What a food particle is made of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FoodKind {
    /// Plant matter, the only food the arena spawns.
    Plant,
}

impl fmt::Display for FoodKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plant => write!(f, "PLANT"),
        }
    }
}

/// Behavior parameters for one trait tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraitDescriptor {
    /// Radius of a cell whose main trait is this tag.
    pub base_size: f64,
    /// Speed of a cell whose main trait is this tag.
    pub base_speed: f64,
    /// Strength contributed by this tag (halved when secondary).
    pub strength: f64,
    /// Energy lost per reference frame.
    #[serde(alias = "energyLossPerTick")]
    pub energy_loss: f64,
    /// Food kinds this tag feeds on.
    #[serde(default)]
    pub eats: BTreeSet<FoodKind>,
    /// Main traits this tag preys on.
    #[serde(default)]
    pub hunts: BTreeSet<TraitTag>,
    /// Main traits this tag may merge with.
    #[serde(default)]
    pub compatible_with: BTreeSet<TraitTag>,
    /// `FAST` speed multiplier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed_bonus: Option<f64>,
    /// `EFFICIENT` energy-loss multiplier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loss_factor: Option<f64>,
    /// `STRONG` strength multiplier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strength_bonus: Option<f64>,
}

impl TraitDescriptor {
    fn basic(base_size: f64, base_speed: f64, strength: f64, energy_loss: f64) -> Self {
        Self {
            base_size,
            base_speed,
            strength,
            energy_loss,
            eats: BTreeSet::new(),
            hunts: BTreeSet::new(),
            compatible_with: BTreeSet::new(),
            speed_bonus: None,
            loss_factor: None,
            strength_bonus: None,
        }
    }

    /// `true` if this tag feeds on `kind`.
    pub fn eats(&self, kind: FoodKind) -> bool {
        self.eats.contains(&kind)
    }

    /// `true` if this tag preys on cells whose main trait is `prey`.
    pub fn hunts(&self, prey: TraitTag) -> bool {
        self.hunts.contains(&prey)
    }

    /// `true` if this tag lists `other` as a merge partner.
    pub fn is_compatible_with(&self, other: TraitTag) -> bool {
        self.compatible_with.contains(&other)
    }

    fn validate(&self, tag: TraitTag) -> CoreResult<()> {
        let check = |field: &'static str, value: f64, positive: bool| {
            let ok = value.is_finite() && if positive { value > 0.0 } else { value >= 0.0 };
            if ok {
                Ok(())
            } else {
                Err(CoreError::InvalidDescriptor { tag, field, value })
            }
        };
        check("baseSize", self.base_size, true)?;
        check("baseSpeed", self.base_speed, false)?;
        check("strength", self.strength, false)?;
        check("energyLoss", self.energy_loss, false)?;
        if let Some(v) = self.speed_bonus {
            check("speedBonus", v, false)?;
        }
        if let Some(v) = self.loss_factor {
            check("lossFactor", v, false)?;
        }
        if let Some(v) = self.strength_bonus {
            check("strengthBonus", v, false)?;
        }
        Ok(())
    }
}

/// Read-only lookup from trait tag to [`TraitDescriptor`].
///
/// Every tag is guaranteed to have a descriptor, so [`TraitTable::get`] never
/// fails.
#[derive(Debug, Clone, PartialEq)]
pub struct TraitTable {
    descriptors: Vec<TraitDescriptor>,
}

impl Default for TraitTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl TraitTable {
    /// The stock ecology: herbivores graze, carnivores hunt both others,
    /// omnivores do a little of each.
    pub fn builtin() -> Self {
        use TraitTag::*;

        let mut herbivore = TraitDescriptor::basic(6.0, 1.5, 20.0, 0.1);
        herbivore.eats.insert(FoodKind::Plant);
        herbivore.compatible_with.insert(Omnivore);

        let mut carnivore = TraitDescriptor::basic(9.0, 2.0, 80.0, 0.2);
        carnivore.hunts.extend([Herbivore, Omnivore]);
        carnivore.compatible_with.insert(Omnivore);

        let mut omnivore = TraitDescriptor::basic(7.5, 1.7, 45.0, 0.15);
        omnivore.eats.insert(FoodKind::Plant);
        omnivore.hunts.insert(Herbivore);
        omnivore.compatible_with.extend([Herbivore, Carnivore]);

        let mut fast = TraitDescriptor::basic(5.0, 3.0, 10.0, 0.2);
        fast.speed_bonus = Some(1.5);

        let mut efficient = TraitDescriptor::basic(5.0, 1.0, 10.0, 0.05);
        efficient.loss_factor = Some(0.5);

        let mut strong = TraitDescriptor::basic(8.0, 1.0, 30.0, 0.2);
        strong.strength_bonus = Some(1.5);

        Self {
            descriptors: vec![herbivore, carnivore, omnivore, fast, efficient, strong],
        }
    }

    /// Build a table from a descriptor per tag, rejecting gaps and
    /// non-finite or negative values.
    pub fn from_descriptors(mut map: BTreeMap<TraitTag, TraitDescriptor>) -> CoreResult<Self> {
        let mut descriptors = Vec::with_capacity(TraitTag::ALL.len());
        for tag in TraitTag::ALL {
            let descriptor = map.remove(&tag).ok_or(CoreError::MissingDescriptor(tag))?;
            descriptor.validate(tag)?;
            descriptors.push(descriptor);
        }
        Ok(Self { descriptors })
    }

    /// Parse a JSON object keyed by tag name (e.g. `"HERBIVORE"`).
    pub fn from_json(json: &str) -> CoreResult<Self> {
        let map: BTreeMap<TraitTag, TraitDescriptor> = serde_json::from_str(json)?;
        Self::from_descriptors(map)
    }

    /// Serialize to the same JSON shape [`TraitTable::from_json`] reads.
    pub fn to_json_pretty(&self) -> CoreResult<String> {
        let map: BTreeMap<TraitTag, &TraitDescriptor> = self.iter().collect();
        Ok(serde_json::to_string_pretty(&map)?)
    }

    /// Descriptor for `tag`.
    pub fn get(&self, tag: TraitTag) -> &TraitDescriptor {
        &self.descriptors[tag.index()]
    }

    /// All `(tag, descriptor)` pairs in table order.
    pub fn iter(&self) -> impl Iterator<Item = (TraitTag, &TraitDescriptor)> {
        TraitTag::ALL.into_iter().zip(self.descriptors.iter())
    }

    /// `true` when each trait lists the other as a merge partner.
    pub fn mutually_compatible(&self, a: TraitTag, b: TraitTag) -> bool {
        self.get(a).is_compatible_with(b) && self.get(b).is_compatible_with(a)
    }

    /// The largest radius any cell can have under this table.
    pub fn largest_radius(&self) -> f64 {
        TraitTag::PRIMARY
            .iter()
            .map(|t| self.get(*t).base_size)
            .fold(0.0, f64::max)
    }
}

/// Ordered, duplicate-free, non-empty trait sequence.
///
/// Index 0 is the main trait and is always a primary tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<TraitTag>", into = "Vec<TraitTag>")]
pub struct TraitSet(Vec<TraitTag>);

impl TraitSet {
    /// A sequence holding only `main`.
    ///
    /// # Panics
    /// Debug builds assert that `main` is a primary tag.
    pub fn single(main: TraitTag) -> Self {
        debug_assert!(!main.is_auxiliary(), "{main} cannot be a main trait");
        Self(vec![main])
    }

    /// Build from tags in order, collapsing duplicates onto their first
    /// occurrence.
    pub fn new(tags: impl IntoIterator<Item = TraitTag>) -> CoreResult<Self> {
        let mut out: Vec<TraitTag> = Vec::new();
        for tag in tags {
            if !out.contains(&tag) {
                out.push(tag);
            }
        }
        match out.first() {
            None => Err(CoreError::EmptyTraits),
            Some(main) if main.is_auxiliary() => Err(CoreError::AuxiliaryMainTrait(*main)),
            Some(_) => Ok(Self(out)),
        }
    }

    /// The main trait.
    pub fn main(&self) -> TraitTag {
        self.0[0]
    }

    /// Every tag after the main trait.
    pub fn secondary(&self) -> &[TraitTag] {
        &self.0[1..]
    }

    /// `true` if `tag` is anywhere in the sequence.
    pub fn contains(&self, tag: TraitTag) -> bool {
        self.0.contains(&tag)
    }

    /// Number of tags, at least one.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always `false`; kept for API symmetry with collections.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The tags as a slice.
    pub fn as_slice(&self) -> &[TraitTag] {
        &self.0
    }

    /// Iterate over the tags in order.
    pub fn iter(&self) -> impl Iterator<Item = TraitTag> + '_ {
        self.0.iter().copied()
    }

    /// This sequence followed by the tags of `other` it does not already
    /// hold.
    pub fn union(&self, other: &TraitSet) -> TraitSet {
        let mut out = self.0.clone();
        for tag in other.iter() {
            if !out.contains(&tag) {
                out.push(tag);
            }
        }
        TraitSet(out)
    }

    /// Swap the main trait for another primary tag, dropping any later copy of
    /// it so the sequence stays duplicate-free.
    pub fn replace_main(&mut self, main: TraitTag) {
        debug_assert!(!main.is_auxiliary(), "{main} cannot be a main trait");
        self.0[0] = main;
        let mut i = 1;
        while i < self.0.len() {
            if self.0[i] == main {
                self.0.remove(i);
            } else {
                i += 1;
            }
        }
    }

    /// Add an auxiliary tag if absent, remove it if present.
    pub fn toggle(&mut self, tag: TraitTag) {
        debug_assert!(tag.is_auxiliary(), "only auxiliary tags toggle");
        if let Some(pos) = self.0.iter().skip(1).position(|t| *t == tag) {
            self.0.remove(pos + 1);
        } else {
            self.0.push(tag);
        }
    }
}

impl TryFrom<Vec<TraitTag>> for TraitSet {
    type Error = CoreError;

    fn try_from(tags: Vec<TraitTag>) -> Result<Self, Self::Error> {
        Self::new(tags)
    }
}

impl From<TraitSet> for Vec<TraitTag> {
    fn from(set: TraitSet) -> Self {
        set.0
    }
}

impl fmt::Display for TraitSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self.0.iter().map(|t| t.to_string()).collect();
        write!(f, "{}", names.join("+"))
    }
}
