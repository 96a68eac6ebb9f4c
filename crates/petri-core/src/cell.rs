use glam::DVec2;
use rand::Rng;

use crate::entity::{EntityId, IdAllocator};
use crate::food::Food;
use crate::resolve::{DerivedStats, Receptor};
use crate::traits::{TraitSet, TraitTable, TraitTag};

/// Energy ceiling; also the energy every new cell starts with.
pub const MAX_ENERGY: f64 = 100.0;
/// Energy a predator gains from a kill before pressure scaling.
pub const PREDATION_ENERGY_GAIN: f64 = 50.0;
/// Default energy above which a cell reproduces.
pub const DEFAULT_REPRODUCTION_THRESHOLD: f64 = 80.0;
/// Fraction of its energy a parent keeps after reproducing.
pub const REPRODUCTION_ENERGY_KEPT: f64 = 0.5;
/// Offspring spawn within this distance of the parent on each axis.
pub const OFFSPRING_JITTER: f64 = 10.0;
/// Default speed multiplier applied to the survivor of a merge.
pub const DEFAULT_MERGE_SPEED_MULTIPLIER: f64 = 1.5;

/// A neighbor handed to a cell for targeting or interaction.
#[derive(Debug, Clone, Copy)]
pub enum Neighbor<'a> {
    /// Another cell.
    Cell(&'a Cell),
    /// A food particle.
    Food(&'a Food),
}

impl Neighbor<'_> {
    /// The neighbor's id.
    pub fn id(&self) -> EntityId {
        match self {
            Self::Cell(c) => c.id,
            Self::Food(f) => f.id,
        }
    }

    /// The neighbor's center.
    pub fn position(&self) -> DVec2 {
        match self {
            Self::Cell(c) => c.position,
            Self::Food(f) => f.position,
        }
    }
}

/// The nearest thing a cell wants to move toward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Target {
    /// Id of the food or prey.
    pub id: EntityId,
    /// Where it is.
    pub position: DVec2,
    /// Euclidean distance from the seeker.
    pub distance: f64,
}

/// A destructive outcome of one cell touching a neighbor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interaction {
    /// The cell ate the food with this id.
    Ate(EntityId),
    /// The cell killed and ate the cell with this id.
    Preyed(EntityId),
    /// The cell absorbed the cell with this id.
    Merged(EntityId),
}

/// Tunables for [`Cell::interact`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InteractionRules {
    /// Energy gained per kill.
    pub predation_gain: f64,
    /// Speed multiplier applied to a merge survivor.
    pub merge_speed_multiplier: f64,
}

impl Default for InteractionRules {
    fn default() -> Self {
        Self {
            predation_gain: PREDATION_ENERGY_GAIN,
            merge_speed_multiplier: DEFAULT_MERGE_SPEED_MULTIPLIER,
        }
    }
}

/// Per-tick inputs for [`Cell::update`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UpdateParams {
    /// Arena width and height.
    pub arena: DVec2,
    /// Multiplier on the cell's own energy loss this tick.
    pub energy_decay_scale: f64,
    /// Energy above which the cell reproduces.
    pub reproduction_threshold: f64,
    /// Per-mutation probability for offspring.
    pub mutation_rate: f64,
}

impl UpdateParams {
    /// Defaults for an arena of the given size: unit decay, threshold 80, no
    /// mutation.
    pub fn for_arena(arena: DVec2) -> Self {
        Self {
            arena,
            energy_decay_scale: 1.0,
            reproduction_threshold: DEFAULT_REPRODUCTION_THRESHOLD,
            mutation_rate: 0.0,
        }
    }
}

/// A newborn cell and whether its traits mutated at birth.
#[derive(Debug, Clone)]
pub struct Offspring {
    /// The new cell.
    pub cell: Cell,
    /// `true` if mutation changed the inherited traits.
    pub mutated: bool,
}

/// An autonomous agent in the arena.
///
/// Radius, speed, strength, energy loss and receptors are derived from the
/// trait sequence and recomputed every time it changes.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    /// Unique id.
    pub id: EntityId,
    /// Center position.
    pub position: DVec2,
    /// Displacement per tick.
    pub velocity: DVec2,
    /// Lineage depth: 0 for seeded cells, parent + 1 for offspring.
    pub generation: u32,
    traits: TraitSet,
    energy: f64,
    radius: f64,
    speed: f64,
    strength: f64,
    energy_loss: f64,
    receptors: Vec<Receptor>,
}

impl Cell {
    /// A full-energy cell with a random heading.
    pub fn new<R: Rng + ?Sized>(
        id: EntityId,
        position: DVec2,
        traits: TraitSet,
        table: &TraitTable,
        rng: &mut R,
    ) -> Self {
        let velocity = DVec2::new(rng.random_range(-1.0..1.0), rng.random_range(-1.0..1.0));
        Self::with_velocity(id, position, velocity, traits, table)
    }

    /// A full-energy cell with a fixed heading.
    pub fn with_velocity(
        id: EntityId,
        position: DVec2,
        velocity: DVec2,
        traits: TraitSet,
        table: &TraitTable,
    ) -> Self {
        let stats = DerivedStats::resolve(&traits, table);
        Self {
            id,
            position,
            velocity,
            generation: 0,
            traits,
            energy: MAX_ENERGY,
            radius: stats.radius,
            speed: stats.speed,
            strength: stats.strength,
            energy_loss: stats.energy_loss,
            receptors: stats.receptors,
        }
    }

    /// Set the starting energy, clamped to `[0, 100]`.
    pub fn with_energy(mut self, energy: f64) -> Self {
        self.set_energy(energy);
        self
    }

    /// The trait sequence.
    pub fn traits(&self) -> &TraitSet {
        &self.traits
    }

    /// The main trait.
    pub fn main_trait(&self) -> TraitTag {
        self.traits.main()
    }

    /// Current energy in `[0, 100]`.
    pub fn energy(&self) -> f64 {
        self.energy
    }

    /// Body radius.
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Movement speed per tick.
    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// Combat strength.
    pub fn strength(&self) -> f64 {
        self.strength
    }

    /// Energy lost per reference frame.
    pub fn energy_loss(&self) -> f64 {
        self.energy_loss
    }

    /// Receptor layout for renderers.
    pub fn receptors(&self) -> &[Receptor] {
        &self.receptors
    }

    /// `true` while the cell has energy left.
    pub fn is_alive(&self) -> bool {
        self.energy > 0.0
    }

    /// Replace the trait sequence and recompute every derived stat.
    pub fn set_traits(&mut self, traits: TraitSet, table: &TraitTable) {
        let stats = DerivedStats::resolve(&traits, table);
        self.traits = traits;
        self.radius = stats.radius;
        self.speed = stats.speed;
        self.strength = stats.strength;
        self.energy_loss = stats.energy_loss;
        self.receptors = stats.receptors;
    }

    /// Overwrite energy, clamped to `[0, 100]`.
    pub fn set_energy(&mut self, energy: f64) {
        self.energy = energy.clamp(0.0, MAX_ENERGY);
    }

    /// Add energy, capped at 100.
    pub fn gain_energy(&mut self, amount: f64) {
        self.energy = (self.energy + amount).min(MAX_ENERGY);
    }

    /// Remove energy, floored at 0.
    pub fn drain_energy(&mut self, amount: f64) {
        self.energy = (self.energy - amount).max(0.0);
    }

    /// `true` if a circle at `center` with `radius` overlaps this cell.
    pub fn overlaps(&self, center: DVec2, radius: f64) -> bool {
        self.position.distance(center) < self.radius + radius
    }

    /// `true` if this cell's main trait hunts `prey`'s main trait and this
    /// cell is strictly stronger.
    pub fn can_hunt(&self, prey: &Cell, table: &TraitTable) -> bool {
        prey.id != self.id
            && table.get(self.main_trait()).hunts(prey.main_trait())
            && self.strength > prey.strength
    }

    /// `true` if both cells are single-trait and mutually compatible.
    pub fn can_merge_with(&self, other: &Cell, table: &TraitTable) -> bool {
        other.id != self.id
            && self.traits.len() == 1
            && other.traits.len() == 1
            && table.mutually_compatible(self.main_trait(), other.main_trait())
    }

    /// The nearest edible food or huntable cell among `neighbors`.
    ///
    /// Ties keep the earliest neighbor in the supplied order.
    pub fn find_target(&self, neighbors: &[Neighbor<'_>], table: &TraitTable) -> Option<Target> {
        let diet = table.get(self.main_trait());
        let mut best: Option<Target> = None;
        for neighbor in neighbors {
            let eligible = match neighbor {
                Neighbor::Food(food) => diet.eats(food.kind),
                Neighbor::Cell(cell) => self.can_hunt(cell, table),
            };
            if !eligible {
                continue;
            }
            let position = neighbor.position();
            let distance = self.position.distance(position);
            if best.is_none_or(|b| distance < b.distance) {
                best = Some(Target {
                    id: neighbor.id(),
                    position,
                    distance,
                });
            }
        }
        best
    }

    /// Point the velocity at `target` at full speed. Without a target the
    /// previous heading is kept.
    pub fn steer(&mut self, target: Option<DVec2>) {
        let Some(target) = target else {
            return;
        };
        let delta = target - self.position;
        let distance = delta.length();
        if distance > 0.0 {
            self.velocity = delta / distance * self.speed;
        }
    }

    /// Integrate velocity once and bounce off the arena walls.
    pub fn advance(&mut self, arena: DVec2) {
        self.position += self.velocity;
        let r = self.radius;
        if self.position.x + r > arena.x || self.position.x - r < 0.0 {
            self.velocity.x = -self.velocity.x;
            self.position.x = self.position.x.min(arena.x - r).max(r);
        }
        if self.position.y + r > arena.y || self.position.y - r < 0.0 {
            self.velocity.y = -self.velocity.y;
            self.position.y = self.position.y.min(arena.y - r).max(r);
        }
    }

    /// Resolve contact with one neighbor.
    ///
    /// Food is eaten if the diet allows it; a cell is preyed on if huntable,
    /// otherwise absorbed if merge-compatible. Returns the outcome, if any,
    /// after applying its effect to `self`. The caller owns the
    /// neighbor's removal.
    pub fn interact(
        &mut self,
        other: Neighbor<'_>,
        table: &TraitTable,
        rules: &InteractionRules,
    ) -> Option<Interaction> {
        match other {
            Neighbor::Food(food) => {
                if table.get(self.main_trait()).eats(food.kind)
                    && self.overlaps(food.position, food.radius)
                {
                    self.gain_energy(food.energy);
                    return Some(Interaction::Ate(food.id));
                }
                None
            }
            Neighbor::Cell(cell) => {
                if cell.id == self.id || !self.overlaps(cell.position, cell.radius) {
                    return None;
                }
                if self.can_hunt(cell, table) {
                    self.gain_energy(rules.predation_gain);
                    return Some(Interaction::Preyed(cell.id));
                }
                if self.can_merge_with(cell, table) {
                    self.absorb(cell, table, rules.merge_speed_multiplier);
                    return Some(Interaction::Merged(cell.id));
                }
                None
            }
        }
    }

    /// Fuse `other` into this cell: traits are unioned, half of its energy is
    /// taken, and the current speed is scaled by `speed_multiplier`.
    pub fn absorb(&mut self, other: &Cell, table: &TraitTable, speed_multiplier: f64) {
        let speed = self.speed;
        let traits = self.traits.union(&other.traits);
        self.set_traits(traits, table);
        self.speed = speed * speed_multiplier;
        self.gain_energy(other.energy / 2.0);
    }

    /// One tick of movement, decay and reproduction.
    ///
    /// `neighbors` must already exclude anything removed earlier in the tick.
    pub fn update<R: Rng + ?Sized>(
        &mut self,
        neighbors: &[Neighbor<'_>],
        table: &TraitTable,
        params: &UpdateParams,
        ids: &mut IdAllocator,
        rng: &mut R,
    ) -> Option<Offspring> {
        let target = self.find_target(neighbors, table).map(|t| t.position);
        self.steer(target);
        self.advance(params.arena);
        self.drain_energy(self.energy_loss * params.energy_decay_scale);

        if self.energy > params.reproduction_threshold {
            return Some(self.reproduce(ids.next_id(), table, params, rng));
        }
        None
    }

    /// Spawn a child near this cell and halve this cell's energy.
    ///
    /// The child inherits the trait sequence, starts at full energy and may
    /// mutate at `params.mutation_rate`.
    pub fn reproduce<R: Rng + ?Sized>(
        &mut self,
        child_id: EntityId,
        table: &TraitTable,
        params: &UpdateParams,
        rng: &mut R,
    ) -> Offspring {
        debug_assert!(!self.traits.is_empty(), "cell {} has no main trait", self.id);

        let jitter = DVec2::new(
            rng.random_range(-OFFSPRING_JITTER..OFFSPRING_JITTER),
            rng.random_range(-OFFSPRING_JITTER..OFFSPRING_JITTER),
        );
        let position = clamp_into(self.position + jitter, self.radius, params.arena);
        let mut cell = Cell::new(child_id, position, self.traits.clone(), table, rng);
        cell.generation = self.generation + 1;
        self.energy *= REPRODUCTION_ENERGY_KEPT;

        let mutated = cell.mutate(params.mutation_rate, table, rng);
        Offspring { cell, mutated }
    }

    /// Possibly swap the main trait for a random primary trait, then toggle
    /// each auxiliary tag independently, each at probability `rate`.
    ///
    /// Returns `true` if the trait sequence changed.
    pub fn mutate<R: Rng + ?Sized>(&mut self, rate: f64, table: &TraitTable, rng: &mut R) -> bool {
        debug_assert!(!self.traits.is_empty(), "cell {} has no main trait", self.id);

        let mut traits = self.traits.clone();
        if rng.random::<f64>() < rate {
            let main = TraitTag::PRIMARY[rng.random_range(0..TraitTag::PRIMARY.len())];
            traits.replace_main(main);
        }
        for tag in TraitTag::AUXILIARY {
            if rng.random::<f64>() < rate {
                traits.toggle(tag);
            }
        }

        if traits == self.traits {
            return false;
        }
        self.set_traits(traits, table);
        true
    }
}

/// Clamp `position` so a circle of `radius` stays inside `arena`.
pub fn clamp_into(position: DVec2, radius: f64, arena: DVec2) -> DVec2 {
    DVec2::new(
        position.x.min(arena.x - radius).max(radius),
        position.y.min(arena.y - radius).max(radius),
    )
}
