//! Derived cell statistics computed from a trait sequence and the trait table.

use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};

use crate::traits::{TraitSet, TraitTable, TraitTag};

/// Receptors sit this far out, relative to the cell radius.
pub const RECEPTOR_DISTANCE_FACTOR: f64 = 1.2;

/// A cosmetic sensory point drawn around a cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Receptor {
    /// Angle in radians, measured from the positive x axis.
    pub angle: f64,
    /// Distance from the cell center.
    pub distance: f64,
}

/// Physical stats that follow from a trait sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedStats {
    /// Body radius.
    pub radius: f64,
    /// Movement speed per tick.
    pub speed: f64,
    /// Combat strength.
    pub strength: f64,
    /// Energy lost per reference frame.
    pub energy_loss: f64,
    /// Receptor layout.
    pub receptors: Vec<Receptor>,
}

impl DerivedStats {
    /// Resolve every derived stat for `traits`.
    pub fn resolve(traits: &TraitSet, table: &TraitTable) -> Self {
        let radius = radius(traits, table);
        Self {
            radius,
            speed: speed(traits, table),
            strength: strength(traits, table),
            energy_loss: energy_loss(traits, table),
            receptors: receptors(traits.len(), radius),
        }
    }
}

/// The main trait's base size.
pub fn radius(traits: &TraitSet, table: &TraitTable) -> f64 {
    table.get(traits.main()).base_size
}

/// Main strength plus half of every secondary tag's strength, then scaled once
/// by the `STRONG` bonus if present.
pub fn strength(traits: &TraitSet, table: &TraitTable) -> f64 {
    let main = table.get(traits.main()).strength;
    let secondary: f64 = traits
        .secondary()
        .iter()
        .map(|t| table.get(*t).strength / 2.0)
        .sum();
    let mut total = main + secondary;
    if traits.contains(TraitTag::Strong) {
        total *= table.get(TraitTag::Strong).strength_bonus.unwrap_or(1.0);
    }
    total
}

/// Main trait's base speed, scaled by the `FAST` bonus if present.
pub fn speed(traits: &TraitSet, table: &TraitTable) -> f64 {
    let mut speed = table.get(traits.main()).base_speed;
    if traits.contains(TraitTag::Fast) {
        speed *= table.get(TraitTag::Fast).speed_bonus.unwrap_or(1.0);
    }
    speed
}

/// Main trait's base loss, scaled by the `EFFICIENT` factor if present.
pub fn energy_loss(traits: &TraitSet, table: &TraitTable) -> f64 {
    let mut loss = table.get(traits.main()).energy_loss;
    if traits.contains(TraitTag::Efficient) {
        loss *= table.get(TraitTag::Efficient).loss_factor.unwrap_or(1.0);
    }
    loss
}

/// `trait_count + 2` receptors evenly spaced over a full turn.
pub fn receptors(trait_count: usize, radius: f64) -> Vec<Receptor> {
    let count = trait_count + 2;
    (0..count)
        .map(|i| Receptor {
            angle: i as f64 / count as f64 * TAU,
            distance: radius * RECEPTOR_DISTANCE_FACTOR,
        })
        .collect()
}
