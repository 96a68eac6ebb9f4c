use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::entity::EntityId;
use crate::traits::FoodKind;

/// Radius of every food particle.
pub const FOOD_RADIUS: f64 = 3.0;
/// Energy a food particle gives when eaten.
pub const FOOD_ENERGY: f64 = 30.0;

/// A passive food particle. It never moves and only disappears when eaten.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Food {
    /// Unique id.
    pub id: EntityId,
    /// Center position.
    pub position: DVec2,
    /// Collision radius.
    pub radius: f64,
    /// Energy granted to the eater.
    pub energy: f64,
    /// What this particle is made of.
    pub kind: FoodKind,
}

impl Food {
    /// A plant particle at `position`.
    pub fn plant(id: EntityId, position: DVec2) -> Self {
        Self {
            id,
            position,
            radius: FOOD_RADIUS,
            energy: FOOD_ENERGY,
            kind: FoodKind::Plant,
        }
    }
}
