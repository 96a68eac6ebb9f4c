use glam::DVec2;
use petri_core::cell::Cell;
use petri_core::entity::EntityId;
use petri_core::food::Food;
use petri_core::traits::TraitSet;
use serde::Serialize;

/// What a renderer needs to draw one cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CellView {
    /// Cell id.
    pub id: EntityId,
    /// Center.
    pub position: DVec2,
    /// Displacement per tick; renderers draw the heading and turn receptors with it.
    pub velocity: DVec2,
    /// Body radius.
    pub radius: f64,
    /// Trait sequence, main trait first.
    pub traits: TraitSet,
    /// Current energy.
    pub energy: f64,
    /// Combat strength.
    pub strength: f64,
    /// Movement speed.
    pub speed: f64,
    /// Receptor angles in radians.
    pub receptor_angles: Vec<f64>,
    /// Distance of every receptor from the center.
    pub receptor_distance: f64,
    /// Lineage depth.
    pub generation: u32,
}

impl From<&Cell> for CellView {
    fn from(cell: &Cell) -> Self {
        Self {
            id: cell.id,
            position: cell.position,
            velocity: cell.velocity,
            radius: cell.radius(),
            traits: cell.traits().clone(),
            energy: cell.energy(),
            strength: cell.strength(),
            speed: cell.speed(),
            receptor_angles: cell.receptors().iter().map(|r| r.angle).collect(),
            receptor_distance: cell.receptors().first().map_or(0.0, |r| r.distance),
            generation: cell.generation,
        }
    }
}

/// What a renderer needs to draw one food particle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FoodView {
    /// Food id.
    pub id: EntityId,
    /// Center.
    pub position: DVec2,
    /// Radius.
    pub radius: f64,
}

impl From<&Food> for FoodView {
    fn from(food: &Food) -> Self {
        Self {
            id: food.id,
            position: food.position,
            radius: food.radius,
        }
    }
}

/// Committed state of one frame, in draw order (ascending id).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameSnapshot {
    /// Tick this frame shows.
    pub tick: u64,
    /// Live cells.
    pub cells: Vec<CellView>,
    /// Live food.
    pub food: Vec<FoodView>,
    /// Currently selected cell, if it is still alive.
    pub selected: Option<EntityId>,
}

impl FrameSnapshot {
    /// Serialize as compact JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use petri_core::traits::{TraitTable, TraitTag};

    use super::*;

    #[test]
    fn food_view_json() {
        let food = Food::plant(EntityId(2), DVec2::new(4.0, 5.0));
        let snapshot = FrameSnapshot {
            tick: 1,
            cells: Vec::new(),
            food: vec![FoodView::from(&food)],
            selected: None,
        };
        insta::assert_snapshot!(
            snapshot.to_json().unwrap(),
            @r###"{"tick":1,"cells":[],"food":[{"id":2,"position":[4.0,5.0],"radius":3.0}],"selected":null}"###
        );
    }

    #[test]
    fn cell_view_copies_derived_fields() {
        let cell = Cell::with_velocity(
            EntityId(0),
            DVec2::new(1.0, 2.0),
            DVec2::new(0.5, -1.5),
            TraitSet::new([TraitTag::Carnivore, TraitTag::Strong]).unwrap(),
            &TraitTable::builtin(),
        );
        let view = CellView::from(&cell);
        assert_eq!(view.velocity, DVec2::new(0.5, -1.5));
        assert_eq!(view.radius, 9.0);
        assert_eq!(view.receptor_angles.len(), 4);
        assert!((view.receptor_distance - 10.8).abs() < 1e-12);
        assert!((view.strength - 142.5).abs() < 1e-12);
        assert_eq!(view.traits.to_string(), "CARNIVORE+STRONG");
    }
}
