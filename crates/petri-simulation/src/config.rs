use glam::DVec2;
use petri_core::geometry::Rect;
use petri_core::traits::TraitTable;

use crate::error::{SimError, SimResult};

/// Food is never spawned beyond this many live particles.
pub const DEFAULT_MAX_FOOD: usize = 1000;

/// Configuration for a simulation run.
#[derive(Debug, Clone, PartialEq)]
pub struct SimConfig {
    /// RNG seed for deterministic simulation.
    pub seed: u64,
    /// Arena width.
    pub width: f64,
    /// Arena height.
    pub height: f64,
    /// Cells seeded on reset.
    pub initial_cells: usize,
    /// Food particles seeded on reset.
    pub initial_food: usize,
    /// Stochastic spawning stops at this many live food particles.
    pub max_food: usize,
    /// Maximum event log size (oldest events dropped when exceeded). 0 = unlimited.
    pub max_events: usize,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            width: 800.0,
            height: 600.0,
            initial_cells: 10,
            initial_food: 20,
            max_food: DEFAULT_MAX_FOOD,
            max_events: 0,
        }
    }
}

impl SimConfig {
    /// Set the RNG seed for deterministic simulation.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the arena size.
    pub fn with_arena(mut self, width: f64, height: f64) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Set how many cells are seeded on reset.
    pub fn with_initial_cells(mut self, n: usize) -> Self {
        self.initial_cells = n;
        self
    }

    /// Set how many food particles are seeded on reset.
    pub fn with_initial_food(mut self, n: usize) -> Self {
        self.initial_food = n;
        self
    }

    /// Set the live food cap for stochastic spawning.
    pub fn with_max_food(mut self, n: usize) -> Self {
        self.max_food = n;
        self
    }

    /// Set the maximum event log size (0 = unlimited).
    pub fn with_max_events(mut self, max: usize) -> Self {
        self.max_events = max;
        self
    }

    /// Arena extent as a vector.
    pub fn arena(&self) -> DVec2 {
        DVec2::new(self.width, self.height)
    }

    /// Arena as a rectangle anchored at the origin.
    pub fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }

    /// Check that the arena fits the largest cell in `table`.
    pub fn validate(&self, table: &TraitTable) -> SimResult<()> {
        let min = table.largest_radius() * 2.0;
        let ok = |v: f64| v.is_finite() && v > min;
        if !ok(self.width) || !ok(self.height) {
            return Err(SimError::InvalidArena {
                width: self.width,
                height: self.height,
                min,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_default_values() {
        let config = SimConfig::default();
        assert_eq!(config.seed, 42);
        assert_eq!(config.arena(), DVec2::new(800.0, 600.0));
        assert_eq!(config.initial_cells, 10);
        assert_eq!(config.initial_food, 20);
        assert_eq!(config.max_food, 1000);
        assert_eq!(config.max_events, 0);
    }

    #[test]
    fn config_builder_chain() {
        let config = SimConfig::default()
            .with_seed(123)
            .with_arena(300.0, 200.0)
            .with_initial_cells(3)
            .with_initial_food(0)
            .with_max_food(50)
            .with_max_events(500);
        assert_eq!(config.seed, 123);
        assert_eq!(config.bounds(), Rect::new(0.0, 0.0, 300.0, 200.0));
        assert_eq!(config.initial_cells, 3);
        assert_eq!(config.initial_food, 0);
        assert_eq!(config.max_food, 50);
        assert_eq!(config.max_events, 500);
    }

    #[test]
    fn validate_rejects_tiny_or_non_finite_arena() {
        let table = TraitTable::builtin();
        assert!(SimConfig::default().validate(&table).is_ok());
        assert!(SimConfig::default().with_arena(10.0, 600.0).validate(&table).is_err());
        assert!(SimConfig::default().with_arena(800.0, f64::NAN).validate(&table).is_err());
        assert!(SimConfig::default().with_arena(-800.0, 600.0).validate(&table).is_err());
    }
}
