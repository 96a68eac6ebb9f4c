use petri_core::entity::EntityId;
use petri_core::traits::TraitSet;
use serde::Serialize;

/// What kind of simulation event occurred.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SimEventKind {
    // World
    /// The world was cleared and reseeded.
    Seeded {
        /// Cells placed.
        cells: usize,
        /// Food particles placed.
        food: usize,
    },
    /// Every cell and food particle was removed.
    Cleared,

    // Lifecycle
    /// A cell was placed by an explicit command.
    CellAdded {
        /// The new cell.
        cell: EntityId,
    },
    /// A cell reproduced.
    Born {
        /// The offspring.
        cell: EntityId,
        /// Its parent.
        parent: EntityId,
    },
    /// An offspring's traits mutated at birth.
    Mutated {
        /// The mutated offspring.
        cell: EntityId,
        /// Its traits after mutation.
        traits: TraitSet,
    },
    /// A cell ran out of energy.
    Starved {
        /// The dead cell.
        cell: EntityId,
    },

    // Interactions
    /// A cell killed and ate another.
    Preyed {
        /// The hunter.
        predator: EntityId,
        /// The victim.
        prey: EntityId,
    },
    /// Two cells fused into one.
    Merged {
        /// The cell that keeps its id.
        survivor: EntityId,
        /// The cell that was absorbed.
        absorbed: EntityId,
    },
    /// A cell ate a food particle.
    FoodEaten {
        /// The eater.
        cell: EntityId,
        /// The food.
        food: EntityId,
    },
    /// A food particle appeared.
    FoodSpawned {
        /// The new food.
        food: EntityId,
    },
}

impl SimEventKind {
    /// Check whether a given entity is involved in this event.
    pub fn involves(&self, id: EntityId) -> bool {
        match self {
            Self::Seeded { .. } | Self::Cleared => false,
            Self::CellAdded { cell }
            | Self::Mutated { cell, .. }
            | Self::Starved { cell }
            | Self::FoodSpawned { food: cell } => *cell == id,
            Self::Born { cell, parent } => *cell == id || *parent == id,
            Self::Preyed { predator, prey } => *predator == id || *prey == id,
            Self::Merged { survivor, absorbed } => *survivor == id || *absorbed == id,
            Self::FoodEaten { cell, food } => *cell == id || *food == id,
        }
    }
}

/// A record of something that happened during simulation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimEvent {
    /// The simulation tick when this event occurred.
    pub tick: u64,
    /// The specific kind of event that occurred.
    pub kind: SimEventKind,
    /// A human-readable description of the event.
    pub description: String,
}

impl SimEvent {
    /// Create a new simulation event with the given tick, kind, and description.
    pub fn new(tick: u64, kind: SimEventKind, description: impl Into<String>) -> Self {
        Self {
            tick,
            kind,
            description: description.into(),
        }
    }
}

/// Accumulates events during a simulation run.
#[derive(Debug, Default)]
pub struct EventLog {
    events: Vec<SimEvent>,
    max_events: usize,
}

impl EventLog {
    /// Create a new event log with the given maximum capacity (0 = unlimited).
    pub fn new(max_events: usize) -> Self {
        Self {
            events: Vec::new(),
            max_events,
        }
    }

    /// Append an event, dropping the oldest events if the log exceeds its capacity.
    pub fn push(&mut self, event: SimEvent) {
        self.events.push(event);
        if self.max_events > 0 && self.events.len() > self.max_events {
            let drain_count = self.events.len() - self.max_events;
            self.events.drain(..drain_count);
        }
    }

    /// Return a slice of all recorded events.
    pub fn events(&self) -> &[SimEvent] {
        &self.events
    }

    /// Return all events that occurred at the given tick.
    pub fn events_at_tick(&self, tick: u64) -> Vec<&SimEvent> {
        self.events.iter().filter(|e| e.tick == tick).collect()
    }

    /// Return all events involving the given entity.
    pub fn events_for_entity(&self, id: EntityId) -> Vec<&SimEvent> {
        self.events.iter().filter(|e| e.kind.involves(id)).collect()
    }

    /// Count events matching `pred`.
    pub fn count(&self, pred: impl Fn(&SimEventKind) -> bool) -> usize {
        self.events.iter().filter(|e| pred(&e.kind)).count()
    }

    /// Return the number of recorded events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Return `true` if no events have been recorded.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Remove all recorded events.
    pub fn clear(&mut self) {
        self.events.clear();
    }
}
