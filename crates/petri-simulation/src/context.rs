use petri_core::entity::IdAllocator;
use rand::rngs::StdRng;
use tracing::trace;

use crate::event::{EventLog, SimEvent, SimEventKind};

/// Mutable engine state lent to the update phase of one tick.
pub struct TickContext<'a> {
    /// Tick being computed.
    pub tick: u64,
    /// Where lifecycle events go.
    pub events: &'a mut EventLog,
    /// The engine's seeded RNG.
    pub rng: &'a mut StdRng,
    /// The shared id space.
    pub ids: &'a mut IdAllocator,
}

impl TickContext<'_> {
    /// Emit a simulation event at the current tick.
    pub fn emit(&mut self, kind: SimEventKind, description: impl Into<String>) {
        let event = SimEvent::new(self.tick, kind, description);
        trace!(tick = event.tick, "{}", event.description);
        self.events.push(event);
    }
}
