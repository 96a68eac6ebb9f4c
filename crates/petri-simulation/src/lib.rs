//! Tick engine for Petri.
//!
//! A [`Simulation`] owns the cells and food of one arena and advances them
//! one tick at a time: rebuild the [`QuadTree`], maybe spawn food, update
//! every cell against a fixed snapshot of the tick's start, then commit
//! removals and births in one batch. Everything is driven by a seeded RNG and
//! an id-ordered neighbor list, so the same seed and inputs replay the same
//! world.

/// Simulation clock and frame scaling.
pub mod clock;
/// Configuration types for simulation runs.
pub mod config;
/// Mutable context lent to the update phase.
pub mod context;
/// Error types for the simulation crate.
pub mod error;
/// Simulation event types and the event log.
pub mod event;
/// Per-tick user settings.
pub mod settings;
/// The engine and its tick state machine.
pub mod simulation;
/// Render-ready frame snapshots.
pub mod snapshot;
/// Quadtree spatial index.
pub mod spatial;
/// Aggregate statistics and the FPS meter.
pub mod stats;

/// Re-export of [`clock::SimClock`].
pub use clock::SimClock;
/// Re-export of [`config::SimConfig`].
pub use config::SimConfig;
/// Re-export of [`context::TickContext`].
pub use context::TickContext;
/// Re-exports of [`error::SimError`] and [`error::SimResult`].
pub use error::{SimError, SimResult};
/// Re-exports of [`event::EventLog`], [`event::SimEvent`], and [`event::SimEventKind`].
pub use event::{EventLog, SimEvent, SimEventKind};
/// Re-exports of [`settings::Settings`] and [`settings::EnvironmentalFactors`].
pub use settings::{EnvironmentalFactors, Settings};
/// Re-exports of [`simulation::Simulation`] and [`simulation::TickPhase`].
pub use simulation::{Simulation, TickPhase};
/// Re-exports of the snapshot types.
pub use snapshot::{CellView, FoodView, FrameSnapshot};
/// Re-export of [`spatial::QuadTree`].
pub use spatial::QuadTree;
/// Re-exports of [`stats::Statistics`] and [`stats::Counters`].
pub use stats::{Counters, FpsMeter, Statistics};
