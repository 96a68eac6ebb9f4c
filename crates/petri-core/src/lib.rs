//! Core types for Petri: traits, cells, food, and the geometry they live in.
//!
//! This crate holds the entity model and nothing that advances time. A
//! [`TraitTable`] describes what each trait tag does, a [`TraitSet`] is the
//! ordered tag sequence a [`Cell`] carries, and [`DerivedStats`] turns one
//! into the other. The tick loop lives in `petri-simulation`.

/// Cells: targeting, movement, interactions, reproduction and mutation.
pub mod cell;
/// Entity identifiers and index keys.
pub mod entity;
/// Error types used throughout the crate.
pub mod error;
/// Food particles.
pub mod food;
/// Axis-aligned rectangles.
pub mod geometry;
/// Stat resolution from trait sequences.
pub mod resolve;
/// Trait tags, descriptors, the trait table and trait sequences.
pub mod traits;

/// Re-export cell types.
pub use cell::{Cell, Interaction, InteractionRules, Neighbor, Offspring, Target, UpdateParams};
/// Re-export identifier types.
pub use entity::{EntityId, EntityKey, IdAllocator};
/// Re-export error types.
pub use error::{CoreError, CoreResult};
/// Re-export food types.
pub use food::Food;
/// Re-export geometry types.
pub use geometry::Rect;
/// Re-export resolution types.
pub use resolve::{DerivedStats, Receptor};
/// Re-export trait model types.
pub use traits::{FoodKind, TraitDescriptor, TraitSet, TraitTable, TraitTag};

/// Re-export the vector type used for every position and velocity.
pub use glam::DVec2;
