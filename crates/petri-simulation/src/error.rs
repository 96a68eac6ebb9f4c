use petri_core::entity::EntityId;
use petri_core::error::CoreError;

/// Result alias for simulation operations.
pub type SimResult<T> = Result<T, SimError>;

/// Errors raised by the simulation engine.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// No live cell has this id.
    #[error("cell not found in simulation: {0}")]
    CellNotFound(EntityId),

    /// The arena cannot hold the largest cell.
    #[error("invalid arena {width}x{height}: each side must be finite and larger than {min}")]
    InvalidArena {
        /// Requested width.
        width: f64,
        /// Requested height.
        height: f64,
        /// Smallest accepted side length.
        min: f64,
    },

    /// A trait table or trait sequence was rejected.
    #[error(transparent)]
    Core(#[from] CoreError),
}
