use crate::traits::TraitTag;

/// Alias for `Result<T, CoreError>`.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors raised while building traits, trait tables, or cells.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A trait sequence was empty; every cell needs a main trait.
    #[error("trait sequence is empty: a cell needs a main trait")]
    EmptyTraits,

    /// An auxiliary modifier tag was used where a primary trait is required.
    #[error("{0} is an auxiliary trait and cannot be a main trait")]
    AuxiliaryMainTrait(TraitTag),

    /// A trait name could not be parsed.
    #[error("unknown trait: \"{0}\"")]
    UnknownTrait(String),

    /// A trait table is missing the descriptor for a tag.
    #[error("trait table has no descriptor for {0}")]
    MissingDescriptor(TraitTag),

    /// A trait descriptor holds a value that cannot drive the simulation.
    #[error("invalid value for {tag}.{field}: {value}")]
    InvalidDescriptor {
        /// The tag whose descriptor is invalid.
        tag: TraitTag,
        /// The offending field name.
        field: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// A trait table could not be parsed from JSON.
    #[error("invalid trait table JSON: {0}")]
    Json(#[from] serde_json::Error),
}
