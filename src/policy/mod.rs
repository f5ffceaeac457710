//! Graph construction policy and the seeded generator that applies it.

pub mod construction;
pub mod generator;

pub use construction::{
    is_synthesizable, ConstructionPolicy, DEFAULT_SEED, EXCLUDED_CATEGORIES, EXCLUDED_TYPES,
};
pub use generator::{ConstructionCall, ConstructionLog, RandomGraphBuilder};

use crate::store::StoreError;

/// Error type for graph construction.
#[derive(Debug, thiserror::Error)]
pub enum GeneratorError {
    /// Policy parameters are out of range or malformed.
    #[error("Invalid construction policy: {0}")]
    InvalidPolicy(String),
    /// A link was requested but the store holds no atoms.
    #[error("No resident atoms to sample from")]
    NoResidentAtoms,
    /// The store rejected a generated call.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}
