//! # atomspace-kernel
//!
//! In-memory typed hypergraph store with a seeded workload generator.
//!
//! Atoms are either **nodes** (a type and a name) or **links** (a type and an
//! ordered outgoing sequence of atoms). Every atom has a stable [`Handle`],
//! a truth value, and an incoming set of the links that reference it.
//!
//! ## Core Contract
//!
//! 1. Adding an atom is idempotent: an equal atom returns the existing handle
//! 2. A link references only resident atoms, and every reference is
//!    mirrored in the target's incoming set
//! 3. An atom that is still referenced is removed only recursively, together
//!    with everything that references it
//!
//! ## Architecture
//!
//! ```text
//! ConstructionPolicy → RandomGraphBuilder → ConstructionLog (fingerprint)
//!                              ↓
//!                      HypergraphStore (AtomSpace or SharedAtomSpace)
//!                              ↓
//!              IdentityTable → Arena, TypeRegistry indexes
//! ```
//!
//! ## Determinism Guarantees
//!
//! - Same policy + same seed + same store state → identical construction log
//! - Handles are allocated monotonically and never reused
//! - Set-valued reads are ordered by type id, then by handle

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod types;
pub mod policy;
pub mod store;
pub mod canonical;
pub mod logging;

// Re-exports
pub use types::{
    Arity, Atom, AtomDefinition, AtomKind, AtomType, Handle, TruthValue, TruthValueType,
    TypeDef, TypeRegistry, TypeRegistryError, STANDARD_TYPES,
};
pub use store::{
    AtomSpace, HypergraphStore, IdentityError, IdentityTable, SharedAtomSpace, SlotKey,
    StoreConfig, StoreError, StoreStats,
};
pub use policy::{
    ConstructionCall, ConstructionLog, ConstructionPolicy, GeneratorError, RandomGraphBuilder,
};
pub use canonical::{to_canonical_bytes, canonical_hash, canonical_hash_hex};
pub use logging::{init_tracing, try_init_tracing};

/// Default construction policy version identifier.
pub const DEFAULT_POLICY_VERSION: &str = "construction_policy_v1";
