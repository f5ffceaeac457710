//! Hypergraph storage.

pub mod identity;
pub mod memory;
pub mod shared;
mod arena;

use std::sync::Arc;

use crate::types::{Arity, AtomDefinition, AtomType, Handle, TruthValue, TypeRegistry};

/// Error type for store operations.
///
/// Every error is recoverable and leaves the store unchanged.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StoreError {
    /// Wrong node/link category for the operation.
    #[error("Type error: {atom_type} is not a {expected} type")]
    Type {
        /// Offending type.
        atom_type: AtomType,
        /// Expected category ("node" or "link").
        expected: &'static str,
    },
    /// Link arity violates the type's rule.
    #[error("Arity error: {atom_type} requires {expected} outgoing atoms, got {actual}")]
    Arity {
        /// Link type.
        atom_type: AtomType,
        /// Rule from the type registry.
        expected: Arity,
        /// Supplied outgoing length.
        actual: usize,
    },
    /// An outgoing element is not resident.
    #[error("Dangling reference: {0} is not resident")]
    DanglingReference(Handle),
    /// Non-recursive removal of an atom that links still reference.
    #[error("Cannot remove {handle}: referenced by {incoming} link(s)")]
    HasIncoming {
        /// Atom whose removal was blocked.
        handle: Handle,
        /// Size of its incoming set.
        incoming: usize,
    },
    /// Handle does not name a resident atom.
    #[error("Stale reference: {0} is not resident")]
    StaleReference(Handle),
    /// Lookup miss.
    #[error("Not found: {0}")]
    NotFound(String),
    /// Outgoing set requested for a node.
    #[error("{0} is not a link")]
    NotALink(Handle),
    /// Truth value payload is malformed.
    #[error("Invalid truth value for {handle}: {reason}")]
    InvalidTruthValue {
        /// Target atom.
        handle: Handle,
        /// What is wrong with the payload.
        reason: String,
    },
}

/// The operations a workload driver uses against a store.
///
/// Mutations take `&mut self`; a store is a single-writer structure.
/// Set-valued results are returned in a deterministic order.
pub trait HypergraphStore {
    /// Registry used to validate types.
    fn type_registry(&self) -> Arc<TypeRegistry>;

    /// Add (or find) a node.
    fn add_node(&mut self, atom_type: AtomType, name: &str) -> Result<Handle, StoreError>;

    /// Add (or find) a link over resident atoms.
    fn add_link(&mut self, atom_type: AtomType, outgoing: &[Handle]) -> Result<Handle, StoreError>;

    /// Remove an atom, optionally cascading to its incoming closure.
    /// Returns the number of atoms removed.
    fn remove_atom(&mut self, handle: Handle, recursive: bool) -> Result<usize, StoreError>;

    /// Resident atoms of a type, optionally including subtypes.
    fn get_handles_by_type(&self, atom_type: AtomType, subclasses: bool) -> Vec<Handle>;

    /// Number of resident atoms.
    fn get_size(&self) -> usize;

    /// Links referencing an atom.
    fn get_incoming_set(&self, handle: Handle) -> Result<Vec<Handle>, StoreError>;

    /// Number of links referencing an atom.
    fn get_incoming_set_size(&self, handle: Handle) -> Result<usize, StoreError>;

    /// Outgoing set of a link.
    fn get_outgoing_set(&self, handle: Handle) -> Result<Vec<Handle>, StoreError>;

    /// Current truth value of an atom.
    fn get_truth_value(&self, handle: Handle) -> Result<Arc<TruthValue>, StoreError>;

    /// Replace the truth value of an atom.
    fn set_truth_value(&mut self, handle: Handle, tv: Arc<TruthValue>) -> Result<(), StoreError>;

    /// Map a raw identifier to a resident handle.
    fn resolve(&self, raw: u64) -> Result<Handle, StoreError>;

    /// Number of identifiers ever allocated.
    fn identifier_space(&self) -> u64;

    /// Read-only definition of an atom.
    fn definition(&self, handle: Handle) -> Result<AtomDefinition, StoreError>;
}

pub use identity::{IdentityError, IdentityTable, SlotKey};
pub use memory::{AtomSpace, StoreConfig, StoreStats};
pub use shared::SharedAtomSpace;
