//! Shared store for multi-threaded callers.
//!
//! Reads run concurrently under a read lock; every mutation takes the write
//! lock, so mutations are serialized and never overlap a read.

use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::types::{AtomDefinition, AtomType, Handle, TruthValue, TypeRegistry};
use super::{AtomSpace, HypergraphStore, StoreError};

/// Cheaply cloneable handle to a lock-protected [`AtomSpace`].
#[derive(Debug, Clone, Default)]
pub struct SharedAtomSpace {
    inner: Arc<RwLock<AtomSpace>>,
}

impl SharedAtomSpace {
    /// Wrap a store.
    pub fn new(space: AtomSpace) -> Self {
        Self {
            inner: Arc::new(RwLock::new(space)),
        }
    }

    /// Acquire the read lock.
    pub fn read(&self) -> RwLockReadGuard<'_, AtomSpace> {
        self.inner.read()
    }

    /// Acquire the write lock.
    pub fn write(&self) -> RwLockWriteGuard<'_, AtomSpace> {
        self.inner.write()
    }

    /// Run a closure under the read lock.
    pub fn with_read<R>(&self, f: impl FnOnce(&AtomSpace) -> R) -> R {
        f(&self.inner.read())
    }

    /// Run a closure under the write lock. Use this to make a sequence of
    /// mutations atomic with respect to readers.
    pub fn with_write<R>(&self, f: impl FnOnce(&mut AtomSpace) -> R) -> R {
        f(&mut self.inner.write())
    }
}

impl HypergraphStore for SharedAtomSpace {
    fn type_registry(&self) -> Arc<TypeRegistry> {
        self.read().type_registry()
    }

    fn add_node(&mut self, atom_type: AtomType, name: &str) -> Result<Handle, StoreError> {
        self.write().add_node(atom_type, name)
    }

    fn add_link(&mut self, atom_type: AtomType, outgoing: &[Handle]) -> Result<Handle, StoreError> {
        self.write().add_link(atom_type, outgoing)
    }

    fn remove_atom(&mut self, handle: Handle, recursive: bool) -> Result<usize, StoreError> {
        self.write().remove_atom(handle, recursive)
    }

    fn get_handles_by_type(&self, atom_type: AtomType, subclasses: bool) -> Vec<Handle> {
        self.read().get_handles_by_type(atom_type, subclasses)
    }

    fn get_size(&self) -> usize {
        self.read().get_size()
    }

    fn get_incoming_set(&self, handle: Handle) -> Result<Vec<Handle>, StoreError> {
        self.read().get_incoming_set(handle)
    }

    fn get_incoming_set_size(&self, handle: Handle) -> Result<usize, StoreError> {
        self.read().get_incoming_set_size(handle)
    }

    fn get_outgoing_set(&self, handle: Handle) -> Result<Vec<Handle>, StoreError> {
        self.read().get_outgoing_set(handle)
    }

    fn get_truth_value(&self, handle: Handle) -> Result<Arc<TruthValue>, StoreError> {
        self.read().get_truth_value(handle)
    }

    fn set_truth_value(&mut self, handle: Handle, tv: Arc<TruthValue>) -> Result<(), StoreError> {
        self.write().set_truth_value(handle, tv)
    }

    fn resolve(&self, raw: u64) -> Result<Handle, StoreError> {
        self.read().resolve(raw)
    }

    fn identifier_space(&self) -> u64 {
        self.read().identifier_space()
    }

    fn definition(&self, handle: Handle) -> Result<AtomDefinition, StoreError> {
        self.read().definition(handle)
    }
}
