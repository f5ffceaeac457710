//! Identity table: stable handles to arena slots.
//!
//! Handles are allocated monotonically and never reused. Each live handle is
//! bound to a generation-checked slot key; removal unbinds the handle and
//! leaves a tombstone, so a stale handle resolves to `NotFound` instead of to
//! whatever atom later occupies the same slot.

use crate::types::Handle;

/// Location of an atom in the arena.
///
/// The generation distinguishes successive occupants of one slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotKey {
    pub(crate) index: usize,
    pub(crate) generation: u32,
}

/// Error type for identity lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum IdentityError {
    /// Handle was never allocated, never bound, or has been unbound.
    #[error("Identifier not found: {0}")]
    NotFound(Handle),
}

/// Bidirectional mapping between stable handles and arena slots.
#[derive(Debug, Clone, Default)]
pub struct IdentityTable {
    /// Indexed by raw handle. `None` is either pending or a tombstone.
    bindings: Vec<Option<SlotKey>>,
    bound: usize,
}

impl IdentityTable {
    /// Create an empty table. Handles start at 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty table with room for `capacity` handles.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bindings: Vec::with_capacity(capacity),
            bound: 0,
        }
    }

    /// Allocate a fresh handle. It resolves to `NotFound` until bound.
    pub fn allocate(&mut self) -> Handle {
        let handle = Handle::from_raw(self.bindings.len() as u64);
        self.bindings.push(None);
        handle
    }

    /// Bind (or rebind, on relocation) an allocated handle to a slot.
    pub fn bind(&mut self, handle: Handle, slot: SlotKey) -> Result<(), IdentityError> {
        let entry = position(handle)
            .and_then(|i| self.bindings.get_mut(i))
            .ok_or(IdentityError::NotFound(handle))?;
        if entry.is_none() {
            self.bound += 1;
        }
        *entry = Some(slot);
        Ok(())
    }

    /// Look up the slot a handle is bound to.
    pub fn resolve(&self, handle: Handle) -> Result<SlotKey, IdentityError> {
        position(handle)
            .and_then(|i| self.bindings.get(i))
            .copied()
            .flatten()
            .ok_or(IdentityError::NotFound(handle))
    }

    /// Invalidate a handle. The handle is never handed out again.
    pub fn unbind(&mut self, handle: Handle) -> Result<SlotKey, IdentityError> {
        let slot = position(handle)
            .and_then(|i| self.bindings.get_mut(i))
            .and_then(Option::take)
            .ok_or(IdentityError::NotFound(handle))?;
        self.bound -= 1;
        Ok(slot)
    }

    /// Number of handles ever allocated, including removed ones.
    pub fn size(&self) -> usize {
        self.bindings.len()
    }

    /// Number of currently bound handles.
    pub fn bound(&self) -> usize {
        self.bound
    }
}

/// Table position of a handle. Handles beyond the address space never resolve.
fn position(handle: Handle) -> Option<usize> {
    usize::try_from(handle.raw()).ok()
}
