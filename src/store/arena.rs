//! Slot arena owning every resident atom.

use crate::types::Atom;
use super::identity::SlotKey;

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    atom: Option<Atom>,
}

/// Vector of reusable slots. Freed slots are recycled with a bumped generation.
///
/// Generations wrap after 2^32 reuses of one slot. Stale handles never reach
/// the arena, since the identity table drops their binding first.
#[derive(Debug, Clone, Default)]
pub(crate) struct Arena {
    slots: Vec<Slot>,
    free: Vec<usize>,
    len: usize,
}

impl Arena {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
            len: 0,
        }
    }

    pub(crate) fn insert(&mut self, atom: Atom) -> SlotKey {
        self.len += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index];
            debug_assert!(slot.atom.is_none());
            slot.atom = Some(atom);
            return SlotKey {
                index,
                generation: slot.generation,
            };
        }
        let index = self.slots.len();
        self.slots.push(Slot {
            generation: 0,
            atom: Some(atom),
        });
        SlotKey { index, generation: 0 }
    }

    pub(crate) fn get(&self, key: SlotKey) -> Option<&Atom> {
        self.slots
            .get(key.index)
            .filter(|slot| slot.generation == key.generation)
            .and_then(|slot| slot.atom.as_ref())
    }

    pub(crate) fn get_mut(&mut self, key: SlotKey) -> Option<&mut Atom> {
        self.slots
            .get_mut(key.index)
            .filter(|slot| slot.generation == key.generation)
            .and_then(|slot| slot.atom.as_mut())
    }

    pub(crate) fn remove(&mut self, key: SlotKey) -> Option<Atom> {
        let slot = self
            .slots
            .get_mut(key.index)
            .filter(|slot| slot.generation == key.generation)?;
        let atom = slot.atom.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(key.index);
        self.len -= 1;
        Some(atom)
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Atom> {
        self.slots.iter().filter_map(|slot| slot.atom.as_ref())
    }
}
