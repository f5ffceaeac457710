//! In-memory indexed atom store.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::types::{
    Atom, AtomDefinition, AtomKind, AtomType, Handle, TruthValue, TypeRegistry,
};
use super::arena::Arena;
use super::identity::{IdentityTable, SlotKey};
use super::{HypergraphStore, StoreError};

/// Store sizing configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Number of atoms to reserve room for up front.
    pub initial_capacity: usize,
}

/// Counts describing the store contents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreStats {
    /// Resident atoms.
    pub atoms: usize,
    /// Resident nodes.
    pub nodes: usize,
    /// Resident links.
    pub links: usize,
    /// Identifiers ever allocated.
    pub identifiers_allocated: usize,
    /// Resident atoms per exact type, keyed by type name. Empty types are omitted.
    pub by_type: BTreeMap<String, usize>,
}

/// Indexed hypergraph store.
///
/// Owns every atom in a slot arena. Handles go through the identity table,
/// so stale handles are detected rather than dereferenced.
///
/// ## Indexes
///
/// - per-type node index: name -> handle (dedup)
/// - per-type link index: outgoing sequence -> handle (dedup)
/// - per-type handle set, ordered by handle (type queries)
/// - per-atom incoming set, ordered by handle
///
/// Every mutation validates before touching an index, so a failed call
/// leaves the store unchanged.
#[derive(Debug, Clone)]
pub struct AtomSpace {
    registry: Arc<TypeRegistry>,
    identities: IdentityTable,
    arena: Arena,
    nodes: Vec<HashMap<String, Handle>>,
    links: Vec<HashMap<Vec<Handle>, Handle>>,
    by_type: Vec<BTreeSet<Handle>>,
}

impl Default for AtomSpace {
    fn default() -> Self {
        Self::new()
    }
}

impl AtomSpace {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    /// Create an empty store with the given sizing.
    ///
    /// Stores always validate against [`TypeRegistry::standard`], the registry
    /// `AtomType` renders its names from.
    pub fn with_config(config: StoreConfig) -> Self {
        let registry = TypeRegistry::shared();
        let n = registry.len();
        Self {
            registry,
            identities: IdentityTable::with_capacity(config.initial_capacity),
            arena: Arena::with_capacity(config.initial_capacity),
            nodes: vec![HashMap::new(); n],
            links: vec![HashMap::new(); n],
            by_type: vec![BTreeSet::new(); n],
        }
    }

    /// The type registry this store validates against.
    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    /// The identity table.
    pub fn identities(&self) -> &IdentityTable {
        &self.identities
    }

    /// Number of atoms the arena holds without reallocating.
    pub fn capacity(&self) -> usize {
        self.arena.capacity()
    }

    // ─────────────────────────────────────────────────────────────────────
    // Mutation
    // ─────────────────────────────────────────────────────────────────────

    /// Add a node, or return the existing node with the same type and name.
    ///
    /// The abstract `Node` root is rejected; every node has a concrete type.
    pub fn add_node(&mut self, atom_type: AtomType, name: &str) -> Result<Handle, StoreError> {
        if atom_type == AtomType::NODE || !self.registry.is_node(atom_type) {
            return Err(StoreError::Type {
                atom_type,
                expected: "concrete node",
            });
        }
        let index = &mut self.nodes[atom_type.id() as usize];
        if let Some(&existing) = index.get(name) {
            return Ok(existing);
        }

        let handle = self.identities.allocate();
        index.insert(name.to_string(), handle);
        let slot = self.arena.insert(Atom::node(handle, atom_type, name.to_string()));
        self.bind(handle, slot);
        self.by_type[atom_type.id() as usize].insert(handle);

        tracing::trace!(handle = %handle, atom_type = %atom_type, name, "Added node");
        Ok(handle)
    }

    /// Add a link, or return the existing link with the same type and outgoing sequence.
    ///
    /// Every outgoing atom must be resident. The new link joins the incoming
    /// set of each distinct outgoing atom. The abstract `Link` root is rejected.
    pub fn add_link(&mut self, atom_type: AtomType, outgoing: &[Handle]) -> Result<Handle, StoreError> {
        if atom_type == AtomType::LINK || !self.registry.is_link(atom_type) {
            return Err(StoreError::Type {
                atom_type,
                expected: "concrete link",
            });
        }
        let arity = self.registry.arity(atom_type);
        if !arity.admits(outgoing.len()) {
            return Err(StoreError::Arity {
                atom_type,
                expected: arity,
                actual: outgoing.len(),
            });
        }
        let mut slots = Vec::with_capacity(outgoing.len());
        for &target in outgoing {
            match self.identities.resolve(target) {
                Ok(slot) => slots.push(slot),
                Err(_) => {
                    tracing::debug!(target_handle = %target, atom_type = %atom_type, "Link rejected: dangling reference");
                    return Err(StoreError::DanglingReference(target));
                }
            }
        }
        if let Some(&existing) = self.links[atom_type.id() as usize].get(outgoing) {
            return Ok(existing);
        }

        let handle = self.identities.allocate();
        self.links[atom_type.id() as usize].insert(outgoing.to_vec(), handle);
        let slot = self.arena.insert(Atom::link(handle, atom_type, outgoing.to_vec()));
        self.bind(handle, slot);
        self.by_type[atom_type.id() as usize].insert(handle);
        for target_slot in slots {
            if let Some(target) = self.arena.get_mut(target_slot) {
                target.insert_incoming(handle);
            }
        }

        tracing::trace!(handle = %handle, atom_type = %atom_type, arity = outgoing.len(), "Added link");
        Ok(handle)
    }

    /// Remove an atom.
    ///
    /// Without `recursive`, fails with [`StoreError::HasIncoming`] if any link
    /// references the atom. With `recursive`, first removes every atom in the
    /// transitive incoming closure, each exactly once, referrers before the
    /// atoms they reference.
    ///
    /// Returns the number of atoms removed.
    pub fn remove_atom(&mut self, handle: Handle, recursive: bool) -> Result<usize, StoreError> {
        let atom = self.atom(handle)?;
        let incoming = atom.incoming_len();

        if incoming > 0 && !recursive {
            tracing::debug!(handle = %handle, incoming, "Removal blocked by incoming links");
            return Err(StoreError::HasIncoming { handle, incoming });
        }

        let order = if incoming == 0 {
            vec![handle]
        } else {
            self.removal_order(handle)
        };
        for &victim in &order {
            self.extract(victim);
        }

        tracing::debug!(handle = %handle, removed = order.len(), recursive, "Removed atom");
        Ok(order.len())
    }

    /// Post-order walk of the incoming closure: every referrer precedes its referents.
    fn removal_order(&self, root: Handle) -> Vec<Handle> {
        let mut order = Vec::new();
        let mut visited: HashSet<Handle> = HashSet::new();
        let mut stack: Vec<(Handle, bool)> = vec![(root, false)];

        while let Some((current, expanded)) = stack.pop() {
            if expanded {
                order.push(current);
                continue;
            }
            if !visited.insert(current) {
                continue;
            }
            stack.push((current, true));
            if let Ok(atom) = self.atom(current) {
                for referrer in atom.incoming() {
                    if !visited.contains(&referrer) {
                        stack.push((referrer, false));
                    }
                }
            }
        }

        order
    }

    /// Unlink a resident atom with an empty incoming set from every index.
    fn extract(&mut self, handle: Handle) {
        let Ok(slot) = self.identities.unbind(handle) else {
            return;
        };
        let Some(atom) = self.arena.remove(slot) else {
            debug_assert!(false, "identity table bound {} to an empty slot", handle);
            return;
        };
        debug_assert_eq!(atom.incoming_len(), 0, "extracting {} with referrers", handle);

        let t = atom.atom_type().id() as usize;
        self.by_type[t].remove(&handle);
        match atom.kind() {
            AtomKind::Node { name } => {
                self.nodes[t].remove(name.as_str());
            }
            AtomKind::Link { outgoing } => {
                self.links[t].remove(outgoing.as_slice());
                for &target in outgoing {
                    if let Some(target) = self.atom_mut(target) {
                        target.remove_incoming(handle);
                    }
                }
            }
        }
    }

    fn bind(&mut self, handle: Handle, slot: SlotKey) {
        let bound = self.identities.bind(handle, slot);
        debug_assert!(bound.is_ok(), "freshly allocated {} failed to bind", handle);
    }

    /// Replace an atom's truth value.
    ///
    /// A non-resident handle is reported as stale before the payload is checked.
    pub fn set_truth_value(&mut self, handle: Handle, tv: Arc<TruthValue>) -> Result<(), StoreError> {
        let atom = self
            .atom_mut(handle)
            .ok_or(StoreError::StaleReference(handle))?;
        tv.validate()
            .map_err(|reason| StoreError::InvalidTruthValue { handle, reason })?;
        atom.set_truth_value(tv);
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Lookup
    // ─────────────────────────────────────────────────────────────────────

    /// Borrow a resident atom.
    pub fn atom(&self, handle: Handle) -> Result<&Atom, StoreError> {
        self.identities
            .resolve(handle)
            .ok()
            .and_then(|slot| self.arena.get(slot))
            .ok_or(StoreError::StaleReference(handle))
    }

    fn atom_mut(&mut self, handle: Handle) -> Option<&mut Atom> {
        let slot = self.identities.resolve(handle).ok()?;
        self.arena.get_mut(slot)
    }

    /// Whether `handle` names a resident atom.
    pub fn contains(&self, handle: Handle) -> bool {
        self.identities.resolve(handle).is_ok()
    }

    /// Map a raw identifier to a resident handle.
    pub fn resolve(&self, raw: u64) -> Result<Handle, StoreError> {
        let handle = Handle::from_raw(raw);
        if self.contains(handle) {
            Ok(handle)
        } else {
            Err(StoreError::NotFound(format!("identifier {}", raw)))
        }
    }

    /// Number of identifiers ever allocated. Raw identifiers in
    /// `0..identifier_space()` cover every atom that was ever resident.
    pub fn identifier_space(&self) -> u64 {
        self.identities.size() as u64
    }

    /// Find a node without creating it.
    pub fn get_node(&self, atom_type: AtomType, name: &str) -> Result<Handle, StoreError> {
        self.nodes
            .get(atom_type.id() as usize)
            .and_then(|index| index.get(name))
            .copied()
            .ok_or_else(|| StoreError::NotFound(format!("{} \"{}\"", atom_type, name)))
    }

    /// Find a link without creating it.
    pub fn get_link(&self, atom_type: AtomType, outgoing: &[Handle]) -> Result<Handle, StoreError> {
        self.links
            .get(atom_type.id() as usize)
            .and_then(|index| index.get(outgoing))
            .copied()
            .ok_or_else(|| {
                StoreError::NotFound(format!("{} with arity {}", atom_type, outgoing.len()))
            })
    }

    /// Resident atoms of `atom_type`, and of its subtypes when `subclasses` is set.
    ///
    /// Ordered by type id, then by handle. The order is stable while the store
    /// is unmodified.
    pub fn get_handles_by_type(&self, atom_type: AtomType, subclasses: bool) -> Vec<Handle> {
        if !self.registry.contains(atom_type) {
            return Vec::new();
        }
        if !subclasses {
            return self.by_type[atom_type.id() as usize].iter().copied().collect();
        }
        self.registry
            .subtypes(atom_type)
            .into_iter()
            .flat_map(|t| self.by_type[t.id() as usize].iter().copied())
            .collect()
    }

    /// Number of resident atoms.
    pub fn get_size(&self) -> usize {
        self.arena.len()
    }

    /// Links referencing `handle`, in handle order.
    pub fn get_incoming_set(&self, handle: Handle) -> Result<Vec<Handle>, StoreError> {
        Ok(self.atom(handle)?.incoming().collect())
    }

    /// Number of links referencing `handle`.
    pub fn get_incoming_set_size(&self, handle: Handle) -> Result<usize, StoreError> {
        Ok(self.atom(handle)?.incoming_len())
    }

    /// Outgoing set of a link. Fails with [`StoreError::NotALink`] for nodes.
    pub fn get_outgoing_set(&self, handle: Handle) -> Result<Vec<Handle>, StoreError> {
        self.atom(handle)?
            .outgoing()
            .map(<[Handle]>::to_vec)
            .ok_or(StoreError::NotALink(handle))
    }

    /// Current truth value.
    pub fn get_truth_value(&self, handle: Handle) -> Result<Arc<TruthValue>, StoreError> {
        Ok(Arc::clone(self.atom(handle)?.truth_value()))
    }

    /// Type of a resident atom.
    pub fn get_type(&self, handle: Handle) -> Result<AtomType, StoreError> {
        Ok(self.atom(handle)?.atom_type())
    }

    /// Name of a node, `None` for links.
    pub fn get_name(&self, handle: Handle) -> Result<Option<&str>, StoreError> {
        Ok(self.atom(handle)?.name())
    }

    /// Outgoing arity (0 for nodes).
    pub fn get_arity(&self, handle: Handle) -> Result<usize, StoreError> {
        Ok(self.atom(handle)?.arity())
    }

    /// (type, name) / (type, outgoing) projection of an atom, outgoing atoms
    /// expanded in place.
    ///
    /// Built bottom-up from an explicit work stack, so nesting depth is
    /// bounded by memory rather than by the call stack. A sub-atom shared by
    /// several links is expanded once per reference.
    pub fn definition(&self, handle: Handle) -> Result<AtomDefinition, StoreError> {
        let mut work: Vec<(Handle, bool)> = vec![(handle, false)];
        let mut built: Vec<AtomDefinition> = Vec::new();

        while let Some((current, expanded)) = work.pop() {
            let atom = self.atom(current)?;
            match atom.kind() {
                AtomKind::Node { name } => built.push(AtomDefinition::Node {
                    atom_type: atom.atom_type(),
                    name: name.clone(),
                }),
                AtomKind::Link { outgoing } if expanded => {
                    // Children were pushed in order, so they are the last `arity` entries.
                    let children = built.split_off(built.len() - outgoing.len());
                    built.push(AtomDefinition::Link {
                        atom_type: atom.atom_type(),
                        outgoing: children,
                    });
                }
                AtomKind::Link { outgoing } => {
                    work.push((current, true));
                    work.extend(outgoing.iter().rev().map(|&child| (child, false)));
                }
            }
        }

        debug_assert_eq!(built.len(), 1);
        built.pop().ok_or(StoreError::StaleReference(handle))
    }

    /// Rough byte footprint of an atom and every atom reachable from it.
    ///
    /// Each distinct atom is counted once, however many links reference it.
    /// Index overhead is not counted. A non-default truth value adds its
    /// payload size.
    pub fn estimate_atom_size(&self, handle: Handle) -> Result<usize, StoreError> {
        let mut visited: HashSet<Handle> = HashSet::new();
        let mut stack = vec![handle];
        let mut total = 0;

        while let Some(current) = stack.pop() {
            if !visited.insert(current) {
                continue;
            }
            let atom = self.atom(current)?;
            total += std::mem::size_of::<Atom>();
            if !TruthValue::is_default(atom.truth_value()) {
                total += atom.truth_value().byte_size();
            }
            match atom.kind() {
                AtomKind::Node { name } => total += name.capacity(),
                AtomKind::Link { outgoing } => {
                    total += outgoing.capacity() * std::mem::size_of::<Handle>();
                    stack.extend(outgoing.iter().filter(|h| !visited.contains(*h)));
                }
            }
        }
        Ok(total)
    }

    /// Snapshot of store counts.
    pub fn stats(&self) -> StoreStats {
        let mut stats = StoreStats {
            atoms: self.arena.len(),
            identifiers_allocated: self.identities.size(),
            ..StoreStats::default()
        };
        for atom in self.arena.iter() {
            if atom.is_node() {
                stats.nodes += 1;
            } else {
                stats.links += 1;
            }
        }
        for t in self.registry.types() {
            let count = self.by_type[t.id() as usize].len();
            if count > 0 {
                let name = self.registry.name(t).unwrap_or("?").to_string();
                stats.by_type.insert(name, count);
            }
        }
        stats
    }
}

impl HypergraphStore for AtomSpace {
    fn type_registry(&self) -> Arc<TypeRegistry> {
        Arc::clone(&self.registry)
    }

    fn add_node(&mut self, atom_type: AtomType, name: &str) -> Result<Handle, StoreError> {
        AtomSpace::add_node(self, atom_type, name)
    }

    fn add_link(&mut self, atom_type: AtomType, outgoing: &[Handle]) -> Result<Handle, StoreError> {
        AtomSpace::add_link(self, atom_type, outgoing)
    }

    fn remove_atom(&mut self, handle: Handle, recursive: bool) -> Result<usize, StoreError> {
        AtomSpace::remove_atom(self, handle, recursive)
    }

    fn get_handles_by_type(&self, atom_type: AtomType, subclasses: bool) -> Vec<Handle> {
        AtomSpace::get_handles_by_type(self, atom_type, subclasses)
    }

    fn get_size(&self) -> usize {
        AtomSpace::get_size(self)
    }

    fn get_incoming_set(&self, handle: Handle) -> Result<Vec<Handle>, StoreError> {
        AtomSpace::get_incoming_set(self, handle)
    }

    fn get_incoming_set_size(&self, handle: Handle) -> Result<usize, StoreError> {
        AtomSpace::get_incoming_set_size(self, handle)
    }

    fn get_outgoing_set(&self, handle: Handle) -> Result<Vec<Handle>, StoreError> {
        AtomSpace::get_outgoing_set(self, handle)
    }

    fn get_truth_value(&self, handle: Handle) -> Result<Arc<TruthValue>, StoreError> {
        AtomSpace::get_truth_value(self, handle)
    }

    fn set_truth_value(&mut self, handle: Handle, tv: Arc<TruthValue>) -> Result<(), StoreError> {
        AtomSpace::set_truth_value(self, handle, tv)
    }

    fn resolve(&self, raw: u64) -> Result<Handle, StoreError> {
        AtomSpace::resolve(self, raw)
    }

    fn identifier_space(&self) -> u64 {
        AtomSpace::identifier_space(self)
    }

    fn definition(&self, handle: Handle) -> Result<AtomDefinition, StoreError> {
        AtomSpace::definition(self, handle)
    }
}
