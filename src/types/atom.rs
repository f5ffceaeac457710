//! Atom types for the hypergraph store.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::atom_type::AtomType;
use super::truth::TruthValue;

/// Stable identifier of a resident atom.
///
/// A handle is a non-owning reference: it stays valid while the atom is
/// resident and is never reassigned to another atom after removal.
/// Implements `Ord` so index iteration is deterministic (creation order).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Handle(u64);

impl Handle {
    /// Wrap a raw identifier.
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw identifier.
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Variant payload of an atom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AtomKind {
    /// Named leaf.
    Node {
        /// Name, unique within the node's type.
        name: String,
    },
    /// Ordered hyperedge over resident atoms.
    Link {
        /// Outgoing set, fixed at creation.
        outgoing: Vec<Handle>,
    },
}

/// A resident atom.
///
/// Owned by the store; callers only ever see shared borrows.
#[derive(Debug, Clone)]
pub struct Atom {
    handle: Handle,
    atom_type: AtomType,
    kind: AtomKind,
    truth_value: Arc<TruthValue>,
    incoming: BTreeSet<Handle>,
}

impl Atom {
    pub(crate) fn node(handle: Handle, atom_type: AtomType, name: String) -> Self {
        Self::new(handle, atom_type, AtomKind::Node { name })
    }

    pub(crate) fn link(handle: Handle, atom_type: AtomType, outgoing: Vec<Handle>) -> Self {
        Self::new(handle, atom_type, AtomKind::Link { outgoing })
    }

    fn new(handle: Handle, atom_type: AtomType, kind: AtomKind) -> Self {
        Self {
            handle,
            atom_type,
            kind,
            truth_value: TruthValue::default_tv(),
            incoming: BTreeSet::new(),
        }
    }

    /// Identifier of this atom.
    pub fn handle(&self) -> Handle {
        self.handle
    }

    /// Type tag.
    pub fn atom_type(&self) -> AtomType {
        self.atom_type
    }

    /// Node or link payload.
    pub fn kind(&self) -> &AtomKind {
        &self.kind
    }

    /// Whether this atom is a node.
    pub fn is_node(&self) -> bool {
        matches!(self.kind, AtomKind::Node { .. })
    }

    /// Whether this atom is a link.
    pub fn is_link(&self) -> bool {
        matches!(self.kind, AtomKind::Link { .. })
    }

    /// Name, for nodes.
    pub fn name(&self) -> Option<&str> {
        match &self.kind {
            AtomKind::Node { name } => Some(name.as_str()),
            AtomKind::Link { .. } => None,
        }
    }

    /// Outgoing set, for links.
    pub fn outgoing(&self) -> Option<&[Handle]> {
        match &self.kind {
            AtomKind::Node { .. } => None,
            AtomKind::Link { outgoing } => Some(outgoing.as_slice()),
        }
    }

    /// Outgoing arity (0 for nodes).
    pub fn arity(&self) -> usize {
        self.outgoing().map_or(0, <[Handle]>::len)
    }

    /// Current truth value.
    pub fn truth_value(&self) -> &Arc<TruthValue> {
        &self.truth_value
    }

    /// Links whose outgoing set contains this atom, in handle order.
    pub fn incoming(&self) -> impl ExactSizeIterator<Item = Handle> + '_ {
        self.incoming.iter().copied()
    }

    /// Size of the incoming set.
    pub fn incoming_len(&self) -> usize {
        self.incoming.len()
    }

    pub(crate) fn set_truth_value(&mut self, tv: Arc<TruthValue>) {
        self.truth_value = tv;
    }

    pub(crate) fn insert_incoming(&mut self, link: Handle) {
        self.incoming.insert(link);
    }

    pub(crate) fn remove_incoming(&mut self, link: Handle) {
        self.incoming.remove(&link);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_ordering() {
        assert!(Handle::from_raw(1) < Handle::from_raw(2));
        assert_eq!(Handle::from_raw(7).to_string(), "#7");
    }

    #[test]
    fn test_node_accessors() {
        let atom = Atom::node(Handle::from_raw(0), AtomType::CONCEPT_NODE, "cat".into());
        assert!(atom.is_node());
        assert_eq!(atom.name(), Some("cat"));
        assert_eq!(atom.outgoing(), None);
        assert_eq!(atom.arity(), 0);
        assert!(TruthValue::is_default(atom.truth_value()));
    }

    #[test]
    fn test_incoming_is_a_set() {
        let mut atom = Atom::link(
            Handle::from_raw(5),
            AtomType::LIST_LINK,
            vec![Handle::from_raw(1), Handle::from_raw(2)],
        );
        atom.insert_incoming(Handle::from_raw(9));
        atom.insert_incoming(Handle::from_raw(8));
        atom.insert_incoming(Handle::from_raw(9));
        assert_eq!(atom.incoming_len(), 2);
        assert_eq!(
            atom.incoming().collect::<Vec<_>>(),
            vec![Handle::from_raw(8), Handle::from_raw(9)]
        );
        atom.remove_incoming(Handle::from_raw(8));
        assert_eq!(atom.incoming_len(), 1);
        assert_eq!(atom.arity(), 2);
    }
}
