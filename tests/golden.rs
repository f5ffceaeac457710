//! Golden tests for the AtomSpace store.
//!
//! These tests verify the store contract end to end: deduplication,
//! incoming/outgoing duality, the removal guard, and type index completeness.

use std::collections::{BTreeMap, BTreeSet};

use atomspace_kernel::{
    AtomDefinition, AtomSpace, AtomType, Handle, HypergraphStore, StoreError, TruthValue,
    TruthValueType,
};
use proptest::prelude::*;

// ─────────────────────────────────────────────────────────────────────────────
// Test Helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Every handle that currently resolves, in identifier order.
fn resident(space: &AtomSpace) -> Vec<Handle> {
    (0..space.identifier_space())
        .filter_map(|raw| space.resolve(raw).ok())
        .collect()
}

/// Check the structural invariants that must hold after any sequence of calls.
fn assert_consistent(space: &AtomSpace) {
    let all = resident(space);
    assert_eq!(all.len(), space.get_size());

    // Type index completeness.
    let indexed: BTreeSet<Handle> = space
        .get_handles_by_type(AtomType::ATOM, true)
        .into_iter()
        .collect();
    assert_eq!(indexed, all.iter().copied().collect::<BTreeSet<_>>());
    for &h in &all {
        let t = space.get_type(h).unwrap();
        assert!(space.get_handles_by_type(t, false).contains(&h));
    }

    for &h in &all {
        // Outgoing targets are resident and list `h` as incoming.
        if let Ok(outgoing) = space.get_outgoing_set(h) {
            for target in outgoing {
                assert!(space.contains(target), "{} dangles to {}", h, target);
                assert!(space.get_incoming_set(target).unwrap().contains(&h));
            }
        }
        // Incoming links are resident and list `h` as outgoing.
        for link in space.get_incoming_set(h).unwrap() {
            assert!(space.get_outgoing_set(link).unwrap().contains(&h));
        }
    }
}

fn two_nodes_and_list() -> (AtomSpace, Handle, Handle, Handle) {
    let mut space = AtomSpace::new();
    let first = space.add_node(AtomType::CONCEPT_NODE, "first").unwrap();
    let second = space.add_node(AtomType::CONCEPT_NODE, "second").unwrap();
    let list = space.add_link(AtomType::LIST_LINK, &[first, second]).unwrap();
    (space, first, second, list)
}

// ─────────────────────────────────────────────────────────────────────────────
// Golden Scenarios
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn golden_add_and_remove_list() {
    let (mut space, first, second, list) = two_nodes_and_list();

    assert_eq!(space.get_size(), 3);
    assert_eq!(space.get_outgoing_set(list).unwrap(), vec![first, second]);
    assert_eq!(space.get_incoming_set_size(first).unwrap(), 1);
    assert_eq!(space.get_incoming_set_size(second).unwrap(), 1);

    assert_eq!(
        space.remove_atom(first, false),
        Err(StoreError::HasIncoming {
            handle: first,
            incoming: 1
        })
    );
    assert_eq!(space.get_size(), 3);

    assert_eq!(space.remove_atom(list, false), Ok(1));
    assert_eq!(space.get_size(), 2);
    assert_eq!(space.get_incoming_set_size(first).unwrap(), 0);
    assert_eq!(space.get_incoming_set_size(second).unwrap(), 0);
    assert_consistent(&space);
}

#[test]
fn golden_dedup_is_idempotent() {
    let (mut space, first, second, list) = two_nodes_and_list();
    let before = space.identifier_space();

    assert_eq!(space.add_node(AtomType::CONCEPT_NODE, "first").unwrap(), first);
    assert_eq!(space.add_link(AtomType::LIST_LINK, &[first, second]).unwrap(), list);
    assert_eq!(space.get_size(), 3);
    assert_eq!(space.identifier_space(), before);
    assert_eq!(space.get_incoming_set_size(first).unwrap(), 1);

    // Same name under a different type is a different atom.
    let predicate = space.add_node(AtomType::PREDICATE_NODE, "first").unwrap();
    assert_ne!(predicate, first);
}

#[test]
fn golden_removed_identifier_is_never_reused() {
    let (mut space, first, _, list) = two_nodes_and_list();
    space.remove_atom(list, false).unwrap();

    assert!(matches!(
        space.resolve(list.raw()),
        Err(StoreError::NotFound(_))
    ));
    assert_eq!(
        space.get_incoming_set(list),
        Err(StoreError::StaleReference(list))
    );

    let again = space.add_link(AtomType::LIST_LINK, &[first]).unwrap();
    assert!(again > list);
    assert_eq!(space.resolve(again.raw()), Ok(again));
}

#[test]
fn golden_recursive_removal_of_diamond() {
    //   top
    //   / \
    //  l   r
    //   \ /
    //   base
    let mut space = AtomSpace::new();
    let base = space.add_node(AtomType::CONCEPT_NODE, "base").unwrap();
    let other = space.add_node(AtomType::CONCEPT_NODE, "other").unwrap();
    let l = space.add_link(AtomType::LIST_LINK, &[base]).unwrap();
    let r = space.add_link(AtomType::SET_LINK, &[base, other]).unwrap();
    let top = space.add_link(AtomType::LIST_LINK, &[l, r]).unwrap();

    assert_eq!(space.remove_atom(base, true), Ok(4));
    for h in [base, l, r, top] {
        assert!(!space.contains(h));
    }
    assert!(space.contains(other));
    assert_eq!(space.get_incoming_set_size(other).unwrap(), 0);
    assert_consistent(&space);
}

#[test]
fn golden_definition_projection() {
    let (space, _, _, list) = two_nodes_and_list();
    let def = space.definition(list).unwrap();

    assert_eq!(
        def,
        AtomDefinition::Link {
            atom_type: AtomType::LIST_LINK,
            outgoing: vec![
                AtomDefinition::Node {
                    atom_type: AtomType::CONCEPT_NODE,
                    name: "first".to_string()
                },
                AtomDefinition::Node {
                    atom_type: AtomType::CONCEPT_NODE,
                    name: "second".to_string()
                },
            ],
        }
    );
    assert_eq!(
        def.to_string(),
        r#"(ListLink (ConceptNode "first") (ConceptNode "second"))"#
    );
}

#[test]
fn golden_truth_values_through_trait() {
    fn roundtrip<S: HypergraphStore>(store: &mut S) {
        let a = store.add_node(AtomType::CONCEPT_NODE, "a").unwrap();
        assert!(TruthValue::is_default(&store.get_truth_value(a).unwrap()));

        let tv = std::sync::Arc::new(TruthValue::count(0.7, 0.9, 12.0));
        store.set_truth_value(a, tv.clone()).unwrap();
        assert_eq!(store.get_truth_value(a).unwrap(), tv);
        assert_eq!(store.get_truth_value(a).unwrap().tv_type(), TruthValueType::Count);

        let bad = std::sync::Arc::new(TruthValue::simple(2.0, 0.5));
        assert!(matches!(
            store.set_truth_value(a, bad),
            Err(StoreError::InvalidTruthValue { .. })
        ));
        assert_eq!(store.get_truth_value(a).unwrap(), tv);
    }

    roundtrip(&mut AtomSpace::new());
    roundtrip(&mut atomspace_kernel::SharedAtomSpace::default());
}

#[test]
fn golden_deep_chain_definition_and_estimate() {
    const DEPTH: usize = 200_000;
    let mut space = AtomSpace::new();
    let base = space.add_node(AtomType::CONCEPT_NODE, "base").unwrap();
    let mut top = base;
    for _ in 0..DEPTH {
        top = space.add_link(AtomType::LIST_LINK, &[top]).unwrap();
    }

    let def = space.definition(top).unwrap();
    assert_eq!(def.atom_type(), AtomType::LIST_LINK);
    assert_eq!(def.len(), DEPTH + 1);
    let text = def.to_string();
    assert!(text.ends_with(r#"(ConceptNode "base"))))"#));
    drop(def);

    let per_link = std::mem::size_of::<atomspace_kernel::Atom>() + std::mem::size_of::<Handle>();
    let estimate = space.estimate_atom_size(top).unwrap();
    assert_eq!(
        estimate,
        space.estimate_atom_size(base).unwrap() + DEPTH * per_link
    );

    assert_eq!(space.remove_atom(base, true), Ok(DEPTH + 1));
    assert_eq!(space.get_size(), 0);
}

#[test]
fn golden_subclass_query() {
    let mut space = AtomSpace::new();
    let c = space.add_node(AtomType::CONCEPT_NODE, "c").unwrap();
    let p = space.add_node(AtomType::PREDICATE_NODE, "p").unwrap();
    let g = space
        .add_node(AtomType::GROUNDED_PREDICATE_NODE, "py:g")
        .unwrap();
    let inh = space.add_link(AtomType::INHERITANCE_LINK, &[c, p]).unwrap();

    assert_eq!(space.get_handles_by_type(AtomType::PREDICATE_NODE, false), vec![p]);
    assert_eq!(
        space.get_handles_by_type(AtomType::PREDICATE_NODE, true),
        vec![p, g]
    );
    assert_eq!(space.get_handles_by_type(AtomType::NODE, true), vec![c, p, g]);
    assert_eq!(space.get_handles_by_type(AtomType::LINK, true), vec![inh]);
    assert!(space.get_handles_by_type(AtomType::LINK, false).is_empty());
}

// ─────────────────────────────────────────────────────────────────────────────
// Property Tests
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
enum Op {
    Node(usize, u8),
    Link(usize, Vec<usize>),
    Remove(usize, bool),
}

const NODE_TYPES: &[AtomType] = &[
    AtomType::CONCEPT_NODE,
    AtomType::PREDICATE_NODE,
    AtomType::NUMBER_NODE,
];

const LINK_TYPES: &[AtomType] = &[
    AtomType::LIST_LINK,
    AtomType::SET_LINK,
    AtomType::INHERITANCE_LINK,
    AtomType::CONTEXT_LINK,
    AtomType::NOT_LINK,
];

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (0..NODE_TYPES.len(), 0u8..8).prop_map(|(t, n)| Op::Node(t, n)),
        3 => (0..LINK_TYPES.len(), prop::collection::vec(0usize..64, 0..4))
            .prop_map(|(t, out)| Op::Link(t, out)),
        1 => (0usize..64, any::<bool>()).prop_map(|(i, r)| Op::Remove(i, r)),
    ]
}

fn apply(space: &mut AtomSpace, op: &Op) {
    let live = resident(space);
    let before = space.get_size();
    let result = match op {
        Op::Node(t, n) => space
            .add_node(NODE_TYPES[*t], &n.to_string())
            .map(|_| ()),
        Op::Link(t, picks) => {
            if live.is_empty() {
                return;
            }
            let outgoing: Vec<Handle> = picks.iter().map(|i| live[i % live.len()]).collect();
            space.add_link(LINK_TYPES[*t], &outgoing).map(|_| ())
        }
        Op::Remove(i, recursive) => {
            if live.is_empty() {
                return;
            }
            space.remove_atom(live[i % live.len()], *recursive).map(|_| ())
        }
    };
    if result.is_err() {
        assert_eq!(space.get_size(), before, "failed call changed the store");
    }
}

proptest! {
    #[test]
    fn prop_invariants_hold_after_any_sequence(ops in prop::collection::vec(op_strategy(), 1..60)) {
        let mut space = AtomSpace::new();
        let mut seen: BTreeMap<Handle, AtomDefinition> = BTreeMap::new();
        for op in &ops {
            apply(&mut space, op);
            // No identifier is ever bound to a second atom.
            for h in resident(&space) {
                let def = space.definition(h).unwrap();
                let first = seen.entry(h).or_insert_with(|| def.clone());
                prop_assert_eq!(&*first, &def);
            }
        }
        assert_consistent(&space);
    }

    #[test]
    fn prop_node_dedup(names in prop::collection::vec("[a-c]{1,2}", 1..40)) {
        let mut space = AtomSpace::new();
        for name in &names {
            let h = space.add_node(AtomType::CONCEPT_NODE, name).unwrap();
            prop_assert_eq!(space.add_node(AtomType::CONCEPT_NODE, name).unwrap(), h);
            prop_assert_eq!(space.get_node(AtomType::CONCEPT_NODE, name).unwrap(), h);
        }
        let distinct: BTreeSet<&String> = names.iter().collect();
        prop_assert_eq!(space.get_size(), distinct.len());
    }
}
