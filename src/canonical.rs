//! Canonical serialization for deterministic hashing.
//!
//! Used to fingerprint construction logs and generator parameters so that
//! two runs can be compared byte for byte.
//!
//! ## Determinism Guarantees
//!
//! - Stable field order: Struct fields serialize in declaration order
//! - Stable Vec order: Vectors serialize in index order
//! - No HashMap allowed: Use BTreeMap for maps in hashed data
//! - Floats are quantized by callers before hashing
//!
//! `serde_json` writes struct fields in the order the derive lists them and
//! never reorders keys, so the bytes follow the type definitions. `StoreStats`
//! keeps `by_type` in a `BTreeMap`, which iterates in key order whatever order
//! the atoms were added in, so equal contents hash equal. Reordering the fields of a
//! hashed type changes every fingerprint built from it.

use serde::Serialize;
use xxhash_rust::xxh64::xxh64;

/// Serialize a value to canonical JSON bytes for hashing.
pub fn to_canonical_bytes<T: Serialize>(value: &T) -> Vec<u8> {
    serde_json::to_vec(value).expect("Canonical serialization failed")
}

/// Compute canonical hash of a serializable value.
pub fn canonical_hash<T: Serialize>(value: &T) -> u64 {
    let bytes = to_canonical_bytes(value);
    xxh64(&bytes, 0)
}

/// Compute canonical hash and return as hex string.
pub fn canonical_hash_hex<T: Serialize>(value: &T) -> String {
    format!("{:016x}", canonical_hash(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AtomType, Handle};

    #[derive(Serialize)]
    struct Call {
        atom_type: AtomType,
        outgoing: Vec<Handle>,
    }

    #[test]
    fn test_determinism() {
        let c = Call {
            atom_type: AtomType::LIST_LINK,
            outgoing: vec![Handle::from_raw(1), Handle::from_raw(2)],
        };
        assert_eq!(canonical_hash(&c), canonical_hash(&c));
        assert_eq!(
            to_canonical_bytes(&c),
            br#"{"atom_type":"ListLink","outgoing":[1,2]}"#.to_vec()
        );
        assert_eq!(canonical_hash_hex(&c).len(), 16);
    }

    #[test]
    fn test_stats_hash_ignores_insertion_order() {
        use crate::AtomSpace;

        let mut forward = AtomSpace::new();
        forward.add_node(AtomType::PREDICATE_NODE, "p").unwrap();
        forward.add_node(AtomType::CONCEPT_NODE, "c").unwrap();
        let mut reverse = AtomSpace::new();
        reverse.add_node(AtomType::CONCEPT_NODE, "c").unwrap();
        reverse.add_node(AtomType::PREDICATE_NODE, "p").unwrap();

        let bytes = to_canonical_bytes(&forward.stats());
        assert_eq!(bytes, to_canonical_bytes(&reverse.stats()));
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains(r#""by_type":{"ConceptNode":1,"PredicateNode":1}"#));
    }

    #[test]
    fn test_order_matters() {
        let ab = Call {
            atom_type: AtomType::LIST_LINK,
            outgoing: vec![Handle::from_raw(1), Handle::from_raw(2)],
        };
        let ba = Call {
            atom_type: AtomType::LIST_LINK,
            outgoing: vec![Handle::from_raw(2), Handle::from_raw(1)],
        };
        assert_ne!(canonical_hash(&ab), canonical_hash(&ba));
    }
}
