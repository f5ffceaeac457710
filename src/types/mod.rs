//! Core types for the hypergraph store.

pub mod atom_type;
pub mod truth;
pub mod atom;
pub mod definition;

pub use atom_type::{AtomType, Arity, TypeDef, TypeRegistry, TypeRegistryError, STANDARD_TYPES};
pub use truth::{TruthValue, TruthValueType};
pub use atom::{Atom, AtomKind, Handle};
pub use definition::AtomDefinition;
