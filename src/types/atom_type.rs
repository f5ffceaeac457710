//! Static atom type hierarchy.
//!
//! Types are small integer tags. The hierarchy is a fixed definition list
//! compiled once into an ancestor bitset per type, so `is_a` is a single
//! mask test. Node-like and link-like categories never overlap.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Maximum number of types a registry can hold (width of the ancestor mask).
pub const MAX_TYPES: usize = 128;

/// Type tag of an atom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AtomType(u16);

impl AtomType {
    /// Create a type tag from its numeric id.
    pub const fn from_id(id: u16) -> Self {
        Self(id)
    }

    /// Numeric id of this type.
    pub const fn id(self) -> u16 {
        self.0
    }

    fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for AtomType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match TypeRegistry::standard().name(*self) {
            Some(name) => write!(f, "{}", name),
            None => write!(f, "Type({})", self.0),
        }
    }
}

// Types serialize by name so configuration files read naturally.
impl Serialize for AtomType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match TypeRegistry::standard().name(*self) {
            Some(name) => serializer.serialize_str(name),
            None => serializer.serialize_u16(self.0),
        }
    }
}

impl<'de> Deserialize<'de> for AtomType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        TypeRegistry::standard()
            .type_by_name(&name)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown atom type: {}", name)))
    }
}

/// Arity rule attached to a link type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Arity {
    /// Any number of outgoing atoms.
    Any,
    /// Exactly `n` outgoing atoms.
    Exactly(usize),
    /// At least `n` outgoing atoms.
    AtLeast(usize),
}

impl Arity {
    /// Whether an outgoing set of length `n` satisfies this rule.
    pub fn admits(self, n: usize) -> bool {
        match self {
            Self::Any => true,
            Self::Exactly(k) => n == k,
            Self::AtLeast(k) => n >= k,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => write!(f, "any"),
            Self::Exactly(n) => write!(f, "exactly {}", n),
            Self::AtLeast(n) => write!(f, "at least {}", n),
        }
    }
}

/// One entry of a type definition list.
#[derive(Debug, Clone, Copy)]
pub struct TypeDef {
    /// The type being defined. Its id must equal its position in the list.
    pub atom_type: AtomType,
    /// Human-readable name, unique within the registry.
    pub name: &'static str,
    /// Direct parents. Each must be defined earlier in the list.
    pub parents: &'static [AtomType],
    /// Outgoing-set arity rule (links only).
    pub arity: Arity,
}

/// Error building a type registry from definitions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TypeRegistryError {
    /// More definitions than the ancestor mask can hold.
    #[error("Too many types: {0} (max {})", MAX_TYPES)]
    TooManyTypes(usize),
    /// A definition's id does not match its position.
    #[error("Type {name} has id {id} but is defined at position {position}")]
    MisplacedType {
        /// Type name.
        name: &'static str,
        /// Declared id.
        id: u16,
        /// Position in the list.
        position: usize,
    },
    /// The list does not start with the Atom, Node and Link roots.
    #[error("Definitions must start with the Atom, Node and Link roots")]
    MissingRoots,
    /// Two definitions share a name.
    #[error("Duplicate type name: {0}")]
    DuplicateName(&'static str),
    /// A parent id is not defined before the child.
    #[error("Type {child} references undefined parent {parent}")]
    UnknownParent {
        /// Child type name.
        child: &'static str,
        /// Offending parent id.
        parent: u16,
    },
    /// A type descends from both Node and Link.
    #[error("Type {0} is both node-like and link-like")]
    MixedCategory(&'static str),
}

macro_rules! atom_types {
    ($( $id:literal => $konst:ident, $name:literal, [$($parent:ident),*], $arity:expr; )*) => {
        impl AtomType {
            $(
                #[doc = concat!("`", $name, "`")]
                pub const $konst: AtomType = AtomType($id);
            )*
        }

        /// Built-in definition list.
        pub const STANDARD_TYPES: &[TypeDef] = &[
            $(
                TypeDef {
                    atom_type: AtomType::$konst,
                    name: $name,
                    parents: &[$(AtomType::$parent),*],
                    arity: $arity,
                },
            )*
        ];
    };
}

atom_types! {
    0 => ATOM, "Atom", [], Arity::Any;
    1 => NODE, "Node", [ATOM], Arity::Any;
    2 => LINK, "Link", [ATOM], Arity::Any;

    3 => CONCEPT_NODE, "ConceptNode", [NODE], Arity::Any;
    4 => PREDICATE_NODE, "PredicateNode", [NODE], Arity::Any;
    5 => GROUNDED_PREDICATE_NODE, "GroundedPredicateNode", [PREDICATE_NODE], Arity::Any;
    6 => SCHEMA_NODE, "SchemaNode", [NODE], Arity::Any;
    7 => GROUNDED_SCHEMA_NODE, "GroundedSchemaNode", [SCHEMA_NODE], Arity::Any;
    8 => NUMBER_NODE, "NumberNode", [NODE], Arity::Any;
    9 => TYPE_NODE, "TypeNode", [NODE], Arity::Any;
    10 => DEFINED_TYPE_NODE, "DefinedTypeNode", [TYPE_NODE], Arity::Any;
    11 => VARIABLE_NODE, "VariableNode", [NODE], Arity::Any;
    12 => GLOB_NODE, "GlobNode", [NODE], Arity::Any;
    13 => ANCHOR_NODE, "AnchorNode", [NODE], Arity::Any;
    14 => WORD_NODE, "WordNode", [NODE], Arity::Any;

    15 => ORDERED_LINK, "OrderedLink", [LINK], Arity::Any;
    16 => UNORDERED_LINK, "UnorderedLink", [LINK], Arity::Any;
    17 => BOOLEAN_INPUT_LINK, "BooleanInputLink", [LINK], Arity::Any;
    18 => BOOLEAN_OUTPUT_LINK, "BooleanOutputLink", [LINK], Arity::Any;
    19 => CRISP_INPUT_LINK, "CrispInputLink", [BOOLEAN_INPUT_LINK], Arity::Any;
    20 => CRISP_OUTPUT_LINK, "CrispOutputLink", [BOOLEAN_OUTPUT_LINK], Arity::Any;
    21 => NUMERIC_INPUT_LINK, "NumericInputLink", [LINK], Arity::Any;
    22 => NUMERIC_OUTPUT_LINK, "NumericOutputLink", [LINK], Arity::Any;
    23 => TYPE_INPUT_LINK, "TypeInputLink", [LINK], Arity::Any;
    24 => TYPE_OUTPUT_LINK, "TypeOutputLink", [LINK], Arity::Any;

    25 => LIST_LINK, "ListLink", [ORDERED_LINK], Arity::Any;
    26 => SET_LINK, "SetLink", [UNORDERED_LINK], Arity::Any;
    27 => MEMBER_LINK, "MemberLink", [ORDERED_LINK], Arity::Any;
    28 => INHERITANCE_LINK, "InheritanceLink", [ORDERED_LINK], Arity::Any;
    29 => SIMILARITY_LINK, "SimilarityLink", [UNORDERED_LINK], Arity::Any;
    30 => SUBSET_LINK, "SubsetLink", [ORDERED_LINK], Arity::Any;
    31 => EVALUATION_LINK, "EvaluationLink", [ORDERED_LINK], Arity::Any;
    32 => EXECUTION_LINK, "ExecutionLink", [ORDERED_LINK], Arity::Any;
    33 => CONTEXT_LINK, "ContextLink", [ORDERED_LINK], Arity::Exactly(2);
    34 => AND_LINK, "AndLink", [UNORDERED_LINK, CRISP_INPUT_LINK, CRISP_OUTPUT_LINK], Arity::Any;
    35 => OR_LINK, "OrLink", [UNORDERED_LINK, CRISP_INPUT_LINK, CRISP_OUTPUT_LINK], Arity::Any;
    36 => NOT_LINK, "NotLink", [ORDERED_LINK, CRISP_INPUT_LINK, CRISP_OUTPUT_LINK], Arity::Exactly(1);
    37 => PLUS_LINK, "PlusLink", [ORDERED_LINK, NUMERIC_INPUT_LINK, NUMERIC_OUTPUT_LINK], Arity::Any;
    38 => TIMES_LINK, "TimesLink", [ORDERED_LINK, NUMERIC_INPUT_LINK, NUMERIC_OUTPUT_LINK], Arity::Any;
    39 => IMPLICATION_LINK, "ImplicationLink", [ORDERED_LINK], Arity::Any;
    40 => EQUIVALENCE_LINK, "EquivalenceLink", [UNORDERED_LINK], Arity::Any;
    41 => FREE_LINK, "FreeLink", [ORDERED_LINK], Arity::Any;
    42 => SCOPE_LINK, "ScopeLink", [ORDERED_LINK], Arity::Any;
    43 => LAMBDA_LINK, "LambdaLink", [SCOPE_LINK], Arity::Any;
    44 => BIND_LINK, "BindLink", [SCOPE_LINK], Arity::AtLeast(2);
    45 => UNIQUE_LINK, "UniqueLink", [FREE_LINK], Arity::Any;
    46 => DEFINE_LINK, "DefineLink", [UNIQUE_LINK], Arity::Exactly(2);
    47 => STATE_LINK, "StateLink", [UNIQUE_LINK], Arity::Exactly(2);
    48 => TYPED_VARIABLE_LINK, "TypedVariableLink", [ORDERED_LINK], Arity::Exactly(2);
    49 => VARIABLE_LIST, "VariableList", [LIST_LINK], Arity::Any;
    50 => VARIABLE_SET, "VariableSet", [UNORDERED_LINK], Arity::Any;
    51 => EXECUTE_THREADED_LINK, "ExecuteThreadedLink", [ORDERED_LINK], Arity::Any;
    52 => SIGNATURE_LINK, "SignatureLink", [TYPE_OUTPUT_LINK], Arity::Exactly(1);
    53 => TYPE_CHOICE, "TypeChoice", [TYPE_OUTPUT_LINK], Arity::Any;
}

/// Compiled type hierarchy with O(1) subtype queries.
#[derive(Debug, Clone)]
pub struct TypeRegistry {
    defs: Vec<TypeDef>,
    /// Bit `j` of `ancestors[i]` is set iff type `i` is-a type `j` (reflexive).
    ancestors: Vec<u128>,
    by_name: HashMap<&'static str, AtomType>,
}

impl TypeRegistry {
    /// Compile a registry from a definition list.
    ///
    /// The list must start with `Atom`, `Node`, `Link` at ids 0, 1, 2, every
    /// id must equal its position, and parents must precede children.
    pub fn from_definitions(defs: &[TypeDef]) -> Result<Self, TypeRegistryError> {
        if defs.len() > MAX_TYPES {
            return Err(TypeRegistryError::TooManyTypes(defs.len()));
        }

        let roots_ok = defs.len() >= 3
            && defs[0].atom_type == AtomType::ATOM
            && defs[0].parents.is_empty()
            && defs[1].atom_type == AtomType::NODE
            && defs[1].parents == [AtomType::ATOM]
            && defs[2].atom_type == AtomType::LINK
            && defs[2].parents == [AtomType::ATOM];
        if !roots_ok {
            return Err(TypeRegistryError::MissingRoots);
        }

        let mut ancestors: Vec<u128> = Vec::with_capacity(defs.len());
        let mut by_name = HashMap::with_capacity(defs.len());

        for (position, def) in defs.iter().enumerate() {
            if def.atom_type.index() != position {
                return Err(TypeRegistryError::MisplacedType {
                    name: def.name,
                    id: def.atom_type.id(),
                    position,
                });
            }
            if by_name.insert(def.name, def.atom_type).is_some() {
                return Err(TypeRegistryError::DuplicateName(def.name));
            }

            let mut mask = 1u128 << position;
            for parent in def.parents {
                let parent_mask = ancestors.get(parent.index()).ok_or(
                    TypeRegistryError::UnknownParent {
                        child: def.name,
                        parent: parent.id(),
                    },
                )?;
                mask |= parent_mask;
            }

            let node_bit = 1u128 << AtomType::NODE.index();
            let link_bit = 1u128 << AtomType::LINK.index();
            if mask & node_bit != 0 && mask & link_bit != 0 {
                return Err(TypeRegistryError::MixedCategory(def.name));
            }

            ancestors.push(mask);
        }

        Ok(Self {
            defs: defs.to_vec(),
            ancestors,
            by_name,
        })
    }

    /// The built-in registry, compiled on first use.
    pub fn standard() -> &'static TypeRegistry {
        Self::shared_standard().as_ref()
    }

    /// Shared handle to the built-in registry.
    pub fn shared() -> Arc<TypeRegistry> {
        Arc::clone(Self::shared_standard())
    }

    fn shared_standard() -> &'static Arc<TypeRegistry> {
        static STANDARD: OnceLock<Arc<TypeRegistry>> = OnceLock::new();
        STANDARD.get_or_init(|| {
            Arc::new(
                TypeRegistry::from_definitions(STANDARD_TYPES)
                    .expect("Built-in type definitions are malformed"),
            )
        })
    }

    /// Number of registered types.
    pub fn len(&self) -> usize {
        self.defs.len()
    }

    /// Whether the registry is empty (never true for a compiled registry).
    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    /// Whether `t` is registered.
    pub fn contains(&self, t: AtomType) -> bool {
        t.index() < self.defs.len()
    }

    /// Reflexive-transitive subtype test. Unknown types are never a subtype.
    pub fn is_a(&self, t: AtomType, base: AtomType) -> bool {
        match (self.ancestors.get(t.index()), self.contains(base)) {
            (Some(mask), true) => mask & (1u128 << base.index()) != 0,
            _ => false,
        }
    }

    /// Whether `t` is a node category.
    pub fn is_node(&self, t: AtomType) -> bool {
        self.is_a(t, AtomType::NODE)
    }

    /// Whether `t` is a link category.
    pub fn is_link(&self, t: AtomType) -> bool {
        self.is_a(t, AtomType::LINK)
    }

    /// Name of `t`, if registered.
    pub fn name(&self, t: AtomType) -> Option<&'static str> {
        self.defs.get(t.index()).map(|d| d.name)
    }

    /// Look up a type by its name.
    pub fn type_by_name(&self, name: &str) -> Option<AtomType> {
        self.by_name.get(name).copied()
    }

    /// Arity rule of `t`. Unregistered types admit any arity.
    pub fn arity(&self, t: AtomType) -> Arity {
        self.defs.get(t.index()).map(|d| d.arity).unwrap_or(Arity::Any)
    }

    /// All registered types, in id order.
    pub fn types(&self) -> impl Iterator<Item = AtomType> + '_ {
        self.defs.iter().map(|d| d.atom_type)
    }

    /// Every type that is-a `base` (including `base`), in id order.
    pub fn subtypes(&self, base: AtomType) -> Vec<AtomType> {
        self.types().filter(|&t| self.is_a(t, base)).collect()
    }
}
