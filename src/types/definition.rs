//! Read-only projection of an atom's definition.
//!
//! A definition is the (type, name) or (type, outgoing) tree of an atom with
//! handles replaced by their own definitions, so it can be re-expressed in
//! another evaluator. `Display` renders the s-expression form:
//!
//! ```text
//! (EvaluationLink (PredicateNode "likes") (ListLink (ConceptNode "a") (ConceptNode "b")))
//! ```
//!
//! `len`, `Display` and `Drop` walk the tree with an explicit stack and accept
//! any depth. The derived `Clone`, `PartialEq` and serde impls recurse.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::atom_type::AtomType;

/// Recursive definition of an atom.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AtomDefinition {
    /// A node definition.
    Node {
        /// Node type.
        atom_type: AtomType,
        /// Node name.
        name: String,
    },
    /// A link definition.
    Link {
        /// Link type.
        atom_type: AtomType,
        /// Definitions of the outgoing atoms, in order.
        outgoing: Vec<AtomDefinition>,
    },
}

impl AtomDefinition {
    /// Type of the defined atom.
    pub fn atom_type(&self) -> AtomType {
        match self {
            Self::Node { atom_type, .. } | Self::Link { atom_type, .. } => *atom_type,
        }
    }

    /// Number of atoms in the definition tree (shared sub-atoms counted per use).
    pub fn len(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(def) = stack.pop() {
            count += 1;
            if let Self::Link { outgoing, .. } = def {
                stack.extend(outgoing);
            }
        }
        count
    }

    /// Always false; a definition describes at least one atom.
    pub fn is_empty(&self) -> bool {
        false
    }
}

impl fmt::Display for AtomDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // `None` closes the innermost open link.
        let mut stack = vec![Some(self)];
        let mut first = true;
        while let Some(step) = stack.pop() {
            let Some(def) = step else {
                f.write_str(")")?;
                continue;
            };
            if !first {
                f.write_str(" ")?;
            }
            first = false;
            match def {
                Self::Node { atom_type, name } => {
                    write!(f, "({} \"", atom_type)?;
                    for c in name.chars() {
                        match c {
                            '"' => f.write_str("\\\"")?,
                            '\\' => f.write_str("\\\\")?,
                            c => write!(f, "{}", c)?,
                        }
                    }
                    f.write_str("\")")?;
                }
                Self::Link { atom_type, outgoing } => {
                    write!(f, "({}", atom_type)?;
                    stack.push(None);
                    stack.extend(outgoing.iter().rev().map(Some));
                }
            }
        }
        Ok(())
    }
}

impl Drop for AtomDefinition {
    fn drop(&mut self) {
        let Self::Link { outgoing, .. } = self else {
            return;
        };
        // Children are emptied before they drop, so no drop nests.
        let mut pending = std::mem::take(outgoing);
        while let Some(mut child) = pending.pop() {
            if let Self::Link { outgoing, .. } = &mut child {
                pending.append(outgoing);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn concept(name: &str) -> AtomDefinition {
        AtomDefinition::Node {
            atom_type: AtomType::CONCEPT_NODE,
            name: name.to_string(),
        }
    }

    #[test]
    fn test_sexpr_rendering() {
        let def = AtomDefinition::Link {
            atom_type: AtomType::LIST_LINK,
            outgoing: vec![concept("a"), concept("b")],
        };
        assert_eq!(
            def.to_string(),
            "(ListLink (ConceptNode \"a\") (ConceptNode \"b\"))"
        );
        assert_eq!(def.len(), 3);
    }

    #[test]
    fn test_empty_link_and_escaping() {
        let empty = AtomDefinition::Link {
            atom_type: AtomType::SET_LINK,
            outgoing: vec![],
        };
        assert_eq!(empty.to_string(), "(SetLink)");
        assert_eq!(concept("say \"hi\"\\").to_string(), "(ConceptNode \"say \\\"hi\\\"\\\\\")");
    }

    #[test]
    fn test_deep_chain_renders_and_drops() {
        let mut def = concept("leaf");
        for _ in 0..100_000 {
            def = AtomDefinition::Link {
                atom_type: AtomType::LIST_LINK,
                outgoing: vec![def],
            };
        }
        assert_eq!(def.len(), 100_001);

        let text = def.to_string();
        assert!(text.starts_with("(ListLink (ListLink "));
        assert!(text.ends_with("(ConceptNode \"leaf\"))))"));
        assert_eq!(text.matches('(').count(), 100_001);
        assert_eq!(text.matches(')').count(), 100_001);
    }

    #[test]
    fn test_nested_rendering() {
        let def = AtomDefinition::Link {
            atom_type: AtomType::EVALUATION_LINK,
            outgoing: vec![
                AtomDefinition::Node {
                    atom_type: AtomType::PREDICATE_NODE,
                    name: "likes".to_string(),
                },
                AtomDefinition::Link {
                    atom_type: AtomType::LIST_LINK,
                    outgoing: vec![concept("a"), concept("b")],
                },
            ],
        };
        assert_eq!(
            def.to_string(),
            r#"(EvaluationLink (PredicateNode "likes") (ListLink (ConceptNode "a") (ConceptNode "b")))"#
        );
        assert_eq!(def.len(), 5);
    }

    #[test]
    fn test_serde_shape() {
        let json = serde_json::to_value(concept("x")).unwrap();
        assert_eq!(json["kind"], "node");
        assert_eq!(json["atom_type"], "ConceptNode");
        assert_eq!(json["name"], "x");
    }
}
