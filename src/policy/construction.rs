//! Construction policy: parameters of the random graph generator.
//!
//! ## Float Normalization for Deterministic Hashing
//!
//! Floats are quantized to integers before hashing (multiply by 1e6, round
//! to i64) so `params_hash` does not depend on float formatting.

use serde::{Deserialize, Serialize};

use crate::canonical::canonical_hash_hex;
use crate::types::{AtomType, TypeRegistry};
use crate::DEFAULT_POLICY_VERSION;
use super::GeneratorError;

/// Quantization factor for float normalization.
const FLOAT_QUANTIZATION_FACTOR: f64 = 1_000_000.0;

/// Seed used when none is configured.
pub const DEFAULT_SEED: u64 = 0x5EED_2018;

/// Categories whose members (and subtypes) cannot take synthetic names or
/// arbitrary outgoing sets. Never drawn as a random type.
pub const EXCLUDED_CATEGORIES: &[AtomType] = &[
    AtomType::BOOLEAN_INPUT_LINK,
    AtomType::BOOLEAN_OUTPUT_LINK,
    AtomType::CRISP_INPUT_LINK,
    AtomType::CRISP_OUTPUT_LINK,
    AtomType::NUMERIC_INPUT_LINK,
    AtomType::NUMERIC_OUTPUT_LINK,
    AtomType::TYPE_INPUT_LINK,
    AtomType::TYPE_OUTPUT_LINK,
    AtomType::EXECUTE_THREADED_LINK,
    AtomType::FREE_LINK,
    AtomType::SCOPE_LINK,
    AtomType::UNIQUE_LINK,
    AtomType::TYPED_VARIABLE_LINK,
    AtomType::TYPE_NODE,
];

/// Exact types never drawn as a random type (subtypes are unaffected).
pub const EXCLUDED_TYPES: &[AtomType] = &[
    AtomType::VARIABLE_LIST,
    AtomType::VARIABLE_SET,
    AtomType::DEFINE_LINK,
    AtomType::NUMBER_NODE,
];

/// Whether `t` may be drawn as a random type.
pub fn is_synthesizable(registry: &TypeRegistry, t: AtomType) -> bool {
    !EXCLUDED_TYPES.contains(&t)
        && !EXCLUDED_CATEGORIES
            .iter()
            .any(|&category| registry.is_a(t, category))
}

/// Parameters for [`RandomGraphBuilder`](super::RandomGraphBuilder).
///
/// ## Parameters
///
/// - `percent_links`: fraction of generated atoms that are links
/// - `default_node_type` / `default_link_type`: type used unless a random one is drawn
/// - `chance_of_non_default_node` / `chance_of_non_default_link`: probability of
///   drawing a random synthesizable subtype of Node / Link instead
/// - `link_size_mean`: mean of the Poisson distribution for link arity
/// - `seed`: RNG seed; equal seeds give equal construction sequences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConstructionPolicy {
    /// Policy version identifier.
    pub version: String,
    /// Fraction of links in the generated atoms, in [0, 1].
    pub percent_links: f64,
    /// Default node type.
    pub default_node_type: AtomType,
    /// Probability of a random node type, in [0, 1].
    pub chance_of_non_default_node: f64,
    /// Default link type.
    pub default_link_type: AtomType,
    /// Probability of a random link type, in [0, 1].
    pub chance_of_non_default_link: f64,
    /// Poisson mean of link arity (> 0).
    pub link_size_mean: f64,
    /// RNG seed.
    pub seed: u64,
}

impl Default for ConstructionPolicy {
    fn default() -> Self {
        Self {
            version: DEFAULT_POLICY_VERSION.to_string(),
            percent_links: 0.2,
            default_node_type: AtomType::CONCEPT_NODE,
            chance_of_non_default_node: 0.4,
            default_link_type: AtomType::INHERITANCE_LINK,
            chance_of_non_default_link: 0.4,
            link_size_mean: 2.0,
            seed: DEFAULT_SEED,
        }
    }
}

/// Quantized policy parameters for deterministic hashing.
#[derive(Debug, Clone, Serialize)]
struct QuantizedPolicyParams<'a> {
    version: &'a str,
    percent_links: i64,
    default_node_type: AtomType,
    chance_of_non_default_node: i64,
    default_link_type: AtomType,
    chance_of_non_default_link: i64,
    link_size_mean: i64,
    seed: u64,
}

fn quantize_float(value: f64) -> i64 {
    (value * FLOAT_QUANTIZATION_FACTOR).round() as i64
}

impl ConstructionPolicy {
    /// Default policy with a specific seed.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }

    /// Parse a policy from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, GeneratorError> {
        serde_json::from_str(json).map_err(|e| GeneratorError::InvalidPolicy(e.to_string()))
    }

    /// Check ranges and that default types belong to the right category.
    pub fn validate(&self, registry: &TypeRegistry) -> Result<(), GeneratorError> {
        let probabilities = [
            ("percent_links", self.percent_links),
            ("chance_of_non_default_node", self.chance_of_non_default_node),
            ("chance_of_non_default_link", self.chance_of_non_default_link),
        ];
        for (field, value) in probabilities {
            if !(0.0..=1.0).contains(&value) {
                return Err(GeneratorError::InvalidPolicy(format!(
                    "{} must be in [0, 1], got {}",
                    field, value
                )));
            }
        }
        if !self.link_size_mean.is_finite() || self.link_size_mean <= 0.0 {
            return Err(GeneratorError::InvalidPolicy(format!(
                "link_size_mean must be positive, got {}",
                self.link_size_mean
            )));
        }
        if self.default_node_type == AtomType::NODE || !registry.is_node(self.default_node_type) {
            return Err(GeneratorError::InvalidPolicy(format!(
                "default_node_type {} is not a concrete node type",
                self.default_node_type
            )));
        }
        if self.default_link_type == AtomType::LINK || !registry.is_link(self.default_link_type) {
            return Err(GeneratorError::InvalidPolicy(format!(
                "default_link_type {} is not a concrete link type",
                self.default_link_type
            )));
        }
        Ok(())
    }

    /// Hash of the policy parameters, stable across platforms.
    pub fn params_hash(&self) -> String {
        canonical_hash_hex(&QuantizedPolicyParams {
            version: &self.version,
            percent_links: quantize_float(self.percent_links),
            default_node_type: self.default_node_type,
            chance_of_non_default_node: quantize_float(self.chance_of_non_default_node),
            default_link_type: self.default_link_type,
            chance_of_non_default_link: quantize_float(self.chance_of_non_default_link),
            link_size_mean: quantize_float(self.link_size_mean),
            seed: self.seed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(ConstructionPolicy::default()
            .validate(TypeRegistry::standard())
            .is_ok());
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let reg = TypeRegistry::standard();

        let mut p = ConstructionPolicy::default();
        p.percent_links = 1.5;
        assert!(p.validate(reg).is_err());

        let mut p = ConstructionPolicy::default();
        p.link_size_mean = 0.0;
        assert!(p.validate(reg).is_err());

        let mut p = ConstructionPolicy::default();
        p.default_node_type = AtomType::LIST_LINK;
        assert!(p.validate(reg).is_err());

        let mut p = ConstructionPolicy::default();
        p.default_link_type = AtomType::CONCEPT_NODE;
        assert!(p.validate(reg).is_err());
    }

    #[test]
    fn test_validation_rejects_abstract_roots() {
        let reg = TypeRegistry::standard();

        let mut p = ConstructionPolicy::default();
        p.default_node_type = AtomType::NODE;
        assert!(matches!(p.validate(reg), Err(GeneratorError::InvalidPolicy(_))));

        let mut p = ConstructionPolicy::default();
        p.default_link_type = AtomType::LINK;
        assert!(matches!(p.validate(reg), Err(GeneratorError::InvalidPolicy(_))));

        let mut p = ConstructionPolicy::default();
        p.default_node_type = AtomType::PREDICATE_NODE;
        p.default_link_type = AtomType::SET_LINK;
        assert!(p.validate(reg).is_ok());
    }

    #[test]
    fn test_params_hash() {
        assert_eq!(
            ConstructionPolicy::default().params_hash(),
            ConstructionPolicy::default().params_hash()
        );
        assert_ne!(
            ConstructionPolicy::with_seed(1).params_hash(),
            ConstructionPolicy::with_seed(2).params_hash()
        );
    }

    #[test]
    fn test_from_json_partial() {
        let p = ConstructionPolicy::from_json(
            r#"{"seed": 7, "default_link_type": "ListLink", "percent_links": 0.5}"#,
        )
        .unwrap();
        assert_eq!(p.seed, 7);
        assert_eq!(p.default_link_type, AtomType::LIST_LINK);
        assert_eq!(p.percent_links, 0.5);
        assert_eq!(p.default_node_type, AtomType::CONCEPT_NODE);

        assert!(matches!(
            ConstructionPolicy::from_json(r#"{"default_node_type": "Bogus"}"#),
            Err(GeneratorError::InvalidPolicy(_))
        ));
    }

    #[test]
    fn test_excluded_types() {
        let reg = TypeRegistry::standard();
        assert!(is_synthesizable(reg, AtomType::CONCEPT_NODE));
        assert!(is_synthesizable(reg, AtomType::CONTEXT_LINK));
        assert!(is_synthesizable(reg, AtomType::LIST_LINK));
        assert!(!is_synthesizable(reg, AtomType::VARIABLE_LIST));
        assert!(!is_synthesizable(reg, AtomType::NUMBER_NODE));
        assert!(!is_synthesizable(reg, AtomType::DEFINED_TYPE_NODE));
        assert!(!is_synthesizable(reg, AtomType::AND_LINK));
        assert!(!is_synthesizable(reg, AtomType::BIND_LINK));
        assert!(!is_synthesizable(reg, AtomType::STATE_LINK));
        assert!(!is_synthesizable(reg, AtomType::SIGNATURE_LINK));
    }
}
