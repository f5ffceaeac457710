//! Truth value payloads attached to atoms.
//!
//! The store treats these as opaque: it only needs a type tag, a byte size
//! and a well-formedness check. All atoms start out sharing one immutable
//! default value.

use std::fmt;
use std::sync::{Arc, OnceLock};

use serde::{Deserialize, Serialize};

/// Tag identifying the representation of a truth value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TruthValueType {
    /// Strength and confidence.
    Simple,
    /// Strength, confidence and an observation count.
    Count,
    /// Interval bounds with a confidence level.
    Indefinite,
}

impl fmt::Display for TruthValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Simple => write!(f, "simple"),
            Self::Count => write!(f, "count"),
            Self::Indefinite => write!(f, "indefinite"),
        }
    }
}

/// Probabilistic annotation carried by every atom.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TruthValue {
    /// Strength and confidence, both in [0, 1].
    Simple {
        /// Probability-like strength.
        strength: f64,
        /// Confidence in the strength.
        confidence: f64,
    },
    /// Strength and confidence backed by an evidence count.
    Count {
        /// Probability-like strength.
        strength: f64,
        /// Confidence in the strength.
        confidence: f64,
        /// Number of observations (non-negative).
        count: f64,
    },
    /// Imprecise probability interval.
    Indefinite {
        /// Lower bound in [0, 1].
        lower: f64,
        /// Upper bound in [0, 1], not below `lower`.
        upper: f64,
        /// Credibility of the interval in [0, 1].
        confidence_level: f64,
    },
}

impl TruthValue {
    /// Create a simple truth value.
    pub fn simple(strength: f64, confidence: f64) -> Self {
        Self::Simple { strength, confidence }
    }

    /// Create a count truth value.
    pub fn count(strength: f64, confidence: f64, count: f64) -> Self {
        Self::Count { strength, confidence, count }
    }

    /// Create an indefinite truth value.
    pub fn indefinite(lower: f64, upper: f64, confidence_level: f64) -> Self {
        Self::Indefinite { lower, upper, confidence_level }
    }

    /// The shared default truth value every new atom starts with.
    pub fn default_tv() -> Arc<TruthValue> {
        static DEFAULT_TV: OnceLock<Arc<TruthValue>> = OnceLock::new();
        Arc::clone(DEFAULT_TV.get_or_init(|| Arc::new(TruthValue::simple(1.0, 0.0))))
    }

    /// Whether `tv` is the shared default instance (identity, not value).
    pub fn is_default(tv: &Arc<TruthValue>) -> bool {
        Arc::ptr_eq(tv, &Self::default_tv())
    }

    /// Representation tag.
    pub fn tv_type(&self) -> TruthValueType {
        match self {
            Self::Simple { .. } => TruthValueType::Simple,
            Self::Count { .. } => TruthValueType::Count,
            Self::Indefinite { .. } => TruthValueType::Indefinite,
        }
    }

    /// Payload size in bytes, used for memory estimates.
    pub fn byte_size(&self) -> usize {
        let fields = match self.tv_type() {
            TruthValueType::Simple => 2,
            TruthValueType::Count | TruthValueType::Indefinite => 3,
        };
        fields * std::mem::size_of::<f64>()
    }

    /// Check that every component is finite and in range.
    pub fn validate(&self) -> Result<(), String> {
        match *self {
            Self::Simple { strength, confidence } => {
                unit("strength", strength)?;
                unit("confidence", confidence)
            }
            Self::Count { strength, confidence, count } => {
                unit("strength", strength)?;
                unit("confidence", confidence)?;
                if !count.is_finite() || count < 0.0 {
                    return Err(format!("count must be finite and non-negative, got {}", count));
                }
                Ok(())
            }
            Self::Indefinite { lower, upper, confidence_level } => {
                unit("lower", lower)?;
                unit("upper", upper)?;
                unit("confidence_level", confidence_level)?;
                if lower > upper {
                    return Err(format!("lower bound {} exceeds upper bound {}", lower, upper));
                }
                Ok(())
            }
        }
    }
}

fn unit(field: &str, value: f64) -> Result<(), String> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(format!("{} must be in [0, 1], got {}", field, value))
    }
}

impl fmt::Display for TruthValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Simple { strength, confidence } => {
                write!(f, "(stv {} {})", strength, confidence)
            }
            Self::Count { strength, confidence, count } => {
                write!(f, "(ctv {} {} {})", strength, confidence, count)
            }
            Self::Indefinite { lower, upper, confidence_level } => {
                write!(f, "(itv {} {} {})", lower, upper, confidence_level)
            }
        }
    }
}
