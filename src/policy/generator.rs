//! Seeded random graph construction.
//!
//! ## Algorithm
//!
//! 1. Add `round(target × (1 − percent_links))` nodes
//! 2. Add the remaining links over uniformly sampled resident handles
//! 3. Record every store call in a [`ConstructionLog`]
//!
//! Handles are sampled uniformly over the identifier space and resampled on
//! a miss, so removals between builds do not bias the draw.
//!
//! ## Determinism
//!
//! The RNG is ChaCha8 seeded from the policy, so the same policy against a
//! store in the same state yields a byte-identical construction log.

use std::sync::Arc;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Poisson};
use serde::{Deserialize, Serialize};

use crate::canonical::{canonical_hash_hex, to_canonical_bytes};
use crate::store::{HypergraphStore, StoreError};
use crate::types::{Arity, AtomType, Handle, TypeRegistry};
use super::construction::{is_synthesizable, ConstructionPolicy};
use super::GeneratorError;

/// One store call issued by the generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ConstructionCall {
    /// `add_node(atom_type, name)`.
    AddNode {
        /// Node type.
        atom_type: AtomType,
        /// Node name.
        name: String,
    },
    /// `add_link(atom_type, outgoing)`.
    AddLink {
        /// Link type.
        atom_type: AtomType,
        /// Outgoing handles.
        outgoing: Vec<Handle>,
    },
}

impl ConstructionCall {
    /// Type carried by the call.
    pub fn atom_type(&self) -> AtomType {
        match self {
            ConstructionCall::AddNode { atom_type, .. }
            | ConstructionCall::AddLink { atom_type, .. } => *atom_type,
        }
    }

    /// Issue this call against a store.
    pub fn apply<S: HypergraphStore + ?Sized>(&self, store: &mut S) -> Result<Handle, StoreError> {
        match self {
            ConstructionCall::AddNode { atom_type, name } => store.add_node(*atom_type, name),
            ConstructionCall::AddLink { atom_type, outgoing } => {
                store.add_link(*atom_type, outgoing)
            }
        }
    }
}

/// Ordered record of the calls made by one build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstructionLog {
    /// `params_hash` of the policy that produced the log.
    pub policy_hash: String,
    /// Calls in issue order.
    pub calls: Vec<ConstructionCall>,
    /// Handle returned by each call.
    pub handles: Vec<Handle>,
}

impl ConstructionLog {
    /// Number of calls.
    pub fn len(&self) -> usize {
        self.calls.len()
    }

    /// Check if no calls were made.
    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    /// Number of `add_node` calls.
    pub fn node_calls(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, ConstructionCall::AddNode { .. }))
            .count()
    }

    /// Number of `add_link` calls.
    pub fn link_calls(&self) -> usize {
        self.len() - self.node_calls()
    }

    /// Canonical bytes of the log.
    pub fn to_bytes(&self) -> Vec<u8> {
        to_canonical_bytes(self)
    }

    /// Hex fingerprint of the log.
    pub fn fingerprint(&self) -> String {
        canonical_hash_hex(self)
    }
}

/// Seeded generator of random nodes and links.
#[derive(Debug)]
pub struct RandomGraphBuilder {
    policy: ConstructionPolicy,
    registry: Arc<TypeRegistry>,
    rng: ChaCha8Rng,
    link_size: Poisson<f64>,
    node_types: Vec<AtomType>,
    link_types: Vec<AtomType>,
    counter: u64,
}

impl RandomGraphBuilder {
    /// Create a builder over the standard type registry.
    pub fn new(policy: ConstructionPolicy) -> Result<Self, GeneratorError> {
        let registry = TypeRegistry::shared();
        policy.validate(&registry)?;
        let link_size = Poisson::new(policy.link_size_mean)
            .map_err(|e| GeneratorError::InvalidPolicy(e.to_string()))?;
        let node_types = synthesizable_subtypes(&registry, AtomType::NODE);
        let link_types = synthesizable_subtypes(&registry, AtomType::LINK);

        Ok(Self {
            rng: ChaCha8Rng::seed_from_u64(policy.seed),
            policy,
            registry,
            link_size,
            node_types,
            link_types,
            counter: 0,
        })
    }

    /// Policy in use.
    pub fn policy(&self) -> &ConstructionPolicy {
        &self.policy
    }

    /// Draw a uniformly random synthesizable subtype of `base`.
    ///
    /// Returns `None` if `base` has no synthesizable subtype.
    pub fn random_type(&mut self, base: AtomType) -> Option<AtomType> {
        let candidates = match base {
            AtomType::NODE => &self.node_types,
            AtomType::LINK => &self.link_types,
            _ => return pick(&mut self.rng, &synthesizable_subtypes(&self.registry, base)),
        };
        pick(&mut self.rng, candidates)
    }

    /// Draw a uniformly random resident handle.
    pub fn random_handle<S: HypergraphStore + ?Sized>(
        &mut self,
        store: &S,
    ) -> Result<Handle, GeneratorError> {
        if store.get_size() == 0 {
            return Err(GeneratorError::NoResidentAtoms);
        }
        let space = store.identifier_space();
        loop {
            let raw = self.rng.gen_range(0..space);
            match store.resolve(raw) {
                Ok(handle) => return Ok(handle),
                Err(StoreError::NotFound(_)) => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Make the next `add_node` call without issuing it.
    pub fn next_node_call(&mut self) -> ConstructionCall {
        let atom_type = self.draw_type(
            self.policy.chance_of_non_default_node,
            self.policy.default_node_type,
            AtomType::NODE,
        );
        self.counter += 1;
        let name = if atom_type == AtomType::NUMBER_NODE {
            self.counter.to_string()
        } else {
            format!("node {}", self.counter)
        };
        ConstructionCall::AddNode { atom_type, name }
    }

    /// Make the next `add_link` call over atoms resident in `store`.
    pub fn next_link_call<S: HypergraphStore + ?Sized>(
        &mut self,
        store: &S,
    ) -> Result<ConstructionCall, GeneratorError> {
        let atom_type = self.draw_type(
            self.policy.chance_of_non_default_link,
            self.policy.default_link_type,
            AtomType::LINK,
        );
        let sampled = (self.link_size.sample(&mut self.rng) as usize).max(1);
        let arity = match self.registry.arity(atom_type) {
            Arity::Exactly(n) => n,
            Arity::AtLeast(n) => sampled.max(n),
            Arity::Any => sampled,
        };
        let outgoing = (0..arity)
            .map(|_| self.random_handle(store))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ConstructionCall::AddLink { atom_type, outgoing })
    }

    /// Populate `store` with `target_count` generated calls.
    ///
    /// Calls that return an existing atom still count toward the target,
    /// so the store may grow by fewer than `target_count` atoms.
    pub fn build<S: HypergraphStore + ?Sized>(
        &mut self,
        store: &mut S,
        target_count: usize,
    ) -> Result<ConstructionLog, GeneratorError> {
        let node_count =
            ((target_count as f64) * (1.0 - self.policy.percent_links)).round() as usize;
        let node_count = node_count.min(target_count);
        let link_count = target_count - node_count;
        let size_before = store.get_size();

        let mut log = ConstructionLog {
            policy_hash: self.policy.params_hash(),
            calls: Vec::with_capacity(target_count),
            handles: Vec::with_capacity(target_count),
        };

        for _ in 0..node_count {
            let call = self.next_node_call();
            let handle = call.apply(store)?;
            log.calls.push(call);
            log.handles.push(handle);
        }
        for _ in 0..link_count {
            let call = self.next_link_call(store)?;
            let handle = call.apply(store)?;
            log.calls.push(call);
            log.handles.push(handle);
        }

        tracing::info!(
            seed = self.policy.seed,
            nodes = node_count,
            links = link_count,
            created = store.get_size().saturating_sub(size_before),
            fingerprint = %log.fingerprint(),
            "Random graph built"
        );
        Ok(log)
    }

    fn draw_type(&mut self, chance: f64, default: AtomType, base: AtomType) -> AtomType {
        if self.rng.gen::<f64>() < chance {
            self.random_type(base).unwrap_or(default)
        } else {
            default
        }
    }
}

fn synthesizable_subtypes(registry: &TypeRegistry, base: AtomType) -> Vec<AtomType> {
    registry
        .subtypes(base)
        .into_iter()
        .filter(|&t| t != base && is_synthesizable(registry, t))
        .collect()
}

fn pick(rng: &mut ChaCha8Rng, candidates: &[AtomType]) -> Option<AtomType> {
    if candidates.is_empty() {
        None
    } else {
        Some(candidates[rng.gen_range(0..candidates.len())])
    }
}
