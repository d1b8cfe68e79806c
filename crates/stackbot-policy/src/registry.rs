//! Policies addressed by name.
//!
//! Series records name their policy. Three heuristic policies are registered
//! up front; the [`TRAINING_SENTINEL`] name refers to a cluster-value policy
//! that does not exist until it has been trained, so resolving it before
//! registration reports [`Resolution::NeedsTraining`] instead of an error.

use std::collections::BTreeMap;

use crate::policy::{LeastFreeHeightPolicy, Policy, QuadraticHeightPolicy, RandomPolicy};

/// Name that triggers on-demand training of a cluster-value policy.
pub const TRAINING_SENTINEL: &str = "reinforcement-learning";

/// Alternative spellings accepted for the built-in names.
const ALIASES: &[(&str, &str)] = &[
    ("aleatoria", "random"),
    ("menor_altura", "least-height"),
    ("least_height", "least-height"),
    ("quadratica", "quadratic"),
    ("reinforcement_learning", TRAINING_SENTINEL),
];

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("unknown policy {name:?} (known policies: {})", known.join(", "))]
pub struct UnknownPolicy {
    #[error(not(source))]
    pub name: String,
    /// Names that would have resolved.
    pub known: Vec<String>,
}

/// Outcome of looking up a policy name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum Resolution {
    /// A policy is registered under the name.
    Known,
    /// The name is the training sentinel and nothing is registered yet.
    NeedsTraining,
}

#[derive(Debug)]
pub struct PolicyRegistry {
    policies: BTreeMap<String, Box<dyn Policy>>,
}

impl Default for PolicyRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl PolicyRegistry {
    /// Creates a registry holding the heuristic policies.
    #[must_use]
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register("random", Box::new(RandomPolicy));
        registry.register("least-height", Box::new(LeastFreeHeightPolicy));
        registry.register("quadratic", Box::new(QuadraticHeightPolicy));
        registry
    }

    #[must_use]
    pub fn empty() -> Self {
        Self {
            policies: BTreeMap::new(),
        }
    }

    /// Maps an alias to its canonical name; other names are returned as is.
    #[must_use]
    pub fn canonical_name(name: &str) -> &str {
        ALIASES
            .iter()
            .find(|(alias, _)| *alias == name)
            .map_or(name, |&(_, canonical)| canonical)
    }

    /// Installs `policy` under `name`, replacing any previous entry.
    pub fn register(&mut self, name: &str, policy: Box<dyn Policy>) {
        self.policies
            .insert(Self::canonical_name(name).to_owned(), policy);
    }

    pub fn resolve(&self, name: &str) -> Result<Resolution, UnknownPolicy> {
        let name = Self::canonical_name(name);
        if self.policies.contains_key(name) {
            Ok(Resolution::Known)
        } else if name == TRAINING_SENTINEL {
            Ok(Resolution::NeedsTraining)
        } else {
            Err(self.unknown(name))
        }
    }

    pub fn get_mut(&mut self, name: &str) -> Result<&mut dyn Policy, UnknownPolicy> {
        let name = Self::canonical_name(name);
        if !self.policies.contains_key(name) {
            return Err(self.unknown(name));
        }
        Ok(self.policies.get_mut(name).expect("checked above").as_mut())
    }

    /// Registered names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.policies.keys().map(String::as_str)
    }

    fn unknown(&self, name: &str) -> UnknownPolicy {
        let mut known: Vec<String> = self.names().map(str::to_owned).collect();
        if !self.policies.contains_key(TRAINING_SENTINEL) {
            known.push(TRAINING_SENTINEL.to_owned());
        }
        UnknownPolicy {
            name: name.to_owned(),
            known,
        }
    }
}
