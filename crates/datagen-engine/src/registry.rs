//! Registry of user-supplied generation strategies for custom nodes.

use datagen_core::{ConstructError, GeneratedValue, ValueType};
use rand::RngCore;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Strategy producing values for `NodeKind::Custom` nodes.
pub trait CustomGenerator: fmt::Debug + Send + Sync {
    /// Produce a value of `target` using `rng`.
    fn generate(
        &self,
        rng: &mut dyn RngCore,
        target: &ValueType,
    ) -> Result<GeneratedValue, ConstructError>;
}

/// Strategies addressable by name from a schema.
#[derive(Debug, Clone, Default)]
pub struct CustomRegistry {
    strategies: HashMap<String, Arc<dyn CustomGenerator>>,
}

impl CustomRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `strategy` under `name`, replacing any earlier registration.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        strategy: impl CustomGenerator + 'static,
    ) -> &mut Self {
        self.strategies.insert(name.into(), Arc::new(strategy));
        self
    }

    /// Look up a strategy.
    pub fn get(&self, name: &str) -> Option<Arc<dyn CustomGenerator>> {
        self.strategies.get(name).cloned()
    }

    /// Check whether `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.strategies.contains_key(name)
    }

    /// Registered strategy names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.strategies.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
