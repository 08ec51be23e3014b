//! Fruit tag to analyzer lookup.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use fruit_vision::{BananaAnalyzer, ClassificationPolicy, FruitAnalyzer};

/// Immutable map from fruit tag to local analyzer.
///
/// Built once at startup; tags are stored lowercase.
#[derive(Clone, Default)]
pub struct AnalyzerRegistry {
    analyzers: BTreeMap<String, Arc<dyn FruitAnalyzer>>,
}

impl AnalyzerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in analyzer.
    pub fn with_defaults(banana_policy: ClassificationPolicy) -> Self {
        Self::new().register("banana", BananaAnalyzer::new(banana_policy))
    }

    /// Register an analyzer under `tag`, replacing any previous one.
    pub fn register(mut self, tag: &str, analyzer: impl FruitAnalyzer + 'static) -> Self {
        self.analyzers
            .insert(tag.trim().to_lowercase(), Arc::new(analyzer));
        self
    }

    /// Look up the analyzer for a normalized tag.
    pub fn get(&self, tag: &str) -> Option<Arc<dyn FruitAnalyzer>> {
        self.analyzers.get(tag).cloned()
    }

    /// Registered tags, sorted.
    pub fn fruits(&self) -> Vec<String> {
        self.analyzers.keys().cloned().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.analyzers.is_empty()
    }
}

impl fmt::Debug for AnalyzerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.analyzers.iter().map(|(tag, a)| (tag, a.name())))
            .finish()
    }
}
