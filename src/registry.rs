// SPDX-License-Identifier: PMPL-1.0-or-later
//! Rule registry: id → rule, in registration order.
//!
//! Each registry is an explicit instance owned by its caller; there is no
//! process-wide default.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::error::RegistryError;
use crate::rule::Rule;
use crate::runner::RunFilter;
use crate::types::RuleCategory;

#[derive(Default)]
pub struct RuleRegistry {
    rules: Vec<Arc<dyn Rule>>,
    index: HashMap<String, usize>,
}

impl RuleRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the built-in heading rules
    pub fn with_default_rules() -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        crate::rules::register_default_rules(&mut registry)?;
        Ok(registry)
    }

    /// Register a rule; a duplicate id is rejected and leaves the registry unchanged
    pub fn register<R: Rule + 'static>(&mut self, rule: R) -> Result<(), RegistryError> {
        self.register_shared(Arc::new(rule))
    }

    /// Register an already shared rule
    pub fn register_shared(&mut self, rule: Arc<dyn Rule>) -> Result<(), RegistryError> {
        let id = rule.id().to_string();
        if self.index.contains_key(&id) {
            return Err(RegistryError::DuplicateRule(id));
        }
        debug!("Registering rule {}", id);
        self.index.insert(id, self.rules.len());
        self.rules.push(rule);
        Ok(())
    }

    pub fn get_by_id(&self, id: &str) -> Option<&dyn Rule> {
        self.index.get(id).map(|&i| self.rules[i].as_ref())
    }

    pub fn get_by_category(&self, category: RuleCategory) -> Vec<&dyn Rule> {
        self.rules
            .iter()
            .filter(|r| r.metadata().has_category(category))
            .map(|r| r.as_ref())
            .collect()
    }

    /// All rules in registration order
    pub fn all(&self) -> Vec<&dyn Rule> {
        self.rules.iter().map(|r| r.as_ref()).collect()
    }

    /// Rule ids in registration order
    pub fn ids(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.id()).collect()
    }

    /// Rules a run with this filter considers, in registration order
    pub fn select(&self, filter: &RunFilter) -> Vec<Arc<dyn Rule>> {
        self.rules
            .iter()
            .filter(|r| filter.matches(r.metadata()))
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl fmt::Debug for RuleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleRegistry").field("rules", &self.ids()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use crate::error::RuleExecutionError;
    use crate::rule::{ResultSink, RuleMetadata};
    use async_trait::async_trait;

    struct StubRule {
        metadata: RuleMetadata,
    }

    impl StubRule {
        fn new(id: &str, name: &str, category: RuleCategory) -> Self {
            Self {
                metadata: RuleMetadata::new(id, name, "stub").with_categories(&[category]),
            }
        }
    }

    #[async_trait(?Send)]
    impl Rule for StubRule {
        fn metadata(&self) -> &RuleMetadata {
            &self.metadata
        }

        fn is_applicable(&self, _document: &Document) -> bool {
            true
        }

        async fn execute(
            &self,
            _document: &Document,
            _sink: &mut dyn ResultSink,
        ) -> Result<(), RuleExecutionError> {
            Ok(())
        }
    }

    #[test]
    fn test_register_and_lookup() {
        let mut registry = RuleRegistry::new();
        registry.register(StubRule::new("a", "A", RuleCategory::Structure)).unwrap();
        registry.register(StubRule::new("b", "B", RuleCategory::Aria)).unwrap();

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get_by_id("b").map(|r| r.metadata().name.as_str()), Some("B"));
        assert!(registry.get_by_id("c").is_none());
    }

    #[test]
    fn test_duplicate_rejected_first_kept() {
        let mut registry = RuleRegistry::new();
        registry.register(StubRule::new("dup", "First", RuleCategory::Structure)).unwrap();

        let err = registry
            .register(StubRule::new("dup", "Second", RuleCategory::Structure))
            .unwrap_err();

        assert_eq!(err, RegistryError::DuplicateRule("dup".to_string()));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get_by_id("dup").unwrap().metadata().name, "First");
    }

    #[test]
    fn test_registration_order_is_stable() {
        let mut registry = RuleRegistry::new();
        for id in ["z", "a", "m"] {
            registry.register(StubRule::new(id, id, RuleCategory::Structure)).unwrap();
        }
        assert_eq!(registry.ids(), vec!["z", "a", "m"]);
        let all: Vec<&str> = registry.all().iter().map(|r| r.id()).collect();
        assert_eq!(all, vec!["z", "a", "m"]);
    }

    #[test]
    fn test_get_by_category() {
        let mut registry = RuleRegistry::new();
        registry.register(StubRule::new("s1", "S1", RuleCategory::Structure)).unwrap();
        registry.register(StubRule::new("a1", "A1", RuleCategory::Aria)).unwrap();
        registry.register(StubRule::new("s2", "S2", RuleCategory::Structure)).unwrap();

        let ids: Vec<&str> = registry
            .get_by_category(RuleCategory::Structure)
            .iter()
            .map(|r| r.id())
            .collect();
        assert_eq!(ids, vec!["s1", "s2"]);
        assert!(registry.get_by_category(RuleCategory::Forms).is_empty());
    }

    #[test]
    fn test_select_with_filter() {
        let mut registry = RuleRegistry::new();
        registry.register(StubRule::new("s1", "S1", RuleCategory::Structure)).unwrap();
        registry.register(StubRule::new("a1", "A1", RuleCategory::Aria)).unwrap();

        assert_eq!(registry.select(&RunFilter::All).len(), 2);
        assert_eq!(registry.select(&RunFilter::Category(RuleCategory::Aria)).len(), 1);
        assert_eq!(registry.select(&RunFilter::Rules(vec!["s1".into()])).len(), 1);
    }

    #[test]
    fn test_default_rules() {
        let registry = RuleRegistry::with_default_rules().unwrap();
        assert_eq!(
            registry.ids(),
            vec![
                "heading-has-accessible-name",
                "page-has-heading-one",
                "heading-order",
                "page-has-single-h1",
            ]
        );
    }
}
