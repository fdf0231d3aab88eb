// SPDX-License-Identifier: PMPL-1.0-or-later
//! The rule contract the runner depends on.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::document::Document;
use crate::error::{RuleExecutionError, RunnerError};
use crate::result::EvaluationResult;
use crate::types::RuleCategory;
use crate::wcag::{self, WcagReference};

/// Immutable description of a rule, fixed at registration time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleMetadata {
    /// Unique, stable identifier
    pub id: String,
    pub name: String,
    pub description: String,
    pub categories: Vec<RuleCategory>,
    /// Success criteria in the order the rule declares them
    pub accessibility_requirements: Vec<WcagReference>,
    pub help_url: String,
}

impl RuleMetadata {
    pub fn new(id: &str, name: &str, description: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            categories: Vec::new(),
            accessibility_requirements: Vec::new(),
            help_url: String::new(),
        }
    }

    pub fn with_categories(mut self, categories: &[RuleCategory]) -> Self {
        self.categories = categories.to_vec();
        self
    }

    /// Attach WCAG requirements by criterion number
    pub fn with_requirements(mut self, criteria: &[&str]) -> Self {
        self.accessibility_requirements = wcag::requirements(criteria);
        self
    }

    pub fn with_help_url(mut self, url: &str) -> Self {
        self.help_url = url.to_string();
        self
    }

    pub fn has_category(&self, category: RuleCategory) -> bool {
        self.categories.contains(&category)
    }

    pub fn requirement(&self, criterion: &str) -> Option<&WcagReference> {
        self.accessibility_requirements
            .iter()
            .find(|r| r.num == criterion)
    }

    /// Criterion tags for the rule's requirements, in declared order
    pub fn criterion_tags(&self) -> Vec<String> {
        self.accessibility_requirements
            .iter()
            .map(|r| wcag::criterion_tag(&r.num))
            .collect()
    }
}

/// Destination for results while a run is in progress
pub trait ResultSink {
    /// Append a result; fails when no run is active
    fn add_result(&mut self, result: EvaluationResult) -> Result<(), RunnerError>;
}

/// An accessibility conformance rule.
///
/// `is_applicable` must be pure and may be called several times per run.
/// `execute` reports findings through the sink and returns `Ok(())` with no
/// results when it finds nothing to evaluate; an `Err` is reserved for
/// unexpected failures, which the runner records as a diagnostic result.
#[async_trait(?Send)]
pub trait Rule: Send + Sync {
    fn metadata(&self) -> &RuleMetadata;

    fn id(&self) -> &str {
        &self.metadata().id
    }

    fn is_applicable(&self, document: &Document) -> bool;

    async fn execute(
        &self,
        document: &Document,
        sink: &mut dyn ResultSink,
    ) -> Result<(), RuleExecutionError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_builder() {
        let meta = RuleMetadata::new("r1", "Rule one", "Checks one thing")
            .with_categories(&[RuleCategory::Structure])
            .with_requirements(&["2.4.6", "1.3.1"])
            .with_help_url("https://example.org");

        assert!(meta.has_category(RuleCategory::Structure));
        assert!(!meta.has_category(RuleCategory::Aria));
        assert_eq!(meta.criterion_tags(), vec!["WCAG2.1:2.4.6", "WCAG2.1:1.3.1"]);
        assert_eq!(meta.requirement("2.4.6").map(|r| r.title.as_str()), Some("Headings and Labels"));
        assert!(meta.requirement("4.1.2").is_none());
        assert_eq!(meta.help_url, "https://example.org");
    }
}
