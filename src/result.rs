// SPDX-License-Identifier: PMPL-1.0-or-later
//! Canonical evaluation result records.
//!
//! [`format_result`] only builds a record; adding it to a run is the
//! runner's job.

use chrono::{DateTime, Utc};
use scraper::ElementRef;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::RuleExecutionError;
use crate::inspector::ElementSnapshot;
use crate::rule::RuleMetadata;
use crate::types::Severity;

/// Target used when a result concerns the page rather than one element
pub const PAGE_SELECTOR: &str = "body";

/// One pass/fail finding produced by a rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationResult {
    /// Unique identifier
    pub id: Uuid,
    /// Originating rule id
    pub rule_id: String,
    /// Originating rule name
    pub rule_name: String,
    /// Locator of the evaluated element, or [`PAGE_SELECTOR`]
    pub target_selector: String,
    pub passed: bool,
    pub message: String,
    pub severity: Severity,
    /// Criterion tags, e.g. `WCAG2.1:1.3.1`
    pub wcag_criteria: Vec<String>,
    pub help_url: String,
    /// Detached copy of the evaluated element
    pub element: Option<ElementSnapshot>,
    /// When this result was created
    pub timestamp: DateTime<Utc>,
}

impl EvaluationResult {
    /// Synthetic failing result recorded when a rule errors out
    pub fn diagnostic(rule: &RuleMetadata, error: &RuleExecutionError) -> Self {
        Self {
            id: Uuid::new_v4(),
            rule_id: rule.id.clone(),
            rule_name: rule.name.clone(),
            target_selector: PAGE_SELECTOR.to_string(),
            passed: false,
            message: format!("Rule execution failed: {}", error),
            severity: Severity::High,
            wcag_criteria: rule.criterion_tags(),
            help_url: rule.help_url.clone(),
            element: None,
            timestamp: Utc::now(),
        }
    }

    /// Whether the target is the page-level sentinel
    pub fn is_page_level(&self) -> bool {
        self.element.is_none() && self.target_selector == PAGE_SELECTOR
    }
}

/// Build a result from a rule's raw verdict.
///
/// Inputs are kept verbatim; only the id, element snapshot and timestamp
/// are generated. `element` is `None` for page-level results.
#[allow(clippy::too_many_arguments)]
pub fn format_result(
    rule_id: &str,
    rule_name: &str,
    element: Option<ElementRef<'_>>,
    selector: &str,
    passed: bool,
    message: &str,
    severity: Severity,
    wcag_criteria: &[String],
    help_url: &str,
) -> EvaluationResult {
    EvaluationResult {
        id: Uuid::new_v4(),
        rule_id: rule_id.to_string(),
        rule_name: rule_name.to_string(),
        target_selector: selector.to_string(),
        passed,
        message: message.to_string(),
        severity,
        wcag_criteria: wcag_criteria.to_vec(),
        help_url: help_url.to_string(),
        element: element.map(ElementSnapshot::of),
        timestamp: Utc::now(),
    }
}
