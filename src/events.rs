// SPDX-License-Identifier: PMPL-1.0-or-later
//! Transport records for handing a run to a presentation layer.
//!
//! Everything here is plain data: strings, numbers, booleans and nested
//! records. No element references survive serialization.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::inspector::ElementSnapshot;
use crate::report::RunReport;
use crate::result::EvaluationResult;
use crate::types::Severity;

/// Envelope crossing a process boundary, tagged by event type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Event {
    TestAnalysisRequest(TestAnalysisRequest),
    TestAnalysisComplete(TestAnalysisComplete),
}

/// Ask for a test to be run, e.g. `"headings"`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestAnalysisRequest {
    pub test_id: String,
}

impl TestAnalysisRequest {
    pub fn new(test_id: impl Into<String>) -> Self {
        Self {
            test_id: test_id.into(),
        }
    }
}

/// Counters sent with a completed analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueStats {
    pub total: usize,
    pub invalid: usize,
}

/// One evaluation result, flattened for transport
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub id: String,
    pub rule_id: String,
    pub selector: String,
    pub message: String,
    pub severity: Severity,
    pub passed: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub wcag_criteria: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element: Option<ElementSnapshot>,
}

impl From<&EvaluationResult> for Issue {
    fn from(result: &EvaluationResult) -> Self {
        Self {
            id: result.id.to_string(),
            rule_id: result.rule_id.clone(),
            selector: result.target_selector.clone(),
            message: result.message.clone(),
            severity: result.severity,
            passed: result.passed,
            wcag_criteria: result.wcag_criteria.clone(),
            element: result.element.clone(),
        }
    }
}

/// Outcome of a test run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestAnalysisComplete {
    pub test_id: String,
    pub issues: Vec<Issue>,
    pub stats: IssueStats,
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
}

impl TestAnalysisComplete {
    /// Build the completion record from a finished report.
    ///
    /// Stats are taken from the report, which derives them from its results.
    pub fn from_report(test_id: &str, report: &RunReport) -> Self {
        Self {
            test_id: test_id.to_string(),
            issues: report.results().iter().map(Issue::from).collect(),
            stats: IssueStats {
                total: report.stats().total,
                invalid: report.stats().invalid,
            },
            timestamp: Utc::now().timestamp_millis(),
        }
    }

    pub fn failing_issues(&self) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(|issue| !issue.passed)
    }
}
