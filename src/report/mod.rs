// SPDX-License-Identifier: PMPL-1.0-or-later
//! Run reports and their rendered forms.
//!
//! Supports multiple output formats:
//! - Text: human-readable results grouped by severity
//! - JSON: the full serialized [`RunReport`]
//! - SARIF: Static Analysis Results Interchange Format for IDE/CI integration

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::result::EvaluationResult;
use crate::types::Severity;

/// Counts for a single rule
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleStats {
    pub total: usize,
    pub invalid: usize,
}

/// Aggregates derived from a result list; never maintained incrementally
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunStats {
    pub total: usize,
    /// Results with `passed == false`
    pub invalid: usize,
    pub passed: usize,
    pub by_rule: BTreeMap<String, RuleStats>,
    /// Failing results per severity
    pub by_severity: BTreeMap<Severity, usize>,
}

impl RunStats {
    pub fn from_results(results: &[EvaluationResult]) -> Self {
        let mut stats = RunStats {
            total: results.len(),
            ..RunStats::default()
        };

        for result in results {
            let rule = stats.by_rule.entry(result.rule_id.clone()).or_default();
            rule.total += 1;
            if result.passed {
                stats.passed += 1;
            } else {
                rule.invalid += 1;
                stats.invalid += 1;
                *stats.by_severity.entry(result.severity).or_insert(0) += 1;
            }
        }

        stats
    }
}

/// Outcome of one runner invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RunReportRecord")]
pub struct RunReport {
    run_id: Uuid,
    test_id: String,
    started_at: DateTime<Utc>,
    finished_at: DateTime<Utc>,
    results: Vec<EvaluationResult>,
    stats: RunStats,
}

/// Wire shape accepted on deserialization; stats are recomputed
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RunReportRecord {
    run_id: Uuid,
    test_id: String,
    started_at: DateTime<Utc>,
    finished_at: DateTime<Utc>,
    results: Vec<EvaluationResult>,
}

impl From<RunReportRecord> for RunReport {
    fn from(record: RunReportRecord) -> Self {
        let stats = RunStats::from_results(&record.results);
        Self {
            run_id: record.run_id,
            test_id: record.test_id,
            started_at: record.started_at,
            finished_at: record.finished_at,
            results: record.results,
            stats,
        }
    }
}

impl RunReport {
    pub fn new(
        run_id: Uuid,
        test_id: String,
        started_at: DateTime<Utc>,
        results: Vec<EvaluationResult>,
    ) -> Self {
        let stats = RunStats::from_results(&results);
        Self {
            run_id,
            test_id,
            started_at,
            finished_at: Utc::now(),
            results,
            stats,
        }
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Label of the filter the run used (`all`, `headings`, a rule id)
    pub fn test_id(&self) -> &str {
        &self.test_id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn finished_at(&self) -> DateTime<Utc> {
        self.finished_at
    }

    /// Results in rule execution order, then emission order
    pub fn results(&self) -> &[EvaluationResult] {
        &self.results
    }

    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    pub fn failures(&self) -> Vec<&EvaluationResult> {
        self.results.iter().filter(|r| !r.passed).collect()
    }

    pub fn for_rule(&self, rule_id: &str) -> Vec<&EvaluationResult> {
        self.results.iter().filter(|r| r.rule_id == rule_id).collect()
    }

    pub fn failures_at(&self, severity: Severity) -> Vec<&EvaluationResult> {
        self.results
            .iter()
            .filter(|r| !r.passed && r.severity == severity)
            .collect()
    }

    pub fn has_critical(&self) -> bool {
        !self.failures_at(Severity::Critical).is_empty()
    }

    /// Whether any failing result is severe enough to fail CI
    pub fn blocks_release(&self) -> bool {
        self.results
            .iter()
            .any(|r| !r.passed && r.severity.blocks_release())
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

/// Output format for reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// Structured JSON
    Json,
    /// SARIF for IDE/CI integration
    Sarif,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Sarif => write!(f, "sarif"),
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "sarif" => Ok(OutputFormat::Sarif),
            other => Err(format!("Unknown output format: {}", other)),
        }
    }
}

/// Render a report in the requested format
pub fn generate_report(report: &RunReport, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => generate_text_report(report),
        OutputFormat::Json => generate_json_report(report),
        OutputFormat::Sarif => generate_sarif_report(report),
    }
}

fn generate_text_report(report: &RunReport) -> String {
    let mut output = String::new();
    let stats = report.stats();

    output.push_str(&format!(
        "=== actbot ACT Report ({}) ===\n\n",
        report.test_id()
    ));

    if report.is_empty() {
        output.push_str("No applicable rules produced results.\n");
        return output;
    }

    output.push_str(&format!(
        "{} result(s): {} passed, {} failed\n\n",
        stats.total, stats.passed, stats.invalid
    ));

    for severity in Severity::all() {
        let failures = report.failures_at(severity);
        if failures.is_empty() {
            continue;
        }

        output.push_str(&format!("--- {} ({}) ---\n", severity, failures.len()));

        for result in failures {
            output.push_str(&format!("[{}] {}\n", result.rule_id, result.message));
            output.push_str(&format!("  Target: {}\n", result.target_selector));
            if let Some(ref element) = result.element {
                output.push_str(&format!("  XPath: {}\n", element.xpath));
            }
            if !result.wcag_criteria.is_empty() {
                output.push_str(&format!("  WCAG: {}\n", result.wcag_criteria.join(", ")));
            }
            if !result.help_url.is_empty() {
                output.push_str(&format!("  Help: {}\n", result.help_url));
            }
            output.push('\n');
        }
    }

    if report.blocks_release() {
        output.push_str("RESULT: FAIL\n");
    } else if stats.invalid > 0 {
        output.push_str("RESULT: PASS WITH WARNINGS\n");
    } else {
        output.push_str("RESULT: PASS\n");
    }

    output
}

fn generate_json_report(report: &RunReport) -> String {
    serde_json::to_string_pretty(report).unwrap_or_else(|e| {
        format!("{{\"error\": \"Failed to serialize report: {}\"}}", e)
    })
}

/// SARIF report structure (simplified)
#[derive(Debug, Serialize)]
struct SarifReport {
    #[serde(rename = "$schema")]
    schema: String,
    version: String,
    runs: Vec<SarifRun>,
}

#[derive(Debug, Serialize)]
struct SarifRun {
    tool: SarifTool,
    results: Vec<SarifResult>,
}

#[derive(Debug, Serialize)]
struct SarifTool {
    driver: SarifDriver,
}

#[derive(Debug, Serialize)]
struct SarifDriver {
    name: String,
    version: String,
    #[serde(rename = "informationUri")]
    information_uri: String,
}

#[derive(Debug, Serialize)]
struct SarifResult {
    #[serde(rename = "ruleId")]
    rule_id: String,
    level: String,
    message: SarifMessage,
    locations: Vec<SarifLocation>,
}

#[derive(Debug, Serialize)]
struct SarifMessage {
    text: String,
}

#[derive(Debug, Serialize)]
struct SarifLocation {
    #[serde(rename = "logicalLocations")]
    logical_locations: Vec<SarifLogicalLocation>,
}

#[derive(Debug, Serialize)]
struct SarifLogicalLocation {
    name: String,
    #[serde(rename = "fullyQualifiedName", skip_serializing_if = "Option::is_none")]
    fully_qualified_name: Option<String>,
    kind: String,
}

fn sarif_level(severity: Severity) -> &'static str {
    match severity {
        Severity::Critical | Severity::High => "error",
        Severity::Medium => "warning",
        Severity::Low => "note",
    }
}

/// Generate SARIF report; only failing results are listed
fn generate_sarif_report(report: &RunReport) -> String {
    let results: Vec<SarifResult> = report
        .failures()
        .into_iter()
        .map(|r| SarifResult {
            rule_id: r.rule_id.clone(),
            level: sarif_level(r.severity).to_string(),
            message: SarifMessage {
                text: r.message.clone(),
            },
            locations: vec![SarifLocation {
                logical_locations: vec![SarifLogicalLocation {
                    name: r.target_selector.clone(),
                    fully_qualified_name: r.element.as_ref().map(|e| e.xpath.clone()),
                    kind: "element".to_string(),
                }],
            }],
        })
        .collect();

    let sarif = SarifReport {
        schema: "https://json.schemastore.org/sarif-2.1.0.json".to_string(),
        version: "2.1.0".to_string(),
        runs: vec![SarifRun {
            tool: SarifTool {
                driver: SarifDriver {
                    name: "actbot".to_string(),
                    version: env!("CARGO_PKG_VERSION").to_string(),
                    information_uri: "https://www.w3.org/WAI/standards-guidelines/act/".to_string(),
                },
            },
            results,
        }],
    };

    serde_json::to_string_pretty(&sarif).unwrap_or_else(|e| {
        format!("{{\"error\": \"Failed to serialize SARIF report: {}\"}}", e)
    })
}
