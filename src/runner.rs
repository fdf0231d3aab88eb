// SPDX-License-Identifier: PMPL-1.0-or-later
//! Rule runner: applicability gating, sequential execution and result
//! collection for one run at a time.
//!
//! State machine: `Idle --start_run--> Running --finish--> Completed --reset--> Idle`.
//! Rules execute strictly one after another in registry order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::document::Document;
use crate::error::{RuleExecutionError, RunnerError};
use crate::registry::RuleRegistry;
use crate::report::RunReport;
use crate::result::EvaluationResult;
use crate::rule::{ResultSink, Rule, RuleMetadata};
use crate::types::RuleCategory;

/// Lifecycle state of a [`Runner`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunState {
    Idle,
    Running,
    Completed,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunState::Idle => write!(f, "idle"),
            RunState::Running => write!(f, "running"),
            RunState::Completed => write!(f, "completed"),
        }
    }
}

/// Restricts which registered rules a run considers
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RunFilter {
    #[default]
    All,
    /// Explicit rule ids
    Rules(Vec<String>),
    Category(RuleCategory),
}

impl RunFilter {
    /// Interpret a test id: `all`, a category name such as `headings`, or a rule id
    pub fn from_test_id(test_id: &str) -> Self {
        let trimmed = test_id.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") {
            return RunFilter::All;
        }
        match trimmed.parse::<RuleCategory>() {
            Ok(category) => RunFilter::Category(category),
            Err(_) => RunFilter::Rules(vec![trimmed.to_string()]),
        }
    }

    pub fn matches(&self, rule: &RuleMetadata) -> bool {
        match self {
            RunFilter::All => true,
            RunFilter::Rules(ids) => ids.iter().any(|id| *id == rule.id),
            RunFilter::Category(category) => rule.has_category(*category),
        }
    }
}

impl fmt::Display for RunFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunFilter::All => write!(f, "all"),
            RunFilter::Rules(ids) => write!(f, "{}", ids.join(",")),
            RunFilter::Category(category) => write!(f, "{}", category.as_str().to_lowercase()),
        }
    }
}

/// Bookkeeping for the run currently in progress
struct ActiveRun {
    id: Uuid,
    filter: RunFilter,
    started_at: DateTime<Utc>,
    rules: Vec<Arc<dyn Rule>>,
}

/// Executes registered rules against a document
pub struct Runner {
    registry: RuleRegistry,
    config: Config,
    state: RunState,
    results: Vec<EvaluationResult>,
    active: Option<ActiveRun>,
}

impl Runner {
    /// Create a runner over a registry with default configuration
    pub fn new(registry: RuleRegistry) -> Self {
        Self::with_config(registry, Config::default())
    }

    pub fn with_config(registry: RuleRegistry, config: Config) -> Self {
        Self {
            registry,
            config,
            state: RunState::Idle,
            results: Vec::new(),
            active: None,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    /// Mutable registry access; rules added mid-run take effect on the next run
    pub fn registry_mut(&mut self) -> &mut RuleRegistry {
        &mut self.registry
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Results accumulated so far in the current run
    pub fn pending_results(&self) -> &[EvaluationResult] {
        &self.results
    }

    /// Enter `Running`, clearing the previous accumulator
    pub fn start_run(&mut self, filter: RunFilter) -> Result<(), RunnerError> {
        match self.state {
            RunState::Idle => {}
            RunState::Running => return Err(RunnerError::RunInProgress),
            RunState::Completed => {
                return Err(RunnerError::InvalidState {
                    operation: "start_run",
                    state: self.state,
                })
            }
        }

        let rules: Vec<Arc<dyn Rule>> = self
            .registry
            .select(&filter)
            .into_iter()
            .filter(|rule| {
                let disabled = self.config.is_disabled(rule.id());
                if disabled {
                    debug!("Rule {} disabled by configuration", rule.id());
                }
                !disabled
            })
            .collect();

        let id = Uuid::new_v4();
        info!("Starting run {} ({}) with {} rule(s)", id, filter, rules.len());

        self.results.clear();
        self.active = Some(ActiveRun {
            id,
            filter,
            started_at: Utc::now(),
            rules,
        });
        self.state = RunState::Running;
        Ok(())
    }

    /// Evaluate every planned rule against `document`, in order.
    ///
    /// Rule failures never abort the run; each becomes a diagnostic result.
    pub async fn execute_rules(&mut self, document: &Document) -> Result<(), RunnerError> {
        if self.state != RunState::Running {
            return Err(RunnerError::InvalidState {
                operation: "execute_rules",
                state: self.state,
            });
        }

        let rules = self
            .active
            .as_ref()
            .map(|run| run.rules.clone())
            .unwrap_or_default();

        for rule in rules {
            if !rule.is_applicable(document) {
                debug!("Rule {} not applicable, skipping", rule.id());
                continue;
            }

            debug!("Executing rule {}", rule.id());
            let emitted_before = self.results.len();
            if let Err(err) = self.execute_rule(rule.as_ref(), document).await {
                warn!("Rule {} failed: {}", rule.id(), err);
                self.results
                    .push(EvaluationResult::diagnostic(rule.metadata(), &err));
            }
            debug!(
                "Rule {} emitted {} result(s)",
                rule.id(),
                self.results.len() - emitted_before
            );
        }

        Ok(())
    }

    async fn execute_rule(
        &mut self,
        rule: &dyn Rule,
        document: &Document,
    ) -> Result<(), RuleExecutionError> {
        let timeout = self.config.rule_timeout();
        match timeout {
            Some(limit) => tokio::time::timeout(limit, rule.execute(document, self))
                .await
                .unwrap_or(Err(RuleExecutionError::Timeout(limit))),
            None => rule.execute(document, self).await,
        }
    }

    /// Freeze the accumulator into a report and enter `Completed`
    pub fn finish(&mut self) -> Result<RunReport, RunnerError> {
        if self.state != RunState::Running {
            return Err(RunnerError::InvalidState {
                operation: "finish",
                state: self.state,
            });
        }

        let run = self.active.take().ok_or(RunnerError::InvalidState {
            operation: "finish",
            state: self.state,
        })?;

        let results = std::mem::take(&mut self.results);
        let report = RunReport::new(run.id, run.filter.to_string(), run.started_at, results);
        self.state = RunState::Completed;

        info!(
            "Run {} completed: {} result(s), {} failing",
            run.id,
            report.stats().total,
            report.stats().invalid
        );
        Ok(report)
    }

    /// Return to `Idle`; a no-op when already idle
    pub fn reset(&mut self) -> Result<(), RunnerError> {
        match self.state {
            RunState::Running => Err(RunnerError::InvalidState {
                operation: "reset",
                state: self.state,
            }),
            RunState::Idle | RunState::Completed => {
                self.state = RunState::Idle;
                self.results.clear();
                Ok(())
            }
        }
    }

    /// Run the filtered rule set start to finish and return its report
    pub async fn run_all(
        &mut self,
        document: &Document,
        filter: RunFilter,
    ) -> Result<RunReport, RunnerError> {
        if self.state == RunState::Running {
            return Err(RunnerError::RunInProgress);
        }
        self.reset()?;
        self.start_run(filter)?;
        self.execute_rules(document).await?;
        self.finish()
    }

    /// Run only the rules a test id selects (e.g. `headings`)
    pub async fn run_test(
        &mut self,
        document: &Document,
        test_id: &str,
    ) -> Result<RunReport, RunnerError> {
        self.run_all(document, RunFilter::from_test_id(test_id)).await
    }
}

impl ResultSink for Runner {
    fn add_result(&mut self, result: EvaluationResult) -> Result<(), RunnerError> {
        if self.state != RunState::Running {
            return Err(RunnerError::InvalidState {
                operation: "add_result",
                state: self.state,
            });
        }
        self.results.push(result);
        Ok(())
    }
}

impl fmt::Debug for Runner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runner")
            .field("registry", &self.registry)
            .field("state", &self.state)
            .field("results", &self.results.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::PAGE_SELECTOR;
    use crate::types::Severity;
    use async_trait::async_trait;
    use std::time::Duration;

    const PAGE: &str = "<html><body><h1>Title</h1><h2>Intro</h2><h4>Deep</h4></body></html>";

    enum Behaviour {
        Fail,
        Sleep(Duration),
        NeverApplicable,
        EmitThenFail,
    }

    struct TestRule {
        metadata: RuleMetadata,
        behaviour: Behaviour,
    }

    impl TestRule {
        fn new(id: &str, behaviour: Behaviour) -> Self {
            Self {
                metadata: RuleMetadata::new(id, id, "test rule")
                    .with_categories(&[RuleCategory::Aria]),
                behaviour,
            }
        }
    }

    #[async_trait(?Send)]
    impl Rule for TestRule {
        fn metadata(&self) -> &RuleMetadata {
            &self.metadata
        }

        fn is_applicable(&self, _document: &Document) -> bool {
            !matches!(self.behaviour, Behaviour::NeverApplicable)
        }

        async fn execute(
            &self,
            _document: &Document,
            sink: &mut dyn ResultSink,
        ) -> Result<(), RuleExecutionError> {
            match &self.behaviour {
                Behaviour::Fail => Err(RuleExecutionError::Failed("boom".into())),
                Behaviour::Sleep(d) => {
                    tokio::time::sleep(*d).await;
                    Ok(())
                }
                Behaviour::NeverApplicable => Ok(()),
                Behaviour::EmitThenFail => {
                    sink.add_result(crate::result::format_result(
                        self.id(),
                        self.id(),
                        None,
                        PAGE_SELECTOR,
                        true,
                        "partial",
                        Severity::Low,
                        &[],
                        "",
                    ))?;
                    Err(RuleExecutionError::Failed("after emit".into()))
                }
            }
        }
    }

    fn default_runner() -> Runner {
        Runner::new(RuleRegistry::with_default_rules().unwrap())
    }

    fn summary(report: &RunReport) -> Vec<(String, bool, String, String)> {
        report
            .results()
            .iter()
            .map(|r| {
                (
                    r.rule_id.clone(),
                    r.passed,
                    r.message.clone(),
                    r.target_selector.clone(),
                )
            })
            .collect()
    }

    #[test]
    fn test_from_test_id() {
        assert_eq!(RunFilter::from_test_id("all"), RunFilter::All);
        assert_eq!(RunFilter::from_test_id(""), RunFilter::All);
        assert_eq!(
            RunFilter::from_test_id("Headings"),
            RunFilter::Category(RuleCategory::Headings)
        );
        assert_eq!(
            RunFilter::from_test_id("heading-order"),
            RunFilter::Rules(vec!["heading-order".to_string()])
        );
        assert_eq!(RunFilter::Category(RuleCategory::Structure).to_string(), "structure");
    }

    #[tokio::test]
    async fn test_results_follow_registration_order() {
        let doc = Document::parse(PAGE);
        let mut runner = default_runner();
        let report = runner.run_all(&doc, RunFilter::All).await.unwrap();

        let mut seen: Vec<&str> = Vec::new();
        for r in report.results() {
            if seen.last() != Some(&r.rule_id.as_str()) {
                seen.push(&r.rule_id);
            }
        }
        assert_eq!(
            seen,
            vec![
                "heading-has-accessible-name",
                "page-has-heading-one",
                "heading-order",
                "page-has-single-h1"
            ]
        );
        assert_eq!(runner.state(), RunState::Completed);
    }

    #[tokio::test]
    async fn test_run_is_idempotent() {
        let doc = Document::parse(PAGE);
        let mut runner = default_runner();
        let first = runner.run_all(&doc, RunFilter::All).await.unwrap();
        let second = runner.run_all(&doc, RunFilter::All).await.unwrap();

        assert_eq!(summary(&first), summary(&second));
        assert_ne!(first.run_id(), second.run_id());
    }

    #[tokio::test]
    async fn test_stats_match_results() {
        let doc = Document::parse(PAGE);
        let report = default_runner().run_all(&doc, RunFilter::All).await.unwrap();

        let failing = report.results().iter().filter(|r| !r.passed).count();
        assert_eq!(report.stats().total, report.results().len());
        assert_eq!(report.stats().invalid, failing);
        assert_eq!(failing, 1);
    }

    #[tokio::test]
    async fn test_failing_rule_becomes_diagnostic() {
        let mut registry = RuleRegistry::new();
        registry.register(TestRule::new("broken", Behaviour::Fail)).unwrap();
        registry
            .register(crate::rules::HeadingRule::first_is_h1())
            .unwrap();

        let doc = Document::parse(PAGE);
        let report = Runner::new(registry).run_all(&doc, RunFilter::All).await.unwrap();

        assert_eq!(report.results().len(), 2);
        let diagnostic = &report.results()[0];
        assert_eq!(diagnostic.rule_id, "broken");
        assert!(!diagnostic.passed);
        assert_eq!(diagnostic.severity, Severity::High);
        assert!(diagnostic.message.contains("boom"));
        assert_eq!(report.results()[1].rule_id, "page-has-heading-one");
    }

    #[tokio::test]
    async fn test_results_emitted_before_failure_are_kept() {
        let mut registry = RuleRegistry::new();
        registry
            .register(TestRule::new("partial", Behaviour::EmitThenFail))
            .unwrap();

        let doc = Document::parse(PAGE);
        let report = Runner::new(registry).run_all(&doc, RunFilter::All).await.unwrap();

        assert_eq!(report.results().len(), 2);
        assert!(report.results()[0].passed);
        assert!(report.results()[1].message.contains("after emit"));
    }

    #[tokio::test]
    async fn test_timeout_becomes_diagnostic() {
        let mut registry = RuleRegistry::new();
        registry
            .register(TestRule::new("slow", Behaviour::Sleep(Duration::from_millis(200))))
            .unwrap();
        let config = Config {
            rule_timeout_ms: 20,
            ..Config::default()
        };

        let doc = Document::parse(PAGE);
        let report = Runner::with_config(registry, config)
            .run_all(&doc, RunFilter::All)
            .await
            .unwrap();

        assert_eq!(report.results().len(), 1);
        assert!(!report.results()[0].passed);
        assert!(report.results()[0].is_page_level());
        assert!(report.results()[0].message.contains("timed out"));
    }

    #[tokio::test]
    async fn test_not_applicable_rule_emits_nothing() {
        let mut registry = RuleRegistry::new();
        registry
            .register(TestRule::new("absent", Behaviour::NeverApplicable))
            .unwrap();

        let doc = Document::parse(PAGE);
        let report = Runner::new(registry).run_all(&doc, RunFilter::All).await.unwrap();
        assert!(report.is_empty());
        assert_eq!(report.stats().total, 0);
    }

    #[tokio::test]
    async fn test_disabled_rules_are_skipped() {
        let config = Config {
            disabled_rules: vec!["heading-order".to_string()],
            ..Config::default()
        };
        let mut runner =
            Runner::with_config(RuleRegistry::with_default_rules().unwrap(), config);

        let doc = Document::parse(PAGE);
        let report = runner.run_all(&doc, RunFilter::All).await.unwrap();
        assert!(report.for_rule("heading-order").is_empty());
        assert!(!report.for_rule("page-has-heading-one").is_empty());
    }

    #[tokio::test]
    async fn test_category_filter() {
        let mut registry = RuleRegistry::with_default_rules().unwrap();
        registry.register(TestRule::new("aria-only", Behaviour::Fail)).unwrap();

        let doc = Document::parse(PAGE);
        let mut runner = Runner::new(registry);
        let report = runner.run_test(&doc, "headings").await.unwrap();

        assert!(report.for_rule("aria-only").is_empty());
        assert_eq!(report.test_id(), "headings");

        let report = runner.run_test(&doc, "aria-only").await.unwrap();
        assert_eq!(report.results().len(), 1);
    }

    #[tokio::test]
    async fn test_rule_registered_between_runs_takes_effect() {
        let doc = Document::parse(PAGE);
        let mut runner = Runner::new(RuleRegistry::new());
        assert!(runner.run_all(&doc, RunFilter::All).await.unwrap().is_empty());

        runner
            .registry_mut()
            .register(crate::rules::HeadingRule::first_is_h1())
            .unwrap();
        let report = runner.run_all(&doc, RunFilter::All).await.unwrap();
        assert_eq!(report.for_rule("page-has-heading-one").len(), 1);
    }

    #[test]
    fn test_add_result_outside_running_fails() {
        let mut runner = default_runner();
        let result = crate::result::format_result(
            "x", "x", None, PAGE_SELECTOR, true, "", Severity::Low, &[], "",
        );

        let err = runner.add_result(result).unwrap_err();
        assert!(matches!(
            err,
            RunnerError::InvalidState { operation: "add_result", state: RunState::Idle }
        ));
        assert!(runner.finish().is_err());
    }

    #[test]
    fn test_second_start_run_is_rejected() {
        let mut runner = default_runner();
        runner.start_run(RunFilter::All).unwrap();

        assert!(matches!(
            runner.start_run(RunFilter::All),
            Err(RunnerError::RunInProgress)
        ));
        assert!(runner.reset().is_err());
        assert_eq!(runner.state(), RunState::Running);
    }

    #[tokio::test]
    async fn test_run_all_while_running_is_rejected() {
        let doc = Document::parse(PAGE);
        let mut runner = default_runner();
        runner.start_run(RunFilter::All).unwrap();

        assert!(matches!(
            runner.run_all(&doc, RunFilter::All).await,
            Err(RunnerError::RunInProgress)
        ));
    }

    #[tokio::test]
    async fn test_explicit_lifecycle() {
        let doc = Document::parse(PAGE);
        let mut runner = default_runner();

        runner.start_run(RunFilter::All).unwrap();
        runner.execute_rules(&doc).await.unwrap();
        assert!(!runner.pending_results().is_empty());

        let report = runner.finish().unwrap();
        assert_eq!(runner.state(), RunState::Completed);
        assert!(runner.pending_results().is_empty());
        assert!(matches!(
            runner.start_run(RunFilter::All),
            Err(RunnerError::InvalidState { .. })
        ));

        runner.reset().unwrap();
        assert_eq!(runner.state(), RunState::Idle);
        assert_eq!(report.stats().total, report.results().len());
    }
}
