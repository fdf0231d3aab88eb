// SPDX-License-Identifier: PMPL-1.0-or-later
//! actbot - Accessibility Conformance Testing rule engine
//!
//! Evaluates a parsed HTML document against a registry of ACT rules and
//! collects pass/fail results into a report.
//!
//! ## Pipeline
//!
//! 1. Rules register into an explicit [`RuleRegistry`] owned by the caller.
//! 2. A [`Runner`] filters the registry, gates each rule on applicability
//!    and executes applicable rules one after another.
//! 3. Rules emit [`EvaluationResult`]s through a [`ResultSink`].
//! 4. `finish` freezes them into a [`RunReport`] whose stats are derived
//!    from its results.
//!
//! ## Rules
//!
//! - **heading-has-accessible-name** (2.4.6): headings expose a name
//! - **page-has-heading-one** (1.3.1): the first heading is an h1
//! - **heading-order** (1.3.1): heading levels do not skip
//! - **page-has-single-h1** (1.3.1): exactly one h1 per page

pub mod config;
pub mod document;
pub mod error;
pub mod events;
pub mod inspector;
pub mod registry;
pub mod report;
pub mod result;
pub mod rule;
pub mod rules;
pub mod runner;
pub mod scanner;
pub mod types;
pub mod wcag;

pub use config::{load_config, Config};
pub use document::{Document, Heading};
pub use error::{Error, RegistryError, Result, RuleExecutionError, RunnerError};
pub use registry::RuleRegistry;
pub use report::{generate_report, OutputFormat, RunReport, RunStats};
pub use result::{format_result, EvaluationResult, PAGE_SELECTOR};
pub use rule::{ResultSink, Rule, RuleMetadata};
pub use runner::{RunFilter, RunState, Runner};
pub use types::{RuleCategory, Severity, WcagLevel};
