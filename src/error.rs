// SPDX-License-Identifier: PMPL-1.0-or-later
//! Error types for actbot
//!
//! Only structural misuse ([`RegistryError`], [`RunnerError`]) reaches callers
//! of the runner. A [`RuleExecutionError`] is always recovered by the runner
//! and turned into a diagnostic result.

use std::time::Duration;
use thiserror::Error;

use crate::runner::RunState;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Registration-time failures; the registry is left unchanged
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Duplicate rule id: {0}")]
    DuplicateRule(String),
}

/// Failure raised from inside a rule's `execute`
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuleExecutionError {
    #[error("{0}")]
    Failed(String),

    #[error("Rule execution timed out after {}ms", .0.as_millis())]
    Timeout(Duration),
}

impl From<RunnerError> for RuleExecutionError {
    fn from(err: RunnerError) -> Self {
        RuleExecutionError::Failed(err.to_string())
    }
}

/// Runner operation invoked in the wrong state
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RunnerError {
    #[error("Invalid runner state: {operation} is not allowed while {state}")]
    InvalidState {
        operation: &'static str,
        state: RunState,
    },

    #[error("Run already in progress")]
    RunInProgress,
}

/// Main error type for actbot
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Runner(#[from] RunnerError),
}
