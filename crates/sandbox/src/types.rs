//! Common types for sandbox execution

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Why an execution failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The static scan rejected the source before anything ran
    PolicyViolation,
    /// The subprocess failed: syntax error, unknown component, renderer
    /// failure, missing interpreter, or no artifact produced
    RuntimeError,
    /// The wall-clock timeout expired; any partial output was discarded
    Timeout,
}

/// Outcome of one sandbox execution, consumed exactly once by the presenter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ExecutionResult {
    Success {
        /// Rendered artifact, already persisted at its request-scoped path
        image_path: PathBuf,
    },
    Failure {
        kind: FailureKind,
        message: String,
    },
}

impl ExecutionResult {
    pub fn is_success(&self) -> bool {
        matches!(self, ExecutionResult::Success { .. })
    }

    /// Shorthand for a failure result
    pub fn failure(kind: FailureKind, message: impl Into<String>) -> Self {
        ExecutionResult::Failure {
            kind,
            message: message.into(),
        }
    }
}

/// Sandbox configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SandboxConfig {
    /// Hard wall-clock limit for one execution
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Interpreter binary resolved from PATH (the diagram DSL's runtime)
    #[serde(default = "default_interpreter")]
    pub interpreter: String,
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_interpreter() -> String {
    "python3".to_string()
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            interpreter: default_interpreter(),
        }
    }
}
