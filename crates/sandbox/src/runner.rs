//! Subprocess runner
//!
//! Executes a policy-scanned program in a separate OS process: the source is
//! written into a fresh temporary working directory, the interpreter runs
//! with a scrubbed environment and null stdin, and the whole execution sits
//! under a hard wall-clock timeout. On success the first PNG emitted into
//! the working directory is persisted to the request's artifact path; on
//! timeout the child is killed and the working directory - partial output
//! included - is discarded with it.

use std::path::{Path, PathBuf};
use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;
use tokio::process::Command;

use crate::policy;
use crate::types::{ExecutionResult, FailureKind, SandboxConfig};

/// File name the source is written under inside the working directory
const SOURCE_FILE: &str = "diagram.py";

/// How much stderr to quote back in a diagnostic message
const STDERR_TAIL_CHARS: usize = 600;

static CANNOT_IMPORT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"cannot import name '(\w+)'").expect("import-error regex"));

/// Sandbox executor over one configured interpreter
#[derive(Debug, Clone)]
pub struct SandboxRunner {
    config: SandboxConfig,
}

impl SandboxRunner {
    pub fn new(config: SandboxConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SandboxConfig {
        &self.config
    }

    /// Execute generated source and persist the rendered artifact to
    /// `artifact_path`, overwriting any prior file there.
    ///
    /// Total function over the failure space: every problem - policy
    /// rejection, spawn failure, non-zero exit, timeout, missing artifact -
    /// comes back as an [`ExecutionResult::Failure`], never as a panic or an
    /// unhandled error.
    pub async fn execute(&self, source: &str, artifact_path: &Path) -> ExecutionResult {
        if let Err(violation) = policy::scan(source) {
            log::warn!("policy scan rejected generated source: {}", violation);
            return ExecutionResult::failure(FailureKind::PolicyViolation, violation.to_string());
        }

        let interpreter = match which::which(&self.config.interpreter) {
            Ok(path) => path,
            Err(_) => {
                return ExecutionResult::failure(
                    FailureKind::RuntimeError,
                    format!(
                        "interpreter '{}' not found on PATH; is the diagram runtime installed?",
                        self.config.interpreter
                    ),
                );
            }
        };

        // Request-scoped working directory; dropped (and deleted) on every
        // exit path, taking partial output with it.
        let workdir = match tempfile::tempdir() {
            Ok(dir) => dir,
            Err(err) => {
                return ExecutionResult::failure(
                    FailureKind::RuntimeError,
                    format!("failed to create working directory: {}", err),
                );
            }
        };

        let source_path = workdir.path().join(SOURCE_FILE);
        if let Err(err) = tokio::fs::write(&source_path, source).await {
            return ExecutionResult::failure(
                FailureKind::RuntimeError,
                format!("failed to write source file: {}", err),
            );
        }

        let mut cmd = Command::new(&interpreter);
        cmd.arg(SOURCE_FILE)
            .current_dir(workdir.path())
            .env_clear()
            .stdin(std::process::Stdio::null())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::piped())
            .kill_on_drop(true);

        // The renderer still needs to find its own binaries (graphviz's
        // `dot`); PATH and locale survive the scrub, nothing else does.
        if let Ok(path) = std::env::var("PATH") {
            cmd.env("PATH", path);
        }
        cmd.env("LANG", "C.UTF-8");

        log::debug!(
            "executing {} chars of generated source under {} with a {}s limit",
            source.len(),
            interpreter.display(),
            self.config.timeout_secs
        );

        let timeout = Duration::from_secs(self.config.timeout_secs);
        let run = async {
            let child = cmd.spawn()?;
            child.wait_with_output().await
        };

        let output = match tokio::time::timeout(timeout, run).await {
            Ok(Ok(output)) => output,
            Ok(Err(err)) => {
                return ExecutionResult::failure(
                    FailureKind::RuntimeError,
                    format!("failed to run interpreter: {}", err),
                );
            }
            Err(_) => {
                // Dropping the in-flight future kills the child
                // (kill_on_drop); dropping the tempdir discards any partial
                // artifact.
                log::warn!(
                    "generated source exceeded the {}s execution limit",
                    self.config.timeout_secs
                );
                return ExecutionResult::failure(
                    FailureKind::Timeout,
                    format!(
                        "execution exceeded the {} second limit and was terminated",
                        self.config.timeout_secs
                    ),
                );
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return ExecutionResult::failure(
                FailureKind::RuntimeError,
                diagnose_failure(&stderr, output.status.code()),
            );
        }

        let rendered = match first_png(workdir.path()) {
            Some(path) => path,
            None => {
                return ExecutionResult::failure(
                    FailureKind::RuntimeError,
                    "the renderer exited cleanly but produced no image artifact".to_string(),
                );
            }
        };

        if let Some(parent) = artifact_path.parent() {
            if let Err(err) = tokio::fs::create_dir_all(parent).await {
                return ExecutionResult::failure(
                    FailureKind::RuntimeError,
                    format!("failed to create artifact directory: {}", err),
                );
            }
        }
        if let Err(err) = tokio::fs::copy(&rendered, artifact_path).await {
            return ExecutionResult::failure(
                FailureKind::RuntimeError,
                format!("failed to persist artifact: {}", err),
            );
        }

        log::debug!("artifact persisted to {}", artifact_path.display());
        ExecutionResult::Success {
            image_path: artifact_path.to_path_buf(),
        }
    }
}

/// First PNG in the working directory, name-sorted for determinism
fn first_png(dir: &Path) -> Option<PathBuf> {
    let mut pngs: Vec<PathBuf> = std::fs::read_dir(dir)
        .ok()?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.extension()
                .map(|ext| ext.eq_ignore_ascii_case("png"))
                .unwrap_or(false)
        })
        .collect();
    pngs.sort();
    pngs.into_iter().next()
}

/// Turn interpreter stderr into a user-facing diagnostic.
///
/// Import errors get special handling: the offending identifier is named so
/// a near-miss component is obvious at a glance.
fn diagnose_failure(stderr: &str, exit_code: Option<i32>) -> String {
    if let Some(captures) = CANNOT_IMPORT.captures(stderr) {
        return format!(
            "import error: '{}' is not a valid component name; regenerating or simplifying the description usually fixes this",
            &captures[1]
        );
    }

    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        return match exit_code {
            Some(code) => format!("execution failed with exit code {}", code),
            None => "execution was terminated by a signal".to_string(),
        };
    }

    let tail: String = if trimmed.len() > STDERR_TAIL_CHARS {
        let cut = trimmed.len() - STDERR_TAIL_CHARS;
        // Round down to a char boundary
        let start = (cut..trimmed.len())
            .find(|i| trimmed.is_char_boundary(*i))
            .unwrap_or(cut);
        format!("...{}", &trimmed[start..])
    } else {
        trimmed.to_string()
    };
    format!("execution failed: {}", tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Runner driven by `sh` so the tests need no Python installation;
    /// the "source" files are shell scripts exercising the same contract.
    fn sh_runner(timeout_secs: u64) -> SandboxRunner {
        SandboxRunner::new(SandboxConfig {
            timeout_secs,
            interpreter: "sh".to_string(),
        })
    }

    fn artifact_in(dir: &tempfile::TempDir) -> PathBuf {
        dir.path().join("out").join("diagram.png")
    }

    #[tokio::test]
    async fn test_success_persists_artifact() {
        let out = tempfile::tempdir().unwrap();
        let artifact = artifact_in(&out);
        let runner = sh_runner(10);

        let result = runner
            .execute("printf 'not-really-a-png' > diagram.png", &artifact)
            .await;

        match result {
            ExecutionResult::Success { image_path } => {
                assert_eq!(image_path, artifact);
                let bytes = std::fs::read(&artifact).unwrap();
                assert_eq!(bytes, b"not-really-a-png");
            }
            other => panic!("expected success, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_rerun_overwrites_prior_artifact_identically() {
        let out = tempfile::tempdir().unwrap();
        let artifact = artifact_in(&out);
        let runner = sh_runner(10);
        let source = "printf 'stable-bytes' > diagram.png";

        assert!(runner.execute(source, &artifact).await.is_success());
        let first = std::fs::read(&artifact).unwrap();
        assert!(runner.execute(source, &artifact).await.is_success());
        let second = std::fs::read(&artifact).unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_timeout_kills_and_discards_partial_output() {
        let out = tempfile::tempdir().unwrap();
        let artifact = artifact_in(&out);
        let runner = sh_runner(1);

        let result = runner
            .execute("printf 'partial' > diagram.png\nsleep 30", &artifact)
            .await;

        assert_eq!(
            result,
            ExecutionResult::failure(
                FailureKind::Timeout,
                "execution exceeded the 1 second limit and was terminated"
            )
        );
        assert!(!artifact.exists(), "partial artifact must be discarded");
    }

    #[tokio::test]
    async fn test_policy_violation_runs_nothing() {
        let out = tempfile::tempdir().unwrap();
        let artifact = artifact_in(&out);
        // A python-shaped payload; the scan fires before any process spawns
        let runner = SandboxRunner::new(SandboxConfig::default());

        let result = runner
            .execute("import os\nos.system('touch diagram.png')", &artifact)
            .await;

        match result {
            ExecutionResult::Failure { kind, .. } => {
                assert_eq!(kind, FailureKind::PolicyViolation)
            }
            other => panic!("expected policy violation, got {:?}", other),
        }
        assert!(!artifact.exists());
    }

    #[tokio::test]
    async fn test_nonzero_exit_is_runtime_error() {
        let out = tempfile::tempdir().unwrap();
        let artifact = artifact_in(&out);
        let runner = sh_runner(10);

        let result = runner
            .execute("echo 'something broke' >&2\nexit 3", &artifact)
            .await;

        match result {
            ExecutionResult::Failure { kind, message } => {
                assert_eq!(kind, FailureKind::RuntimeError);
                assert!(message.contains("something broke"));
            }
            other => panic!("expected runtime error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_clean_exit_without_artifact_is_runtime_error() {
        let out = tempfile::tempdir().unwrap();
        let artifact = artifact_in(&out);
        let runner = sh_runner(10);

        let result = runner.execute("true", &artifact).await;

        match result {
            ExecutionResult::Failure { kind, message } => {
                assert_eq!(kind, FailureKind::RuntimeError);
                assert!(message.contains("no image artifact"));
            }
            other => panic!("expected runtime error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_interpreter_is_runtime_error() {
        let out = tempfile::tempdir().unwrap();
        let artifact = artifact_in(&out);
        let runner = SandboxRunner::new(SandboxConfig {
            timeout_secs: 5,
            interpreter: "definitely-not-a-real-interpreter".to_string(),
        });

        let result = runner.execute("true", &artifact).await;

        match result {
            ExecutionResult::Failure { kind, message } => {
                assert_eq!(kind, FailureKind::RuntimeError);
                assert!(message.contains("definitely-not-a-real-interpreter"));
            }
            other => panic!("expected runtime error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_environment_is_scrubbed() {
        let out = tempfile::tempdir().unwrap();
        let artifact = artifact_in(&out);
        let runner = sh_runner(10);
        std::env::set_var("SANDBOX_CANARY", "leaked");

        let result = runner
            .execute(
                "printf \"${SANDBOX_CANARY:-clean}\" > diagram.png",
                &artifact,
            )
            .await;

        assert!(result.is_success());
        let bytes = std::fs::read(&artifact).unwrap();
        assert_eq!(bytes, b"clean");
    }

    #[test]
    fn test_diagnose_names_bad_import() {
        let stderr = "Traceback (most recent call last):\n  File \"diagram.py\", line 2\nImportError: cannot import name 'DynamoDB' from 'diagrams.aws.database'";
        let message = diagnose_failure(stderr, Some(1));
        assert!(message.contains("'DynamoDB'"));
        assert!(message.contains("not a valid component"));
    }

    #[test]
    fn test_diagnose_empty_stderr_reports_exit_code() {
        assert_eq!(
            diagnose_failure("", Some(2)),
            "execution failed with exit code 2"
        );
        assert_eq!(
            diagnose_failure("  ", None),
            "execution was terminated by a signal"
        );
    }

    #[test]
    fn test_diagnose_truncates_long_stderr() {
        let stderr = "x".repeat(5000);
        let message = diagnose_failure(&stderr, Some(1));
        assert!(message.len() < 700);
        assert!(message.starts_with("execution failed: ..."));
    }
}
