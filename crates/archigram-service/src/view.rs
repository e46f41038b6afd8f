//! Result presentation
//!
//! The view model is total: both the success and the failure branch are
//! always displayable, and building one never fails. On the failure branch
//! the generated source rides along whenever it exists, so a user can
//! diagnose a near-miss without digging through logs.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use generation::{ExtractError, GeneratedCode, GenerationError};
use sandbox::{ExecutionResult, FailureKind, RepairFix};

/// Renderable outcome of one submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DiagramView {
    Success {
        /// Rendered artifact on disk
        image_path: PathBuf,
        /// The source that produced it, for inspection or download
        generated_code: String,
        /// Identifier rewrites the repair pass applied
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        fixes: Vec<RepairFix>,
    },
    Error {
        /// Stable error kind: auth, rate_limited, transient_network,
        /// upstream, invalid_response, no_code_found, policy_violation,
        /// runtime_error, timeout, invalid_request
        kind: String,
        /// Human-readable explanation
        message: String,
        /// Present when the failure happened after code was extracted
        #[serde(skip_serializing_if = "Option::is_none")]
        generated_code: Option<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        fixes: Vec<RepairFix>,
    },
}

impl DiagramView {
    pub fn is_success(&self) -> bool {
        matches!(self, DiagramView::Success { .. })
    }

    /// Stable kind string, `None` on the success branch
    pub fn kind(&self) -> Option<&str> {
        match self {
            DiagramView::Success { .. } => None,
            DiagramView::Error { kind, .. } => Some(kind),
        }
    }

    /// Present a sandbox outcome alongside the code that produced it
    pub fn present(result: ExecutionResult, code: &GeneratedCode, fixes: Vec<RepairFix>) -> Self {
        match result {
            ExecutionResult::Success { image_path } => DiagramView::Success {
                image_path,
                generated_code: code.source.clone(),
                fixes,
            },
            ExecutionResult::Failure { kind, message } => DiagramView::Error {
                kind: failure_kind_str(kind).to_string(),
                message,
                generated_code: Some(code.source.clone()),
                fixes,
            },
        }
    }

    /// Present an AI-client failure; the pipeline short-circuited before any
    /// code existed.
    pub fn from_generation_error(err: &GenerationError) -> Self {
        DiagramView::Error {
            kind: generation_kind_str(err).to_string(),
            message: err.to_string(),
            generated_code: None,
            fixes: Vec::new(),
        }
    }

    /// Present an extraction failure
    pub fn from_extract_error(err: &ExtractError) -> Self {
        DiagramView::Error {
            kind: match err {
                ExtractError::NoCodeFound => "no_code_found".to_string(),
            },
            message: err.to_string(),
            generated_code: None,
            fixes: Vec::new(),
        }
    }

    /// Present a request the pipeline refused to start
    pub fn invalid_request(message: impl Into<String>) -> Self {
        DiagramView::Error {
            kind: "invalid_request".to_string(),
            message: message.into(),
            generated_code: None,
            fixes: Vec::new(),
        }
    }
}

fn failure_kind_str(kind: FailureKind) -> &'static str {
    match kind {
        FailureKind::PolicyViolation => "policy_violation",
        FailureKind::RuntimeError => "runtime_error",
        FailureKind::Timeout => "timeout",
    }
}

fn generation_kind_str(err: &GenerationError) -> &'static str {
    match err {
        GenerationError::Auth(_) => "auth",
        GenerationError::RateLimited { .. } => "rate_limited",
        GenerationError::TransientNetwork(_) => "transient_network",
        GenerationError::Upstream { .. } => "upstream",
        GenerationError::InvalidResponse(_) => "invalid_response",
        GenerationError::Config(_) => "config",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_present_success_carries_code() {
        let result = ExecutionResult::Success {
            image_path: PathBuf::from("/artifacts/a.png"),
        };
        let code = GeneratedCode::new("x = 1");
        let view = DiagramView::present(result, &code, Vec::new());
        match view {
            DiagramView::Success {
                image_path,
                generated_code,
                ..
            } => {
                assert_eq!(image_path, PathBuf::from("/artifacts/a.png"));
                assert_eq!(generated_code, "x = 1");
            }
            other => panic!("expected success view, got {:?}", other),
        }
    }

    #[test]
    fn test_present_failure_carries_code_and_kind() {
        let result = ExecutionResult::failure(FailureKind::Timeout, "too slow");
        let code = GeneratedCode::new("x = 1");
        let view = DiagramView::present(result, &code, Vec::new());
        assert_eq!(view.kind(), Some("timeout"));
        match view {
            DiagramView::Error {
                generated_code, message, ..
            } => {
                assert_eq!(generated_code.as_deref(), Some("x = 1"));
                assert_eq!(message, "too slow");
            }
            other => panic!("expected error view, got {:?}", other),
        }
    }

    #[test]
    fn test_generation_error_has_no_code() {
        let view =
            DiagramView::from_generation_error(&GenerationError::Auth("no key".to_string()));
        assert_eq!(view.kind(), Some("auth"));
        match view {
            DiagramView::Error { generated_code, .. } => assert!(generated_code.is_none()),
            other => panic!("expected error view, got {:?}", other),
        }
    }

    #[test]
    fn test_extract_error_kind() {
        let view = DiagramView::from_extract_error(&ExtractError::NoCodeFound);
        assert_eq!(view.kind(), Some("no_code_found"));
    }

    #[test]
    fn test_view_serializes_with_status_tag() {
        let view = DiagramView::invalid_request("description must not be empty");
        let json = serde_json::to_string(&view).unwrap();
        assert!(json.contains("\"status\":\"error\""));
        assert!(json.contains("\"kind\":\"invalid_request\""));
    }

    #[test]
    fn test_fixes_survive_presentation() {
        let result = ExecutionResult::failure(FailureKind::RuntimeError, "boom");
        let code = GeneratedCode::new("x = 1");
        let fixes = vec![RepairFix {
            from: "DynamoDB".to_string(),
            to: "Dynamodb".to_string(),
        }];
        let view = DiagramView::present(result, &code, fixes.clone());
        match view {
            DiagramView::Error { fixes: got, .. } => assert_eq!(got, fixes),
            other => panic!("expected error view, got {:?}", other),
        }
    }
}
