//! Common types for generation operations

use diagram_catalog::Provider;
use serde::{Deserialize, Serialize};

/// One user submission, immutable for the lifetime of its pipeline run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagramRequest {
    /// Free-form architecture description, unbounded length
    pub description: String,
    /// Vocabulary hint for the prompt builder
    #[serde(default)]
    pub provider: Provider,
}

impl DiagramRequest {
    pub fn new(description: impl Into<String>, provider: Provider) -> Self {
        Self {
            description: description.into(),
            provider,
        }
    }
}

/// Executable diagram-DSL source extracted from a model response.
///
/// The source is handed to the sandbox verbatim; the repair pass may rewrite
/// component identifiers but never truncates or reorders statements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedCode {
    pub source: String,
}

impl GeneratedCode {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.source.trim().is_empty()
    }
}
