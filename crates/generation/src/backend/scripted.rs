//! Scripted backend
//!
//! Returns canned responses in order, then repeats the final one. Used by
//! the pipeline tests and as an offline mode when no credential is
//! available; it never touches the network.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use super::{GenerationBackend, GenerationError};

/// A canned response program
pub struct ScriptedBackend {
    responses: Mutex<VecDeque<Result<String, GenerationError>>>,
    /// Served once the scripted queue is exhausted
    fallback: String,
    calls: AtomicUsize,
}

/// Minimal valid program served when no script is configured
const DEFAULT_RESPONSE: &str = "```python\nfrom diagrams import Diagram\nfrom diagrams.onprem.client import User\n\nwith Diagram(\"Scripted\", show=False):\n    User(\"user\")\n```";

impl ScriptedBackend {
    /// Create a backend that always serves the default canned program
    pub fn new() -> Self {
        Self::with_responses(Vec::new())
    }

    /// Create with an ordered script of responses
    pub fn with_responses(responses: Vec<Result<String, GenerationError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            fallback: DEFAULT_RESPONSE.to_string(),
            calls: AtomicUsize::new(0),
        }
    }

    /// Create with a single fixed response text
    pub fn with_response(text: impl Into<String>) -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            fallback: text.into(),
            calls: AtomicUsize::new(0),
        }
    }

    /// How many generate calls this backend has served
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for ScriptedBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GenerationBackend for ScriptedBackend {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn description(&self) -> &'static str {
        "Canned responses for tests and offline use; no network access"
    }

    async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self
            .responses
            .lock()
            .expect("scripted response queue poisoned")
            .pop_front();
        match next {
            Some(result) => result,
            None => Ok(self.fallback.clone()),
        }
    }

    async fn health_check(&self) -> bool {
        true
    }
}
