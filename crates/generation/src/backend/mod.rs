//! Pluggable generation backend abstraction
//!
//! A backend performs one blocking round trip to a generative-AI service:
//! prompt text in, raw response text out. All backends implement the same
//! interface so the gateway and the pipeline never know which service is
//! active. There is no streaming contract.

pub mod gemini;
pub mod registry;
pub mod scripted;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use gemini::GeminiBackend;
pub use registry::{BackendFactory, BackendRegistry};
pub use scripted::ScriptedBackend;

/// Error taxonomy for generation requests.
///
/// Every failure is reported upward unmodified; retry policy lives in the
/// gateway, never in a backend.
#[derive(Debug, Clone, thiserror::Error)]
pub enum GenerationError {
    /// API key missing, malformed, or rejected by the service
    #[error("authentication failed: {0}")]
    Auth(String),

    /// External quota exhausted
    #[error("rate limited by the generation service")]
    RateLimited { retry_after: Option<u64> },

    /// Connectivity failure (connect, timeout, reset). The only variant a
    /// caller may retry.
    #[error("transient network error: {0}")]
    TransientNetwork(String),

    /// Any other non-2xx response
    #[error("upstream error ({status}): {body}")]
    Upstream { status: u16, body: String },

    /// A 2xx response whose body the client could not decode
    #[error("invalid response from generation service: {0}")]
    InvalidResponse(String),

    /// Startup-time configuration problem (unknown backend name). Never
    /// produced during a request round trip.
    #[error("configuration error: {0}")]
    Config(String),
}

impl GenerationError {
    /// Whether a caller-level retry is permitted for this error
    pub fn is_transient(&self) -> bool {
        matches!(self, GenerationError::TransientNetwork(_))
    }

    /// Map a transport-layer error onto the taxonomy. Status-code mapping
    /// happens at the call site where the response is available.
    pub fn from_transport(err: reqwest::Error) -> Self {
        if err.is_decode() {
            GenerationError::InvalidResponse(err.to_string())
        } else {
            GenerationError::TransientNetwork(err.to_string())
        }
    }
}

/// Settings a factory needs to instantiate a backend
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BackendSettings {
    /// API credential; resolved (config, then environment) by the caller
    pub api_key: Option<String>,
    /// Model identifier, e.g. `gemini-2.0-flash-exp`
    #[serde(default)]
    pub model: Option<String>,
    /// Service base URL override (tests, proxies)
    #[serde(default)]
    pub base_url: Option<String>,
}

/// Backend information for UI display
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendInfo {
    /// Backend identifier (e.g., "gemini", "scripted")
    pub name: String,
    /// Human-readable description
    pub description: String,
    /// Whether this backend needs an API credential to operate
    pub requires_api_key: bool,
}

/// The core trait every generation backend implements.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Backend identifier for logs and UI display
    fn name(&self) -> &'static str;

    /// Description of this backend
    fn description(&self) -> &'static str;

    /// One blocking round trip: prompt in, raw response text out
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;

    /// Verify the backend is reachable and credentialed
    async fn health_check(&self) -> bool;
}
