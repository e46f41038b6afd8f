//! Generation gateway - single entry point for generation requests
//!
//! The gateway owns the active backend and applies the one piece of policy
//! the backends themselves must not: bounded retry with exponential backoff,
//! for transient network failures only. Auth, rate-limit, and upstream
//! errors pass through on the first failure - retrying a rejected credential
//! or an exhausted quota only makes things worse.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::backend::{BackendRegistry, BackendSettings, GenerationBackend, GenerationError};

/// Retry policy applied by the gateway
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Additional attempts after the first failure
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Backoff before the first retry; doubles each attempt
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,
}

fn default_max_retries() -> u32 {
    2
}

fn default_initial_backoff_ms() -> u64 {
    500
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_backoff_ms: default_initial_backoff_ms(),
        }
    }
}

/// The single entry point for generation round trips.
pub struct GenerationGateway {
    backend: Box<dyn GenerationBackend>,
    retry: RetryConfig,
}

impl GenerationGateway {
    /// Create a gateway over an already-constructed backend
    pub fn with_backend(backend: Box<dyn GenerationBackend>, retry: RetryConfig) -> Self {
        Self { backend, retry }
    }

    /// Create a gateway by backend name from the registry
    pub fn from_registry(
        name: &str,
        settings: &BackendSettings,
        retry: RetryConfig,
    ) -> Result<Self, GenerationError> {
        let backend = BackendRegistry::new().create(name, settings)?;
        log::info!("generation gateway using backend '{}'", backend.name());
        Ok(Self::with_backend(backend, retry))
    }

    /// Name of the active backend
    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Health check the active backend
    pub async fn health_check(&self) -> bool {
        self.backend.health_check().await
    }

    /// One generation round trip with transient-only bounded retry.
    pub async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let mut attempt: u32 = 0;
        loop {
            match self.backend.generate(prompt).await {
                Ok(text) => {
                    log::debug!(
                        "backend '{}' returned {} chars on attempt {}",
                        self.backend.name(),
                        text.len(),
                        attempt + 1
                    );
                    return Ok(text);
                }
                Err(err) if err.is_transient() && attempt < self.retry.max_retries => {
                    let backoff = self.retry.initial_backoff_ms << attempt;
                    log::warn!(
                        "transient generation failure (attempt {}/{}), retrying in {}ms: {}",
                        attempt + 1,
                        self.retry.max_retries + 1,
                        backoff,
                        err
                    );
                    tokio::time::sleep(Duration::from_millis(backoff)).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

/// Shared gateway type for application state
pub type SharedGateway = Arc<GenerationGateway>;
