//! AI diagram-code generation client
//!
//! This library owns the request half of the pipeline: it builds the prompt
//! that constrains the model to the supported component vocabulary, sends it
//! to a generation backend, and extracts the single fenced code block the
//! prompt contract demands from the raw response.
//!
//! # Example
//!
//! ```rust,ignore
//! use generation::{DiagramRequest, GenerationGateway, ScriptedBackend};
//!
//! let gateway = GenerationGateway::with_backend(Box::new(backend), RetryConfig::default());
//! let raw = gateway.generate(&prompt).await?;
//! let code = generation::extract_code(&raw)?;
//! ```

pub mod backend;
pub mod extract;
pub mod gateway;
pub mod prompt;
pub mod types;

// Re-exports for convenience
pub use backend::{
    BackendFactory, BackendInfo, BackendRegistry, BackendSettings, GeminiBackend,
    GenerationBackend, GenerationError, ScriptedBackend,
};
pub use extract::{extract_code, ExtractError};
pub use gateway::{GenerationGateway, RetryConfig, SharedGateway};
pub use prompt::build_prompt;
pub use types::{DiagramRequest, GeneratedCode};
