//! Host-agnostic application services for Archigram
//!
//! One inbound operation: submit a description, get back a view model. The
//! service wires the linear pipeline (prompt → generate → extract → repair →
//! policy scan → execute → present), keeps per-session history, and owns the
//! request-scoped artifact paths. Transports (HTTP, CLI) live in adapter
//! crates and never see a raw pipeline error - every failure is already a
//! displayable view by the time it leaves this crate.

pub mod config;
pub mod examples;
pub mod service;
pub mod view;

pub use config::{AppConfig, ConfigError};
pub use examples::{example_prompts, ExamplePrompt};
pub use service::{DiagramService, ServiceError, SessionEntry, SharedService};
pub use view::DiagramView;
