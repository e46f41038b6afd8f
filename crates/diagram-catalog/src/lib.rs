//! Shared diagram component vocabulary
//!
//! This crate is the single source of truth for which diagram components the
//! generator may reference: the module/component tables advertised to the AI
//! model, the alias table for names the model habitually misspells, and the
//! fuzzy lookup used to repair near-miss component names before execution.

pub mod alias;
pub mod catalog;

pub use alias::{canonical_name, collapse_repeats, NAME_FIXES};
pub use catalog::{
    find_similar, format_listing, is_known_component, lookup_module, modules_for,
    ComponentModule, MODULES,
};

use serde::{Deserialize, Serialize};

/// Which component vocabulary the user asked for.
///
/// The provider narrows the module listing embedded in the prompt; it does
/// not restrict what the repair pass can recognize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provider {
    /// All vocabulary sections (cloud, on-prem, programming, Kubernetes)
    #[default]
    Generic,
    /// AWS plus the on-prem and programming sections
    Aws,
    /// Kubernetes plus the on-prem and programming sections
    Kubernetes,
}

impl Provider {
    /// Stable identifier used on the wire and in logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Generic => "generic",
            Provider::Aws => "aws",
            Provider::Kubernetes => "kubernetes",
        }
    }
}
