//! Source repair for near-miss component names
//!
//! Models keep emitting `DynamoDB` where the DSL exports `Dynamodb`, or
//! pluralize `User` into `Users`. Rather than bounce every such program back
//! to the user, this pass rewrites known-bad identifiers to the catalog's
//! exact names: first the alias table, then a fuzzy check of every
//! `from diagrams... import` line. Rewrites touch identifiers only - no
//! statement is added, removed, or reordered - and every applied fix is
//! reported so the presenter can surface what changed.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use diagram_catalog::{canonical_name, find_similar, is_known_component, lookup_module, NAME_FIXES};

/// One identifier rewrite applied to the source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepairFix {
    pub from: String,
    pub to: String,
}

static FROM_IMPORT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^[ \t]*from[ \t]+(diagrams(?:\.\w+)*)[ \t]+import[ \t]+([\w, \t]+)$")
        .expect("from-import regex")
});

/// Replace whole-word occurrences of `from` with `to` across the source
fn replace_identifier(source: &str, from: &str, to: &str) -> String {
    let pattern = format!(r"\b{}\b", regex::escape(from));
    // Identifier names are valid regex-escaped words; compilation cannot fail
    let re = Regex::new(&pattern).expect("identifier regex");
    re.replace_all(source, to).into_owned()
}

/// Apply the alias table and fuzzy import fixing to one program.
///
/// Returns the repaired source and the list of applied fixes (empty when the
/// program was already clean - in that case the source comes back
/// byte-identical).
pub fn repair_source(source: &str) -> (String, Vec<RepairFix>) {
    let mut code = source.to_string();
    let mut fixes: Vec<RepairFix> = Vec::new();

    // Pass 1: known misspellings, word-boundary matched
    for (bad, good) in NAME_FIXES {
        let replaced = replace_identifier(&code, bad, good);
        if replaced != code {
            log::info!("repair: {} -> {}", bad, good);
            fixes.push(RepairFix {
                from: (*bad).to_string(),
                to: (*good).to_string(),
            });
            code = replaced;
        }
    }

    // Pass 2: fuzzy-fix import lines against the catalog
    let mut pending: Vec<(String, &'static str)> = Vec::new();
    for captures in FROM_IMPORT.captures_iter(&code) {
        let module = &captures[1];
        if lookup_module(module).is_none() {
            // Unknown module path: nothing to repair against; the policy
            // scan and the interpreter will have their say.
            continue;
        }
        for raw_name in captures[2].split(',') {
            // `X as y` - only the imported name participates
            let name = raw_name.split_whitespace().next().unwrap_or("");
            if name.is_empty() || is_known_component(module, name) {
                continue;
            }
            if let Some(fixed) = canonical_name(name).or_else(|| find_similar(module, name)) {
                pending.push((name.to_string(), fixed));
            }
        }
    }

    for (bad, good) in pending {
        let replaced = replace_identifier(&code, &bad, good);
        if replaced != code {
            log::info!("repair: {} -> {} (fuzzy import fix)", bad, good);
            fixes.push(RepairFix {
                from: bad,
                to: good.to_string(),
            });
            code = replaced;
        }
    }

    (code, fixes)
}
