//! Static policy scan over generated source
//!
//! Two gates run before any file is written or process spawned:
//!
//! - an **import allowlist**: every `import` / `from ... import` target must
//!   be the `diagrams` package or one of its submodules;
//! - a **construct denylist**: dynamic execution, filesystem and network
//!   access, process and interpreter introspection.
//!
//! This scan is defense-in-depth over untrusted text, not a sandbox: a
//! sufficiently creative program can evade pattern matching (false negatives
//! are possible and expected). The enforced boundary is the runner's
//! subprocess with its scrubbed environment and request-scoped working
//! directory. Treat every change to these lists as security-sensitive.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

/// Policy scan failures. The message names the offending pattern so the
/// user can see why the program was rejected.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PolicyError {
    #[error("import of '{0}' is not allowed; only the diagrams package may be imported")]
    ForbiddenImport(String),

    #[error("forbidden construct: {0}")]
    ForbiddenConstruct(String),
}

static IMPORT_LINE: Lazy<Regex> = Lazy::new(|| {
    // Captures stay within one line; letting them span newlines would hide
    // a following import statement from the scan.
    Regex::new(r"(?m)^[ \t]*(?:from[ \t]+([\w.]+)[ \t]+import|import[ \t]+([\w., \t]+))")
        .expect("import regex")
});

/// Denylisted construct patterns: (human label, word-boundary regex).
/// Kept explicit and reviewable rather than clever.
const DENYLIST: &[(&str, &str)] = &[
    ("eval()", r"\beval\s*\("),
    ("exec()", r"\bexec\s*\("),
    ("compile()", r"\bcompile\s*\("),
    ("__import__", r"\b__import__\b"),
    ("open()", r"\bopen\s*\("),
    ("input()", r"\binput\s*\("),
    ("breakpoint()", r"\bbreakpoint\s*\("),
    ("globals()", r"\bglobals\s*\("),
    ("locals()", r"\blocals\s*\("),
    ("vars()", r"\bvars\s*\("),
    ("getattr()", r"\bgetattr\s*\("),
    ("setattr()", r"\bsetattr\s*\("),
    ("delattr()", r"\bdelattr\s*\("),
    ("the os module", r"\bos\s*\."),
    ("the sys module", r"\bsys\s*\."),
    ("subprocess", r"\bsubprocess\b"),
    ("socket", r"\bsocket\b"),
    ("shutil", r"\bshutil\b"),
    ("pathlib", r"\bpathlib\b"),
    ("ctypes", r"\bctypes\b"),
    ("pickle", r"\bpickle\b"),
    ("marshal", r"\bmarshal\b"),
    ("importlib", r"\bimportlib\b"),
    ("urllib", r"\burllib\b"),
    ("the requests library", r"\brequests\s*\."),
    ("http.client", r"\bhttp\s*\.\s*client\b"),
    ("__builtins__", r"__builtins__"),
    ("__globals__", r"__globals__"),
    ("__subclasses__", r"__subclasses__"),
    ("__bases__", r"__bases__"),
    ("__mro__", r"__mro__"),
    ("__loader__", r"__loader__"),
    ("__spec__", r"__spec__"),
];

static DENYLIST_COMPILED: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    DENYLIST
        .iter()
        .map(|(label, pattern)| (*label, Regex::new(pattern).expect("denylist regex")))
        .collect()
});

fn module_is_allowed(module: &str) -> bool {
    module == "diagrams" || module.starts_with("diagrams.")
}

/// Scan source text against the allowlist and denylist.
///
/// Pure text analysis - nothing is executed or written here.
pub fn scan(source: &str) -> Result<(), PolicyError> {
    for captures in IMPORT_LINE.captures_iter(source) {
        if let Some(module) = captures.get(1) {
            // from X import ...
            if !module_is_allowed(module.as_str()) {
                return Err(PolicyError::ForbiddenImport(module.as_str().to_string()));
            }
        } else if let Some(list) = captures.get(2) {
            // import X, Y
            for module in list.as_str().split(',') {
                // `import x as y` - the module is the part before `as`
                let module = module.split_whitespace().next().unwrap_or("");
                if module.is_empty() {
                    continue;
                }
                if !module_is_allowed(module) {
                    return Err(PolicyError::ForbiddenImport(module.to_string()));
                }
            }
        }
    }

    for (label, regex) in DENYLIST_COMPILED.iter() {
        if regex.is_match(source) {
            return Err(PolicyError::ForbiddenConstruct((*label).to_string()));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLEAN_PROGRAM: &str = r#"from diagrams import Diagram, Cluster
from diagrams.aws.compute import Lambda
from diagrams.aws.database import Dynamodb

with Diagram("App", show=False, direction="LR"):
    fn = Lambda("handler")
    db = Dynamodb("table")
    fn >> db
"#;

    #[test]
    fn test_clean_program_passes() {
        assert!(scan(CLEAN_PROGRAM).is_ok());
    }

    #[test]
    fn test_plain_import_of_os_rejected() {
        let err = scan("import os\n").unwrap_err();
        assert_eq!(err, PolicyError::ForbiddenImport("os".to_string()));
    }

    #[test]
    fn test_from_import_outside_diagrams_rejected() {
        let err = scan("from subprocess import run\n").unwrap_err();
        assert!(matches!(err, PolicyError::ForbiddenImport(m) if m == "subprocess"));
    }

    #[test]
    fn test_import_list_rejected() {
        let err = scan("import json, socket\n").unwrap_err();
        assert!(matches!(err, PolicyError::ForbiddenImport(m) if m == "json"));
    }

    #[test]
    fn test_import_with_alias_rejected() {
        let err = scan("import os as operating_system\n").unwrap_err();
        assert!(matches!(err, PolicyError::ForbiddenImport(m) if m == "os"));
    }

    #[test]
    fn test_diagrams_submodule_allowed() {
        assert!(scan("import diagrams.aws.compute\n").is_ok());
        assert!(scan("from diagrams.k8s.network import Ingress\n").is_ok());
    }

    #[test]
    fn test_diagrams_prefix_spoof_rejected() {
        // `diagramsx` is not the diagrams package
        let err = scan("import diagramsx\n").unwrap_err();
        assert!(matches!(err, PolicyError::ForbiddenImport(_)));
    }

    #[test]
    fn test_eval_rejected() {
        let err = scan("x = eval('1+1')\n").unwrap_err();
        assert!(matches!(err, PolicyError::ForbiddenConstruct(l) if l.contains("eval")));
    }

    #[test]
    fn test_dunder_escape_rejected() {
        let source = "().__class__.__bases__[0].__subclasses__()";
        assert!(matches!(
            scan(source),
            Err(PolicyError::ForbiddenConstruct(_))
        ));
    }

    #[test]
    fn test_open_rejected() {
        assert!(scan("open('/etc/passwd')").is_err());
    }

    #[test]
    fn test_os_attribute_access_rejected() {
        assert!(scan("x = os.environ").is_err());
    }

    #[test]
    fn test_identifier_containing_os_is_fine() {
        // word boundary: `photos.` must not trip the `os.` pattern
        assert!(scan("photos = Dynamodb('photos')\nphotos >> photos").is_ok());
    }

    #[test]
    fn test_import_on_following_line_still_scanned() {
        let source = "import diagrams\nfrom json import loads\n";
        assert!(matches!(
            scan(source),
            Err(PolicyError::ForbiddenImport(m)) if m == "json"
        ));
    }

    #[test]
    fn test_error_message_names_the_pattern() {
        let err = scan("import socket").unwrap_err();
        assert!(err.to_string().contains("socket"));
    }
}
