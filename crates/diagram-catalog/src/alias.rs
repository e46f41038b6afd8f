//! Alias table for habitual misspellings
//!
//! Generative models keep "correcting" the DSL's deliberate lowercasings
//! (Dynamodb, Eventbridge) back to the marketing spellings, or pluralizing
//! component names. These pairs map the known bad spellings to the exact
//! names the DSL exports. Entries are matched on word boundaries by the
//! repair pass, so substrings of longer identifiers are left alone.

/// Known bad spelling → exact component name
pub const NAME_FIXES: &[(&str, &str)] = &[
    ("DynamoDB", "Dynamodb"),
    ("DynamoDb", "Dynamodb"),
    ("ElastiCache", "Elasticache"),
    ("ElasticCache", "Elasticache"),
    ("EventBridge", "Eventbridge"),
    ("StepFunctionss", "StepFunctions"),
    ("StepFunction", "StepFunctions"),
    ("Stepfunctions", "StepFunctions"),
    ("ApiGateway", "APIGateway"),
    ("Api_Gateway", "APIGateway"),
    ("Users", "User"),
    ("Clients", "Client"),
];

/// Canonical spelling for a known-bad name, if any
pub fn canonical_name(name: &str) -> Option<&'static str> {
    NAME_FIXES
        .iter()
        .find(|(bad, _)| *bad == name)
        .map(|(_, good)| *good)
}

/// Collapse runs of a repeated character to a single occurrence
/// (`StepFunctionss` → `StepFunctions` would not collapse here since the
/// doubled `s` spans a word end — this handles `Lambdaa`-style typos).
pub fn collapse_repeats(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut last: Option<char> = None;
    for c in name.chars() {
        if last != Some(c) {
            out.push(c);
        }
        last = Some(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_name_hits() {
        assert_eq!(canonical_name("DynamoDB"), Some("Dynamodb"));
        assert_eq!(canonical_name("EventBridge"), Some("Eventbridge"));
        assert_eq!(canonical_name("StepFunction"), Some("StepFunctions"));
    }

    #[test]
    fn test_canonical_name_exact_names_pass() {
        assert_eq!(canonical_name("Dynamodb"), None);
        assert_eq!(canonical_name("StepFunctions"), None);
    }

    #[test]
    fn test_collapse_repeats() {
        assert_eq!(collapse_repeats("Lambdaa"), "Lambda");
        assert_eq!(collapse_repeats("EC2"), "EC2");
        assert_eq!(collapse_repeats(""), "");
    }
}
