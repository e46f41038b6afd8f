//! Prompt construction
//!
//! The system instruction pins the model to the supported component
//! vocabulary and to an output shape the extractor depends on: exactly one
//! fenced code block, no prose. Everything downstream (extraction, repair,
//! the policy scan) assumes this contract was at least attempted.

use diagram_catalog::{format_listing, Provider};

use crate::types::DiagramRequest;

/// System instruction template. `{component_list}` is replaced with the
/// vocabulary listing for the request's provider.
const SYSTEM_PROMPT_TEMPLATE: &str = r#"You are an expert in creating architecture diagrams using the Python 'diagrams' library.

AVAILABLE COMPONENTS - USE ONLY THESE EXACT NAMES:
{component_list}

CRITICAL RULES:
1. Use ONLY components listed above with EXACT names
2. NEVER use 'EventBridge' - use 'Eventbridge' instead
3. NEVER use 'DynamoDB' - use 'Dynamodb' instead
4. NEVER use 'ElastiCache' - use 'Elasticache' instead
5. NEVER use 'Users' - use 'User' instead
6. Always use show=False in Diagram()
7. Use proper connections: >> (left to right), << (right to left), or - (bidirectional)
8. Use Cluster for grouping related components
9. Set direction parameter: "LR" (left-right), "TB" (top-bottom), "BT", or "RL"
10. Import ONLY from the diagrams package - no other imports of any kind
11. Respond with EXACTLY ONE fenced code block and nothing else - no explanations before or after

EXAMPLE (FOLLOW THIS EXACT PATTERN):
```python
from diagrams import Diagram, Cluster
from diagrams.aws.compute import Lambda, ECS
from diagrams.aws.database import RDS, Dynamodb, Elasticache
from diagrams.aws.network import CloudFront, APIGateway
from diagrams.aws.integration import SQS, SNS, StepFunctions
from diagrams.onprem.client import User

with Diagram("E-commerce Platform", show=False, direction="LR"):
    customer = User("Customer")

    with Cluster("AWS Cloud"):
        cdn = CloudFront("CDN")
        api = APIGateway("API Gateway")

        with Cluster("Services"):
            auth = Lambda("Auth")
            products = ECS("Products")

        with Cluster("Data"):
            db = Dynamodb("User DB")
            cache = Elasticache("Cache")

        queue = SQS("Queue")
        topic = SNS("Notifications")

    customer >> cdn >> api >> auth
    api >> products >> [db, cache]
    products >> queue >> topic
```

Generate ONLY the Python code, no explanations."#;

/// Build the full prompt payload for one request.
///
/// Pure function: system instruction (with the provider-narrowed vocabulary
/// listing) followed by the user description.
pub fn build_prompt(request: &DiagramRequest) -> String {
    let system = SYSTEM_PROMPT_TEMPLATE.replace(
        "{component_list}",
        &format_listing(request.provider),
    );

    format!(
        "{system}\n\nUser Description:\n{description}\n\nGenerate the diagram code:",
        system = system,
        description = request.description,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(provider: Provider) -> DiagramRequest {
        DiagramRequest::new("a load balancer and two web servers", provider)
    }

    #[test]
    fn test_prompt_contains_user_description() {
        let prompt = build_prompt(&request(Provider::Generic));
        assert!(prompt.contains("a load balancer and two web servers"));
    }

    #[test]
    fn test_prompt_demands_single_fenced_block() {
        let prompt = build_prompt(&request(Provider::Generic));
        assert!(prompt.contains("EXACTLY ONE fenced code block"));
    }

    #[test]
    fn test_prompt_lists_exact_component_names() {
        let prompt = build_prompt(&request(Provider::Generic));
        assert!(prompt.contains("diagrams.aws.integration"));
        assert!(prompt.contains("Eventbridge"));
    }

    #[test]
    fn test_placeholder_is_substituted() {
        let prompt = build_prompt(&request(Provider::Generic));
        assert!(!prompt.contains("{component_list}"));
    }

    #[test]
    fn test_kubernetes_provider_narrows_listing() {
        let prompt = build_prompt(&request(Provider::Kubernetes));
        assert!(prompt.contains("diagrams.k8s.compute"));
        assert!(!prompt.contains("diagrams.aws.storage"));
    }
}
