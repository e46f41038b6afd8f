//! Example prompts offered to the UI

use diagram_catalog::Provider;
use serde::Serialize;

/// One ready-made prompt the UI can offer as a starting point
#[derive(Debug, Clone, Serialize)]
pub struct ExamplePrompt {
    pub name: &'static str,
    pub provider: Provider,
    pub prompt: &'static str,
}

const EXAMPLES: &[ExamplePrompt] = &[
    ExamplePrompt {
        name: "Microservices Architecture",
        provider: Provider::Generic,
        prompt: "Create a microservices architecture with:\n- Users connecting through a load balancer\n- API Gateway routing to three microservices: User Service, Order Service, and Payment Service\n- Each microservice has its own database\n- A message queue (Kafka) for async communication between services\n- Redis cache for the User Service",
    },
    ExamplePrompt {
        name: "AWS Serverless",
        provider: Provider::Aws,
        prompt: "Create a serverless application using API Gateway, Lambda functions, DynamoDB,\nS3 for file storage, and CloudFront for CDN",
    },
    ExamplePrompt {
        name: "Three-Tier Web App",
        provider: Provider::Aws,
        prompt: "Create a three-tier web application on AWS with ALB, EC2 instances in multiple\navailability zones, RDS database with read replica, and S3 for static content",
    },
    ExamplePrompt {
        name: "Event-Driven System",
        provider: Provider::Aws,
        prompt: "Create an event-driven system with EventBridge for routing, Lambda for processing,\nSQS for queuing, SNS for notifications, and DynamoDB for state",
    },
    ExamplePrompt {
        name: "Kubernetes Deployment",
        provider: Provider::Kubernetes,
        prompt: "Design a Kubernetes-based microservices architecture with ingress controller,\n3 microservices in separate pods, Redis cache, PostgreSQL database, and monitoring\nwith Prometheus",
    },
];

/// The built-in example prompts
pub fn example_prompts() -> &'static [ExamplePrompt] {
    EXAMPLES
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_examples_are_nonempty() {
        assert_eq!(example_prompts().len(), 5);
        for example in example_prompts() {
            assert!(!example.name.is_empty());
            assert!(!example.prompt.is_empty());
        }
    }

    #[test]
    fn test_examples_serialize() {
        let json = serde_json::to_string(example_prompts()).unwrap();
        assert!(json.contains("Kubernetes Deployment"));
    }
}
