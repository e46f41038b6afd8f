//! Component vocabulary tables
//!
//! The module paths and component names mirror the Python `diagrams` library
//! that the generated code targets. Only names listed here are advertised to
//! the model, and only these names survive the repair pass unchanged.

use crate::Provider;

/// Vocabulary section a module belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Aws,
    OnPrem,
    Programming,
    Kubernetes,
}

/// One importable module of the diagram DSL and its component names
#[derive(Debug, Clone, Copy)]
pub struct ComponentModule {
    /// Import path, e.g. `diagrams.aws.compute`
    pub path: &'static str,
    pub section: Section,
    /// Exact class names importable from this module
    pub components: &'static [&'static str],
}

/// The full vocabulary. Names are exact; the DSL is case-sensitive and
/// several of them (Dynamodb, Eventbridge) are deliberate lowercasings that
/// models tend to "correct" — see the alias table.
pub const MODULES: &[ComponentModule] = &[
    ComponentModule {
        path: "diagrams.aws.compute",
        section: Section::Aws,
        components: &["EC2", "Lambda", "ECS", "EKS", "Batch", "Fargate", "ElasticBeanstalk"],
    },
    ComponentModule {
        path: "diagrams.aws.database",
        section: Section::Aws,
        components: &[
            "RDS",
            "Dynamodb",
            "Aurora",
            "Elasticache",
            "DocumentdbMongodbCompatibility",
            "Neptune",
            "Redshift",
            "Timestream",
        ],
    },
    ComponentModule {
        path: "diagrams.aws.network",
        section: Section::Aws,
        components: &[
            "ELB",
            "ALB",
            "NLB",
            "CloudFront",
            "Route53",
            "APIGateway",
            "VPC",
            "DirectConnect",
            "CloudMap",
        ],
    },
    ComponentModule {
        path: "diagrams.aws.storage",
        section: Section::Aws,
        components: &["S3", "EBS", "EFS", "Backup", "StorageGateway", "Fsx"],
    },
    ComponentModule {
        path: "diagrams.aws.integration",
        section: Section::Aws,
        components: &[
            "SQS",
            "SNS",
            "StepFunctions",
            "Eventbridge",
            "MQ",
            "Appsync",
            "ExpressWorkflows",
        ],
    },
    ComponentModule {
        path: "diagrams.onprem.client",
        section: Section::OnPrem,
        components: &["User", "Client"],
    },
    ComponentModule {
        path: "diagrams.onprem.database",
        section: Section::OnPrem,
        components: &["PostgreSQL", "MySQL", "MongoDB", "Cassandra", "Mariadb"],
    },
    ComponentModule {
        path: "diagrams.onprem.inmemory",
        section: Section::OnPrem,
        components: &["Redis", "Memcached"],
    },
    ComponentModule {
        path: "diagrams.onprem.queue",
        section: Section::OnPrem,
        components: &["Kafka", "RabbitMQ", "Celery", "Activemq"],
    },
    ComponentModule {
        path: "diagrams.onprem.monitoring",
        section: Section::OnPrem,
        components: &["Prometheus", "Grafana", "Datadog", "Splunk"],
    },
    ComponentModule {
        path: "diagrams.programming.framework",
        section: Section::Programming,
        components: &["React", "Django", "FastAPI", "Spring", "Flask"],
    },
    ComponentModule {
        path: "diagrams.programming.language",
        section: Section::Programming,
        components: &["Python", "Java", "NodeJS", "Go", "Javascript"],
    },
    ComponentModule {
        path: "diagrams.k8s.compute",
        section: Section::Kubernetes,
        components: &["Pod", "Deployment", "StatefulSet", "Job", "DaemonSet"],
    },
    ComponentModule {
        path: "diagrams.k8s.network",
        section: Section::Kubernetes,
        components: &["Ingress", "Service"],
    },
    ComponentModule {
        path: "diagrams.k8s.storage",
        section: Section::Kubernetes,
        components: &["PV", "PVC", "StorageClass"],
    },
];

/// Modules advertised to the model for a given provider hint.
///
/// The on-prem and programming sections are always included; the cloud
/// sections are narrowed to the requested provider.
pub fn modules_for(provider: Provider) -> impl Iterator<Item = &'static ComponentModule> {
    MODULES.iter().filter(move |m| match m.section {
        Section::OnPrem | Section::Programming => true,
        Section::Aws => matches!(provider, Provider::Generic | Provider::Aws),
        Section::Kubernetes => matches!(provider, Provider::Generic | Provider::Kubernetes),
    })
}

/// Look up a module by its exact import path
pub fn lookup_module(path: &str) -> Option<&'static ComponentModule> {
    MODULES.iter().find(|m| m.path == path)
}

/// Is `name` an exact component of `module_path`?
pub fn is_known_component(module_path: &str, name: &str) -> bool {
    lookup_module(module_path)
        .map(|m| m.components.contains(&name))
        .unwrap_or(false)
}

/// Fuzzy lookup for a near-miss component name within a module.
///
/// Matching order: case-insensitive exact, substring either way, repeated
/// characters collapsed, then the name with its last character trimmed
/// (catches doubled trailing letters like `StepFunctionss`).
pub fn find_similar(module_path: &str, name: &str) -> Option<&'static str> {
    let module = lookup_module(module_path)?;
    let lower = name.to_lowercase();

    for c in module.components {
        if lower == c.to_lowercase() {
            return Some(c);
        }
    }

    for c in module.components {
        let cl = c.to_lowercase();
        if lower.contains(&cl) || cl.contains(&lower) {
            return Some(c);
        }
    }

    let collapsed = crate::alias::collapse_repeats(name);
    if collapsed != name {
        let collapsed_lower = collapsed.to_lowercase();
        for c in module.components {
            if collapsed_lower == c.to_lowercase() {
                return Some(c);
            }
        }
    }

    if name.len() > 2 {
        let trimmed = &lower[..lower.len() - 1];
        for c in module.components {
            if trimmed == c.to_lowercase() {
                return Some(c);
            }
        }
    }

    None
}

/// Format the vocabulary listing embedded in the system prompt
pub fn format_listing(provider: Provider) -> String {
    let mut out = String::new();
    for module in modules_for(provider) {
        out.push('\n');
        out.push_str(module.path);
        out.push_str(":\n  Available: ");
        out.push_str(&module.components.join(", "));
    }
    out
}
