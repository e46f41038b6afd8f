//! Diagram service - the submit pipeline and session state
//!
//! One submission runs the whole pipeline sequentially: prompt → generate →
//! extract → repair → execute → present. Every component failure becomes a
//! displayable view before it leaves this module; an AI-client failure
//! short-circuits before extraction, exactly as the error taxonomy demands.
//!
//! Sessions never share mutable state: each session has its own history and
//! its own artifact directory, and each submission writes to a fresh
//! Uuid-named artifact path, so concurrent users cannot overwrite one
//! another's renders.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use uuid::Uuid;

use generation::{
    build_prompt, extract_code, BackendSettings, DiagramRequest, GeneratedCode, GenerationError,
    GenerationGateway, SharedGateway,
};
use sandbox::{repair_source, SandboxRunner};

use crate::config::AppConfig;
use crate::view::DiagramView;

/// One completed submission in a session's history
#[derive(Debug, Clone, Serialize)]
pub struct SessionEntry {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub view: DiagramView,
}

/// Construction-time failures. Once built, the service never returns an
/// error from `submit` - outcomes are views.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("backend setup failed: {0}")]
    Backend(#[from] GenerationError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Host-agnostic diagram service
pub struct DiagramService {
    gateway: SharedGateway,
    runner: SandboxRunner,
    artifacts_dir: PathBuf,
    sessions: RwLock<HashMap<Uuid, Vec<SessionEntry>>>,
}

impl DiagramService {
    /// Create a service over an already-built gateway and runner
    pub fn new(gateway: SharedGateway, runner: SandboxRunner, artifacts_dir: PathBuf) -> Self {
        Self {
            gateway,
            runner,
            artifacts_dir,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Build the whole stack from configuration
    pub fn from_config(config: &AppConfig) -> Result<Self, ServiceError> {
        let settings = BackendSettings {
            api_key: config.resolved_api_key(),
            model: config.model.clone(),
            base_url: config.base_url.clone(),
        };
        let gateway =
            GenerationGateway::from_registry(&config.backend, &settings, config.retry.clone())?;
        let runner = SandboxRunner::new(config.sandbox.clone());
        let artifacts_dir = config
            .artifacts_dir
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("archigram-artifacts"));

        Ok(Self::new(Arc::new(gateway), runner, artifacts_dir))
    }

    /// Name of the active generation backend
    pub fn backend_name(&self) -> &'static str {
        self.gateway.backend_name()
    }

    /// Is the generation backend reachable and credentialed?
    pub async fn healthy(&self) -> bool {
        self.gateway.health_check().await
    }

    /// The single inbound operation: run one description through the
    /// pipeline. The returned entry wraps the displayable view (produced on
    /// both branches) with the identity a caller needs to reference the
    /// artifact later.
    pub async fn submit(&self, session_id: Uuid, request: DiagramRequest) -> SessionEntry {
        let entry_id = Uuid::new_v4();
        let view = self.run_pipeline(session_id, entry_id, &request).await;

        let entry = SessionEntry {
            id: entry_id,
            created_at: Utc::now(),
            view,
        };
        self.sessions
            .write()
            .await
            .entry(session_id)
            .or_default()
            .push(entry.clone());

        entry
    }

    async fn run_pipeline(
        &self,
        session_id: Uuid,
        entry_id: Uuid,
        request: &DiagramRequest,
    ) -> DiagramView {
        if request.description.trim().is_empty() {
            return DiagramView::invalid_request("description must not be empty");
        }

        let prompt = build_prompt(request);
        log::debug!(
            "session {}: submitting {} char description (provider {})",
            session_id,
            request.description.len(),
            request.provider.as_str()
        );

        let raw = match self.gateway.generate(&prompt).await {
            Ok(raw) => raw,
            Err(err) => {
                // Short-circuit: the extractor and the sandbox never run
                log::warn!("session {}: generation failed: {}", session_id, err);
                return DiagramView::from_generation_error(&err);
            }
        };

        let code = match extract_code(&raw) {
            Ok(code) => code,
            Err(err) => {
                log::warn!("session {}: extraction failed: {}", session_id, err);
                return DiagramView::from_extract_error(&err);
            }
        };

        let (repaired, fixes) = repair_source(&code.source);
        let code = GeneratedCode::new(repaired);

        let artifact_path = self.artifact_path(session_id, entry_id);
        let result = self.runner.execute(&code.source, &artifact_path).await;

        DiagramView::present(result, &code, fixes)
    }

    /// Artifact location for one submission: per-session directory,
    /// per-request file name.
    fn artifact_path(&self, session_id: Uuid, entry_id: Uuid) -> PathBuf {
        self.artifacts_dir
            .join(session_id.to_string())
            .join(format!("{}.png", entry_id))
    }

    /// A session's history, oldest first. Unknown sessions have empty
    /// history.
    pub async fn history(&self, session_id: Uuid) -> Vec<SessionEntry> {
        self.sessions
            .read()
            .await
            .get(&session_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Path of a successfully rendered artifact, if that entry exists and
    /// succeeded.
    pub async fn artifact(&self, session_id: Uuid, entry_id: Uuid) -> Option<PathBuf> {
        let sessions = self.sessions.read().await;
        let entries = sessions.get(&session_id)?;
        entries.iter().find(|e| e.id == entry_id).and_then(|entry| {
            match &entry.view {
                DiagramView::Success { image_path, .. } => Some(image_path.clone()),
                DiagramView::Error { .. } => None,
            }
        })
    }
}

/// Shared service type for application state
pub type SharedService = Arc<DiagramService>;
