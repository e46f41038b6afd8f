//! HTTP frontend adapter
//!
//! Thin axum surface over the diagram service. The transport does no
//! pipeline work of its own: a submission is forwarded to the service, and
//! whatever view comes back - success or error - is serialized as a 200.
//! Only transport-level problems (unknown artifact, unreadable file) map to
//! HTTP error codes.

use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use uuid::Uuid;

use archigram_service::{example_prompts, SessionEntry, SharedService};
use diagram_catalog::Provider;
use generation::DiagramRequest;

/// Body of `POST /api/diagrams`
#[derive(Debug, Deserialize)]
pub struct SubmitBody {
    /// Omitted on the first call; the response returns the session to reuse
    pub session_id: Option<Uuid>,
    pub description: String,
    #[serde(default)]
    pub provider: Provider,
}

/// Response of `POST /api/diagrams`
#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub session_id: Uuid,
    #[serde(flatten)]
    pub entry: SessionEntry,
}

/// Build the full router over a shared service
pub fn router(service: SharedService) -> Router {
    Router::new()
        .route("/api/diagrams", post(submit))
        .route("/api/diagrams/:session_id/:entry_id/image", get(image))
        .route("/api/sessions/:session_id/history", get(history))
        .route("/api/examples", get(examples))
        .route("/api/health", get(health))
        .layer(CorsLayer::permissive())
        .with_state(service)
}

/// `POST /api/diagrams` - run one description through the pipeline
async fn submit(
    State(service): State<SharedService>,
    Json(body): Json<SubmitBody>,
) -> Json<SubmitResponse> {
    let session_id = body.session_id.unwrap_or_else(Uuid::new_v4);
    let request = DiagramRequest::new(body.description, body.provider);
    let entry = service.submit(session_id, request).await;
    Json(SubmitResponse { session_id, entry })
}

/// `GET /api/diagrams/{session}/{entry}/image` - the rendered artifact
async fn image(
    State(service): State<SharedService>,
    Path((session_id, entry_id)): Path<(Uuid, Uuid)>,
) -> Response {
    let Some(path) = service.artifact(session_id, entry_id).await else {
        return StatusCode::NOT_FOUND.into_response();
    };

    match tokio::fs::read(&path).await {
        Ok(bytes) => ([(header::CONTENT_TYPE, "image/png")], bytes).into_response(),
        Err(err) => {
            log::error!("artifact {} unreadable: {}", path.display(), err);
            StatusCode::NOT_FOUND.into_response()
        }
    }
}

/// `GET /api/sessions/{session}/history` - past submissions, oldest first
async fn history(
    State(service): State<SharedService>,
    Path(session_id): Path<Uuid>,
) -> Json<Vec<SessionEntry>> {
    Json(service.history(session_id).await)
}

/// `GET /api/examples` - ready-made prompts for the UI
async fn examples() -> impl IntoResponse {
    Json(example_prompts())
}

/// Health payload for `GET /api/health`
#[derive(Debug, Serialize)]
struct HealthResponse {
    backend: &'static str,
    healthy: bool,
}

async fn health(State(service): State<SharedService>) -> Json<HealthResponse> {
    Json(HealthResponse {
        backend: service.backend_name(),
        healthy: service.healthy().await,
    })
}
