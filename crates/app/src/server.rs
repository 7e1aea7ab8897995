//! HTTP surface for the notes service.
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/reindex` | Rebuild the index, optionally from `{"notes_dir": ...}` |
//! | `POST` | `/chat` | Answer `{"question", "top_k"?}` from the notes |
//! | `GET`  | `/health` | Health check (returns version) |
//!
//! Errors are returned as `{"detail": "<message>"}`.

use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use notes_rag_core::{
    ChatModel, ChatRequest, ChatResponse, RagService, ReindexReport, ReindexRequest, ServiceError,
    VectorIndex,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info};

pub fn router<V, M>(service: Arc<RagService<V, M>>) -> Router
where
    V: VectorIndex + 'static,
    M: ChatModel + 'static,
{
    Router::new()
        .route("/reindex", post(handle_reindex::<V, M>))
        .route("/chat", post(handle_chat::<V, M>))
        .route("/health", get(handle_health))
        .with_state(service)
}

pub async fn run_server<V, M>(service: Arc<RagService<V, M>>, bind_addr: &str) -> anyhow::Result<()>
where
    V: VectorIndex + 'static,
    M: ChatModel + 'static,
{
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    info!(address = %listener.local_addr()?, "notes service listening");

    axum::serve(listener, router(service))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown requested");
        })
        .await?;

    Ok(())
}

#[derive(Serialize)]
struct ErrorBody {
    detail: String,
}

#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    fn bad_request(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            detail: detail.into(),
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(value: ServiceError) -> Self {
        let status = match &value {
            ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
            ServiceError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ServiceError::StaleIndex(_) => StatusCode::CONFLICT,
            ServiceError::Configuration(_) | ServiceError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self {
            status,
            detail: value.to_string(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(value: JsonRejection) -> Self {
        Self {
            status: value.status(),
            detail: value.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(status = %self.status, detail = %self.detail, "request failed");
        }
        (self.status, Json(ErrorBody { detail: self.detail })).into_response()
    }
}

/// An empty body, `null` and `{}` all mean "use the configured notes directory".
fn parse_reindex_body(body: &[u8]) -> Result<ReindexRequest, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(ReindexRequest::default());
    }
    serde_json::from_slice::<Option<ReindexRequest>>(body)
        .map(Option::unwrap_or_default)
        .map_err(|error| ApiError::bad_request(format!("invalid reindex body: {error}")))
}

async fn handle_reindex<V, M>(
    State(service): State<Arc<RagService<V, M>>>,
    body: Bytes,
) -> Result<Json<ReindexReport>, ApiError>
where
    V: VectorIndex,
    M: ChatModel,
{
    let request = parse_reindex_body(&body)?;
    Ok(Json(service.reindex(request).await?))
}

async fn handle_chat<V, M>(
    State(service): State<Arc<RagService<V, M>>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError>
where
    V: VectorIndex,
    M: ChatModel,
{
    let Json(request) = payload?;
    Ok(Json(service.chat(request).await?))
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
