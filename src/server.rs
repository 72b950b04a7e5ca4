//! HTTP surface.
//!
//! Routes the hosting framework wires in front of the completion service:
//!
//! - `POST /method/generate`: `{"prompt": text}` returns `{"answer": text}`;
//!   optional `criteria`/`target_words` members engage the shaping pipeline
//! - `GET /method/model`: `{"model": text}`, the resolved model id
//! - `GET /`: liveness probe
//!
//! Request-signature verification and rate limiting happen upstream; this
//! layer sees only decoded request bodies. Failures surface as
//! `{"error": text}` with the error's mapped status, default 500, and never
//! expose anything beyond the message text.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::error::CompletionError;
use crate::service::CompletionService;
use crate::shaping::ShapingCriteria;

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub prompt: String,
    #[serde(default)]
    pub criteria: Option<ShapingCriteria>,
    #[serde(default)]
    pub target_words: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub answer: String,
}

#[derive(Debug, Serialize)]
pub struct ModelResponse {
    pub model: String,
}

/// Error wrapper carrying the mapped HTTP status into the response.
struct ApiError(CompletionError);

impl From<CompletionError> for ApiError {
    fn from(err: CompletionError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        tracing::warn!(status = %status, error = %self.0, "request failed");
        (status, Json(serde_json::json!({ "error": self.0.to_string() }))).into_response()
    }
}

/// Build the node's router around one completion service.
pub fn router(service: Arc<CompletionService>) -> Router {
    Router::new()
        .route("/method/generate", post(generate))
        .route("/method/model", get(model))
        .route("/", get(live))
        .with_state(service)
}

async fn generate(
    State(service): State<Arc<CompletionService>>,
    Json(request): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>, ApiError> {
    let answer = match request.criteria {
        Some(criteria) => {
            service
                .generate_shaped(&request.prompt, &criteria, request.target_words)
                .await?
        }
        None => service.generate(&request.prompt).await?,
    };
    Ok(Json(GenerateResponse { answer }))
}

async fn model(State(service): State<Arc<CompletionService>>) -> Json<ModelResponse> {
    Json(ModelResponse {
        model: service.describe_model(),
    })
}

async fn live() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
