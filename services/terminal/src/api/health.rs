//! Health check endpoints.
//!
//! These endpoints are used by load balancers and orchestration systems
//! to determine if the service is healthy and ready to receive traffic.

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;

use crate::state::AppState;

const SERVICE_NAME: &str = "terminal";

#[derive(Debug, Serialize)]
#[cfg_attr(test, derive(serde::Deserialize))]
pub struct HealthResponse {
    /// "ok" or "degraded".
    pub status: String,
    pub service: String,
    pub version: String,
    /// RFC 3339.
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<ComponentStatus>,
}

#[derive(Debug, Serialize)]
#[cfg_attr(test, derive(serde::Deserialize))]
pub struct ComponentStatus {
    /// "ok" or "unavailable".
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/livez", get(livez))
}

fn health_response(status: &str, database: Option<ComponentStatus>) -> HealthResponse {
    HealthResponse {
        status: status.to_string(),
        service: SERVICE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now().to_rfc3339(),
        database,
    }
}

/// Is the process up? Does not touch the database.
async fn healthz() -> impl IntoResponse {
    Json(health_response("ok", None))
}

/// Can the service answer yard queries? Returns 503 when Postgres is unreachable.
async fn readyz(State(state): State<AppState>) -> impl IntoResponse {
    match state.db().health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(health_response(
                "ok",
                Some(ComponentStatus {
                    status: "ok".to_string(),
                    message: None,
                }),
            )),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(health_response(
                "degraded",
                Some(ComponentStatus {
                    status: "unavailable".to_string(),
                    message: Some(e.to_string()),
                }),
            )),
        ),
    }
}

async fn livez() -> impl IntoResponse {
    StatusCode::OK
}
