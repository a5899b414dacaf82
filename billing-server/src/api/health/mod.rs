//! Liveness and readiness, both public
//!
//! `GET /health` answers as long as the process serves requests;
//! `GET /health/ready` also reads from the store and returns 503 when that fails.

use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use serde::Serialize;

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(ready))
}

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    environment: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    database: Option<&'static str>,
}

impl HealthResponse {
    fn new(state: &ServerState, status: &'static str) -> Self {
        Self {
            status,
            version: env!("CARGO_PKG_VERSION"),
            environment: state.config.environment.clone(),
            database: None,
        }
    }
}

pub async fn health(State(state): State<ServerState>) -> Json<HealthResponse> {
    Json(HealthResponse::new(&state, "ok"))
}

pub async fn ready(State(state): State<ServerState>) -> (StatusCode, Json<HealthResponse>) {
    match state.repos.categories.find_all().await {
        Ok(_) => {
            let mut body = HealthResponse::new(&state, "ok");
            body.database = Some("ok");
            (StatusCode::OK, Json(body))
        }
        Err(e) => {
            tracing::error!(error = %e, "Readiness check failed");
            let mut body = HealthResponse::new(&state, "error");
            body.database = Some("unreachable");
            (StatusCode::SERVICE_UNAVAILABLE, Json(body))
        }
    }
}
