//! API routes
//!
//! - [`health`] - liveness (public)
//! - [`people`] - person registry
//! - [`customers`] - customers, points and redemption
//! - [`customer_categories`] - discount tiers
//! - [`rewards`] - reward catalog
//! - [`presentations`] - presentation inventory
//!
//! Every route under `/api/` requires a bearer token; write routes also
//! require a permission (see [`crate::auth::permissions`]).

pub mod customer_categories;
pub mod customers;
pub mod health;
pub mod people;
pub mod presentations;
pub mod rewards;

use std::time::Duration;

use axum::{Router, middleware};
use http::{HeaderName, HeaderValue, StatusCode};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::auth::require_auth;
use crate::core::ServerState;

// Re-export common types for handlers
pub use crate::utils::{AppError, AppResult};

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Snowflake request ids, same generator as row ids
#[derive(Clone)]
struct SnowflakeRequestId;

impl MakeRequestId for SnowflakeRequestId {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&shared::util::snowflake_id().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// HTTP request log middleware
async fn log_request(
    request: http::Request<axum::body::Body>,
    next: middleware::Next,
) -> http::Response<axum::body::Body> {
    let method = request.method().clone();
    let uri = request.uri().clone();

    let response = next.run(request).await;

    let status = response.status();

    tracing::info!(target: "http_access", "{} {} {}", method, uri, status);

    response
}

/// `*` allows any origin; anything else is an exact origin
fn cors_layer(origin: &str) -> CorsLayer {
    if origin == "*" {
        return CorsLayer::permissive();
    }
    let allow = match HeaderValue::from_str(origin) {
        Ok(value) => AllowOrigin::exact(value),
        Err(_) => {
            tracing::warn!(origin, "Invalid CORS_ORIGIN, cross-origin requests disabled");
            AllowOrigin::list(Vec::<HeaderValue>::new())
        }
    };
    CorsLayer::new()
        .allow_origin(allow)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Build a router with all routes registered (no middleware, no state)
pub fn build_router() -> Router<ServerState> {
    Router::new()
        // Public
        .merge(health::router())
        // Authenticated
        .merge(people::router())
        .merge(customers::router())
        .merge(customer_categories::router())
        .merge(rewards::router())
        .merge(presentations::router())
}

/// Fully configured application with middleware and state
///
/// Used by the HTTP server and by tests through `oneshot`.
pub fn build_app(state: ServerState) -> Router {
    let timeout = Duration::from_millis(state.config.request_timeout_ms);
    let cors = cors_layer(&state.config.cors_origin);
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    build_router()
        // JWT authentication; skips public routes internally
        .layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .with_state(state)
        .layer(TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, timeout))
        .layer(cors)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(SetRequestIdLayer::new(request_id, SnowflakeRequestId))
        // Request logging, outermost
        .layer(middleware::from_fn(log_request))
}
