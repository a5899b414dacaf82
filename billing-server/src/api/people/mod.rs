//! People API

mod handler;

use axum::{Router, middleware, routing::get, routing::post};

use crate::auth::permissions::CUSTOMERS_MANAGE;
use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/people", routes())
}

fn routes() -> Router<ServerState> {
    let read_routes = Router::new()
        .route("/", get(handler::list))
        .route("/{id}", get(handler::get_by_id));

    let manage_routes = Router::new()
        .route("/", post(handler::create))
        .layer(middleware::from_fn(require_permission(CUSTOMERS_MANAGE)));

    read_routes.merge(manage_routes)
}
