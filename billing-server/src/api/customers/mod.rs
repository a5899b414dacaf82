//! Customer API
//!
//! | path | method | permission |
//! |------|--------|------------|
//! | /api/customers | GET | - |
//! | /api/customers | POST | customers:manage |
//! | /api/customers/top?limit= | GET | - |
//! | /api/customers/people/{peopleId} | GET | - |
//! | /api/customers/{id} | GET | - |
//! | /api/customers/{id} | PUT, DELETE | customers:manage |
//! | /api/customers/{id}/points | PUT | customers:manage |
//! | /api/customers/{id}/redeem | POST | customers:manage |
//! | /api/customers/{id}/points/preview?amount= | GET | - |
//! | /api/customers/{id}/loyalty-history | GET | - |

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use crate::auth::permissions::CUSTOMERS_MANAGE;
use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/customers", routes())
}

fn routes() -> Router<ServerState> {
    let read_routes = Router::new()
        .route("/", get(handler::list))
        .route("/top", get(handler::top))
        .route("/people/{people_id}", get(handler::get_by_people))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/points/preview", get(handler::points_preview))
        .route("/{id}/loyalty-history", get(handler::loyalty_history));

    let manage_routes = Router::new()
        .route("/", post(handler::create))
        .route("/{id}", put(handler::update).delete(handler::delete))
        .route("/{id}/points", put(handler::update_points))
        .route("/{id}/redeem", post(handler::redeem))
        .layer(middleware::from_fn(require_permission(CUSTOMERS_MANAGE)));

    read_routes.merge(manage_routes)
}
