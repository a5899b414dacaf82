//! Customer Category API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use http::StatusCode;

use crate::core::ServerState;
use crate::utils::AppResult;
use shared::models::{CustomerCategory, CustomerCategoryCreate, CustomerCategoryUpdate};

/// GET /api/customer-categories - active tiers
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<CustomerCategory>>> {
    Ok(Json(state.categories.find_all().await?))
}

/// GET /api/customer-categories/{id} - also resolves deactivated tiers
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<CustomerCategory>> {
    Ok(Json(state.categories.find_one(id).await?))
}

/// POST /api/customer-categories
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<CustomerCategoryCreate>,
) -> AppResult<(StatusCode, Json<CustomerCategory>)> {
    let category = state.categories.create(payload).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// PUT /api/customer-categories/{id}
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<CustomerCategoryUpdate>,
) -> AppResult<Json<CustomerCategory>> {
    Ok(Json(state.categories.update(id, payload).await?))
}

/// DELETE /api/customer-categories/{id} - soft delete
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    Ok(Json(state.categories.delete(id).await?))
}
