//! Reward API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use http::StatusCode;

use crate::core::ServerState;
use crate::utils::AppResult;
use shared::models::{Reward, RewardCreate, RewardUpdate, StockUpdate};
use shared::util::now_millis;

/// GET /api/rewards - active rewards, cheapest first
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Reward>>> {
    Ok(Json(state.rewards.find_all().await?))
}

/// GET /api/rewards/available - redeemable right now
pub async fn available(State(state): State<ServerState>) -> AppResult<Json<Vec<Reward>>> {
    Ok(Json(state.rewards.find_available(now_millis()).await?))
}

/// GET /api/rewards/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Reward>> {
    Ok(Json(state.rewards.find_one(id).await?))
}

/// POST /api/rewards
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<RewardCreate>,
) -> AppResult<(StatusCode, Json<Reward>)> {
    let reward = state.rewards.create(payload).await?;
    Ok((StatusCode::CREATED, Json(reward)))
}

/// PUT /api/rewards/{id}
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<RewardUpdate>,
) -> AppResult<Json<Reward>> {
    Ok(Json(state.rewards.update(id, payload).await?))
}

/// DELETE /api/rewards/{id} - soft delete
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    Ok(Json(state.rewards.delete(id).await?))
}

/// PUT /api/rewards/{id}/stock - signed delta
pub async fn update_stock(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<StockUpdate>,
) -> AppResult<Json<Reward>> {
    Ok(Json(state.rewards.update_stock(id, payload).await?))
}
