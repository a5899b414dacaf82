//! People API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use http::StatusCode;

use crate::core::ServerState;
use crate::utils::AppResult;
use shared::models::{People, PeopleCreate};

/// GET /api/people - newest first
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<People>>> {
    Ok(Json(state.people.find_all().await?))
}

/// GET /api/people/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<People>> {
    Ok(Json(state.people.find_one(id).await?))
}

/// POST /api/people
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<PeopleCreate>,
) -> AppResult<(StatusCode, Json<People>)> {
    let person = state.people.create(payload).await?;
    Ok((StatusCode::CREATED, Json(person)))
}
