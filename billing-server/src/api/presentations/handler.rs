//! Presentation API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use http::StatusCode;
use serde::Deserialize;

use crate::core::ServerState;
use crate::utils::AppResult;
use shared::models::{Presentation, PresentationCreate, PresentationUpdate, StockUpdate};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductQuery {
    pub product_id: i64,
}

/// GET /api/presentations?productId=1
pub async fn list_by_product(
    State(state): State<ServerState>,
    Query(query): Query<ProductQuery>,
) -> AppResult<Json<Vec<Presentation>>> {
    Ok(Json(state.presentations.find_by_product(query.product_id).await?))
}

/// GET /api/presentations/low-stock
pub async fn low_stock(State(state): State<ServerState>) -> AppResult<Json<Vec<Presentation>>> {
    Ok(Json(state.presentations.low_stock().await?))
}

/// GET /api/presentations/barcode/{barcode}
pub async fn get_by_barcode(
    State(state): State<ServerState>,
    Path(barcode): Path<String>,
) -> AppResult<Json<Presentation>> {
    Ok(Json(state.presentations.find_by_barcode(&barcode).await?))
}

/// GET /api/presentations/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Presentation>> {
    Ok(Json(state.presentations.find_one(id).await?))
}

/// POST /api/presentations
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<PresentationCreate>,
) -> AppResult<(StatusCode, Json<Presentation>)> {
    let presentation = state.presentations.create(payload).await?;
    Ok((StatusCode::CREATED, Json(presentation)))
}

/// PUT /api/presentations/{id}
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<PresentationUpdate>,
) -> AppResult<Json<Presentation>> {
    Ok(Json(state.presentations.update(id, payload).await?))
}

/// DELETE /api/presentations/{id} - soft delete
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    Ok(Json(state.presentations.delete(id).await?))
}

/// PUT /api/presentations/{id}/stock - signed delta
pub async fn update_stock(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<StockUpdate>,
) -> AppResult<Json<Presentation>> {
    Ok(Json(state.presentations.update_stock(id, payload).await?))
}
