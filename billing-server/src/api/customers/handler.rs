//! Customer API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use http::StatusCode;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::services::ReconciliationError;
use crate::utils::AppResult;
use shared::models::{
    Customer, CustomerCreate, CustomerLoyaltyHistory, CustomerUpdate, CustomerWithRelations,
    PointsPreview, PointsUpdate, RedeemRequest, Redemption,
};
use shared::util::now_millis;

#[derive(Deserialize)]
pub struct TopQuery {
    pub limit: Option<i64>,
}

#[derive(Deserialize)]
pub struct PreviewQuery {
    pub amount: Decimal,
}

/// GET /api/customers - active customers with person and category
pub async fn list(
    State(state): State<ServerState>,
) -> AppResult<Json<Vec<CustomerWithRelations>>> {
    Ok(Json(state.customers.find_all().await?))
}

/// GET /api/customers/top?limit=10
pub async fn top(
    State(state): State<ServerState>,
    Query(query): Query<TopQuery>,
) -> AppResult<Json<Vec<CustomerWithRelations>>> {
    Ok(Json(state.customers.top_customers(query.limit).await?))
}

/// GET /api/customers/people/{peopleId}
pub async fn get_by_people(
    State(state): State<ServerState>,
    Path(people_id): Path<i64>,
) -> AppResult<Json<CustomerWithRelations>> {
    Ok(Json(state.customers.find_by_people(people_id).await?))
}

/// GET /api/customers/{id} - includes the most recent ledger entries
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<CustomerWithRelations>> {
    Ok(Json(state.customers.find_one(id).await?))
}

/// POST /api/customers - 201, or 409 when the person is already a customer
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<CustomerCreate>,
) -> Result<(StatusCode, Json<Customer>), ReconciliationError> {
    let customer = state.customers.create(payload).await?;
    tracing::info!(
        customer_id = customer.id,
        operator = %user.username,
        "Customer registered"
    );
    Ok((StatusCode::CREATED, Json(customer)))
}

/// PUT /api/customers/{id}
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<CustomerUpdate>,
) -> Result<Json<CustomerWithRelations>, ReconciliationError> {
    Ok(Json(state.customers.update(id, payload).await?))
}

/// DELETE /api/customers/{id} - soft delete
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    Ok(Json(state.customers.delete(id).await?))
}

/// PUT /api/customers/{id}/points - signed delta
pub async fn update_points(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<PointsUpdate>,
) -> AppResult<Json<Customer>> {
    let customer = state.loyalty.update_points(id, payload.points).await?;
    tracing::info!(
        customer_id = id,
        delta = payload.points,
        operator = %user.username,
        "Manual point adjustment"
    );
    Ok(Json(customer))
}

/// POST /api/customers/{id}/redeem
pub async fn redeem(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<RedeemRequest>,
) -> AppResult<Json<Redemption>> {
    let redemption = state
        .loyalty
        .redeem(id, payload.reward_id, now_millis())
        .await?;
    tracing::info!(
        customer_id = id,
        reward_id = payload.reward_id,
        operator = %user.username,
        "Redemption completed"
    );
    Ok(Json(redemption))
}

/// GET /api/customers/{id}/points/preview?amount=50.00
pub async fn points_preview(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Query(query): Query<PreviewQuery>,
) -> AppResult<Json<PointsPreview>> {
    Ok(Json(state.loyalty.points_preview(id, query.amount).await?))
}

/// GET /api/customers/{id}/loyalty-history
pub async fn loyalty_history(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<CustomerLoyaltyHistory>> {
    Ok(Json(state.loyalty.loyalty_history(id).await?))
}
