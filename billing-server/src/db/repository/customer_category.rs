//! Customer Category Repository

use super::{
    CustomerCategoryRepository, RepoError, RepoResult, SqliteStore, decimal_from_text,
    decimal_to_text,
};
use async_trait::async_trait;
use shared::models::{CustomerCategory, CustomerCategoryCreate, CustomerCategoryUpdate};
use sqlx::SqlitePool;

const CATEGORY_SELECT: &str = "SELECT id, name, discount_percentage, points_multiplier, ticket_threshold, color, active, created_at, updated_at FROM customer_category";

#[derive(Debug, sqlx::FromRow)]
struct CustomerCategoryRow {
    id: i64,
    name: String,
    discount_percentage: String,
    points_multiplier: String,
    ticket_threshold: String,
    color: Option<String>,
    active: bool,
    created_at: i64,
    updated_at: i64,
}

impl TryFrom<CustomerCategoryRow> for CustomerCategory {
    type Error = RepoError;

    fn try_from(row: CustomerCategoryRow) -> RepoResult<Self> {
        Ok(Self {
            id: row.id,
            name: row.name,
            discount_percentage: decimal_from_text("discount_percentage", &row.discount_percentage)?,
            points_multiplier: decimal_from_text("points_multiplier", &row.points_multiplier)?,
            ticket_threshold: decimal_from_text("ticket_threshold", &row.ticket_threshold)?,
            color: row.color,
            active: row.active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn into_models(rows: Vec<CustomerCategoryRow>) -> RepoResult<Vec<CustomerCategory>> {
    rows.into_iter().map(CustomerCategory::try_from).collect()
}

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<CustomerCategory>> {
    let sql = format!("{CATEGORY_SELECT} WHERE active = 1 ORDER BY name ASC");
    let rows = sqlx::query_as::<_, CustomerCategoryRow>(&sql)
        .fetch_all(pool)
        .await?;
    into_models(rows)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<CustomerCategory>> {
    let sql = format!("{CATEGORY_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, CustomerCategoryRow>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    row.map(CustomerCategory::try_from).transpose()
}

pub async fn find_by_name(pool: &SqlitePool, name: &str) -> RepoResult<Option<CustomerCategory>> {
    let sql = format!("{CATEGORY_SELECT} WHERE name = ?");
    let row = sqlx::query_as::<_, CustomerCategoryRow>(&sql)
        .bind(name)
        .fetch_optional(pool)
        .await?;
    row.map(CustomerCategory::try_from).transpose()
}

pub async fn create(
    pool: &SqlitePool,
    data: &CustomerCategoryCreate,
) -> RepoResult<CustomerCategory> {
    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO customer_category (id, name, discount_percentage, points_multiplier, ticket_threshold, color, active, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
    )
    .bind(id)
    .bind(&data.name)
    .bind(decimal_to_text(data.discount_percentage))
    .bind(decimal_to_text(data.points_multiplier))
    .bind(decimal_to_text(data.ticket_threshold))
    .bind(&data.color)
    .bind(data.active.unwrap_or(true))
    .bind(now)
    .execute(pool)
    .await?;
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create customer category".into()))
}

pub async fn update(
    pool: &SqlitePool,
    id: i64,
    data: &CustomerCategoryUpdate,
) -> RepoResult<CustomerCategory> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE customer_category SET name = COALESCE(?1, name), discount_percentage = COALESCE(?2, discount_percentage), points_multiplier = COALESCE(?3, points_multiplier), ticket_threshold = COALESCE(?4, ticket_threshold), color = COALESCE(?5, color), active = COALESCE(?6, active), updated_at = ?7 WHERE id = ?8",
    )
    .bind(&data.name)
    .bind(data.discount_percentage.map(decimal_to_text))
    .bind(data.points_multiplier.map(decimal_to_text))
    .bind(data.ticket_threshold.map(decimal_to_text))
    .bind(&data.color)
    .bind(data.active)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Customer category {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Customer category {id} not found")))
}

#[async_trait]
impl CustomerCategoryRepository for SqliteStore {
    async fn find_all(&self) -> RepoResult<Vec<CustomerCategory>> {
        find_all(&self.pool).await
    }

    async fn find_by_id(&self, id: i64) -> RepoResult<Option<CustomerCategory>> {
        find_by_id(&self.pool, id).await
    }

    async fn find_by_name(&self, name: &str) -> RepoResult<Option<CustomerCategory>> {
        find_by_name(&self.pool, name).await
    }

    async fn create(&self, data: &CustomerCategoryCreate) -> RepoResult<CustomerCategory> {
        create(&self.pool, data).await
    }

    async fn update(&self, id: i64, data: &CustomerCategoryUpdate) -> RepoResult<CustomerCategory> {
        update(&self.pool, id, data).await
    }
}
