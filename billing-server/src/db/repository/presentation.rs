//! Presentation Repository

use super::{
    PresentationRepository, RepoError, RepoResult, SqliteStore, decimal_from_text,
    decimal_to_text, optional_decimal_from_text,
};
use crate::loyalty::apply_delta;
use async_trait::async_trait;
use shared::models::{Presentation, PresentationCreate, PresentationUpdate};
use sqlx::SqlitePool;

/// Balance resource name carried by `RepoError::InsufficientBalance`
pub const RESOURCE: &str = "presentation";

const PRESENTATION_SELECT: &str = "SELECT id, product_id, name, barcode, quantity, cost_price, last_cost_price, average_cost_price, sale_price, stock, min_stock, max_stock, active, created_at, updated_at FROM presentation";

#[derive(Debug, sqlx::FromRow)]
struct PresentationRow {
    id: i64,
    product_id: i64,
    name: String,
    barcode: String,
    quantity: i64,
    cost_price: String,
    last_cost_price: Option<String>,
    average_cost_price: Option<String>,
    sale_price: String,
    stock: i64,
    min_stock: i64,
    max_stock: Option<i64>,
    active: bool,
    created_at: i64,
    updated_at: i64,
}

impl TryFrom<PresentationRow> for Presentation {
    type Error = RepoError;

    fn try_from(row: PresentationRow) -> RepoResult<Self> {
        Ok(Self {
            id: row.id,
            product_id: row.product_id,
            name: row.name,
            barcode: row.barcode,
            quantity: row.quantity,
            cost_price: decimal_from_text("cost_price", &row.cost_price)?,
            last_cost_price: optional_decimal_from_text(
                "last_cost_price",
                row.last_cost_price.as_deref(),
            )?,
            average_cost_price: optional_decimal_from_text(
                "average_cost_price",
                row.average_cost_price.as_deref(),
            )?,
            sale_price: decimal_from_text("sale_price", &row.sale_price)?,
            stock: row.stock,
            min_stock: row.min_stock,
            max_stock: row.max_stock,
            active: row.active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn into_models(rows: Vec<PresentationRow>) -> RepoResult<Vec<Presentation>> {
    rows.into_iter().map(Presentation::try_from).collect()
}

pub async fn find_by_product(pool: &SqlitePool, product_id: i64) -> RepoResult<Vec<Presentation>> {
    let sql = format!("{PRESENTATION_SELECT} WHERE product_id = ? AND active = 1 ORDER BY name ASC");
    let rows = sqlx::query_as::<_, PresentationRow>(&sql)
        .bind(product_id)
        .fetch_all(pool)
        .await?;
    into_models(rows)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Presentation>> {
    let sql = format!("{PRESENTATION_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, PresentationRow>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    row.map(Presentation::try_from).transpose()
}

pub async fn find_by_barcode(pool: &SqlitePool, barcode: &str) -> RepoResult<Option<Presentation>> {
    let sql = format!("{PRESENTATION_SELECT} WHERE barcode = ?");
    let row = sqlx::query_as::<_, PresentationRow>(&sql)
        .bind(barcode)
        .fetch_optional(pool)
        .await?;
    row.map(Presentation::try_from).transpose()
}

pub async fn find_low_stock(pool: &SqlitePool) -> RepoResult<Vec<Presentation>> {
    let sql = format!("{PRESENTATION_SELECT} WHERE active = 1 AND stock <= min_stock ORDER BY stock ASC");
    let rows = sqlx::query_as::<_, PresentationRow>(&sql)
        .fetch_all(pool)
        .await?;
    into_models(rows)
}

pub async fn create(pool: &SqlitePool, data: &PresentationCreate) -> RepoResult<Presentation> {
    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO presentation (id, product_id, name, barcode, quantity, cost_price, last_cost_price, average_cost_price, sale_price, stock, min_stock, max_stock, active, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?14)",
    )
    .bind(id)
    .bind(data.product_id)
    .bind(&data.name)
    .bind(&data.barcode)
    .bind(data.quantity.unwrap_or(1))
    .bind(decimal_to_text(data.cost_price))
    .bind(data.last_cost_price.map(decimal_to_text))
    .bind(data.average_cost_price.map(decimal_to_text))
    .bind(decimal_to_text(data.sale_price))
    .bind(data.stock.unwrap_or(0))
    .bind(data.min_stock.unwrap_or(0))
    .bind(data.max_stock)
    .bind(data.active.unwrap_or(true))
    .bind(now)
    .execute(pool)
    .await?;
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create presentation".into()))
}

pub async fn update(
    pool: &SqlitePool,
    id: i64,
    data: &PresentationUpdate,
) -> RepoResult<Presentation> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE presentation SET name = COALESCE(?1, name), quantity = COALESCE(?2, quantity), cost_price = COALESCE(?3, cost_price), last_cost_price = COALESCE(?4, last_cost_price), average_cost_price = COALESCE(?5, average_cost_price), sale_price = COALESCE(?6, sale_price), min_stock = COALESCE(?7, min_stock), max_stock = COALESCE(?8, max_stock), active = COALESCE(?9, active), updated_at = ?10 WHERE id = ?11",
    )
    .bind(&data.name)
    .bind(data.quantity)
    .bind(data.cost_price.map(decimal_to_text))
    .bind(data.last_cost_price.map(decimal_to_text))
    .bind(data.average_cost_price.map(decimal_to_text))
    .bind(data.sale_price.map(decimal_to_text))
    .bind(data.min_stock)
    .bind(data.max_stock)
    .bind(data.active)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Presentation {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Presentation {id} not found")))
}

/// Read, check, then write with a conditional UPDATE so a concurrent change
/// can never push stock below zero.
pub async fn adjust_stock(pool: &SqlitePool, id: i64, delta: i64) -> RepoResult<Presentation> {
    let current = find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Presentation {id} not found")))?;
    apply_delta(current.stock, delta).map_err(|e| RepoError::from_balance(RESOURCE, e))?;

    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE presentation SET stock = stock + ?1, updated_at = ?2 WHERE id = ?3 AND stock + ?1 >= 0",
    )
    .bind(delta)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        let latest = find_by_id(pool, id).await?.map_or(0, |p| p.stock);
        return Err(RepoError::InsufficientBalance {
            resource: RESOURCE,
            current: latest,
            requested: delta,
        });
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Presentation {id} not found")))
}

#[async_trait]
impl PresentationRepository for SqliteStore {
    async fn find_by_product(&self, product_id: i64) -> RepoResult<Vec<Presentation>> {
        find_by_product(&self.pool, product_id).await
    }

    async fn find_by_id(&self, id: i64) -> RepoResult<Option<Presentation>> {
        find_by_id(&self.pool, id).await
    }

    async fn find_by_barcode(&self, barcode: &str) -> RepoResult<Option<Presentation>> {
        find_by_barcode(&self.pool, barcode).await
    }

    async fn find_low_stock(&self) -> RepoResult<Vec<Presentation>> {
        find_low_stock(&self.pool).await
    }

    async fn create(&self, data: &PresentationCreate) -> RepoResult<Presentation> {
        create(&self.pool, data).await
    }

    async fn update(&self, id: i64, data: &PresentationUpdate) -> RepoResult<Presentation> {
        update(&self.pool, id, data).await
    }

    async fn adjust_stock(&self, id: i64, delta: i64) -> RepoResult<Presentation> {
        adjust_stock(&self.pool, id, delta).await
    }
}
