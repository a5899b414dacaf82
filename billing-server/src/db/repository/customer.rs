//! Customer Repository

use super::{
    CustomerRepository, NewCustomer, RepoError, RepoResult, SqliteStore, decimal_from_text,
};
use async_trait::async_trait;
use shared::models::{Customer, CustomerUpdate};
use sqlx::SqlitePool;

/// Balance resource name carried by `RepoError::InsufficientBalance`
pub const RESOURCE: &str = "customer";

pub(crate) const CUSTOMER_SELECT: &str = "SELECT id, people_id, customer_category_id, loyalty_points, total_purchases, last_purchase_date, preferred_payment_method, active, created_at, updated_at FROM customer";

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct CustomerRow {
    id: i64,
    people_id: i64,
    customer_category_id: i64,
    loyalty_points: i64,
    total_purchases: String,
    last_purchase_date: Option<i64>,
    preferred_payment_method: Option<String>,
    active: bool,
    created_at: i64,
    updated_at: i64,
}

impl TryFrom<CustomerRow> for Customer {
    type Error = RepoError;

    fn try_from(row: CustomerRow) -> RepoResult<Self> {
        Ok(Self {
            id: row.id,
            people_id: row.people_id,
            customer_category_id: row.customer_category_id,
            loyalty_points: row.loyalty_points,
            total_purchases: decimal_from_text("total_purchases", &row.total_purchases)?,
            last_purchase_date: row.last_purchase_date,
            preferred_payment_method: row.preferred_payment_method,
            active: row.active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn into_models(rows: Vec<CustomerRow>) -> RepoResult<Vec<Customer>> {
    rows.into_iter().map(Customer::try_from).collect()
}

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Customer>> {
    let sql = format!("{CUSTOMER_SELECT} WHERE active = 1 ORDER BY created_at DESC");
    let rows = sqlx::query_as::<_, CustomerRow>(&sql).fetch_all(pool).await?;
    into_models(rows)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Customer>> {
    let sql = format!("{CUSTOMER_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, CustomerRow>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    row.map(Customer::try_from).transpose()
}

pub async fn find_by_people(pool: &SqlitePool, people_id: i64) -> RepoResult<Option<Customer>> {
    let sql = format!("{CUSTOMER_SELECT} WHERE people_id = ?");
    let row = sqlx::query_as::<_, CustomerRow>(&sql)
        .bind(people_id)
        .fetch_optional(pool)
        .await?;
    row.map(Customer::try_from).transpose()
}

pub async fn top_by_purchases(pool: &SqlitePool, limit: i64) -> RepoResult<Vec<Customer>> {
    let sql = format!(
        "{CUSTOMER_SELECT} WHERE active = 1 ORDER BY CAST(total_purchases AS REAL) DESC, created_at ASC LIMIT ?"
    );
    let rows = sqlx::query_as::<_, CustomerRow>(&sql)
        .bind(limit)
        .fetch_all(pool)
        .await?;
    into_models(rows)
}

pub async fn create(pool: &SqlitePool, data: &NewCustomer) -> RepoResult<Customer> {
    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO customer (id, people_id, customer_category_id, loyalty_points, total_purchases, last_purchase_date, preferred_payment_method, active, created_at, updated_at) VALUES (?1, ?2, ?3, 0, '0', NULL, ?4, 1, ?5, ?5)",
    )
    .bind(id)
    .bind(data.people_id)
    .bind(data.customer_category_id)
    .bind(&data.preferred_payment_method)
    .bind(now)
    .execute(pool)
    .await?;
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create customer".into()))
}

pub async fn update(pool: &SqlitePool, id: i64, data: &CustomerUpdate) -> RepoResult<Customer> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE customer SET customer_category_id = COALESCE(?1, customer_category_id), preferred_payment_method = COALESCE(?2, preferred_payment_method), active = COALESCE(?3, active), updated_at = ?4 WHERE id = ?5",
    )
    .bind(data.customer_category_id)
    .bind(&data.preferred_payment_method)
    .bind(data.active)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Customer {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Customer {id} not found")))
}

#[async_trait]
impl CustomerRepository for SqliteStore {
    async fn find_all(&self) -> RepoResult<Vec<Customer>> {
        find_all(&self.pool).await
    }

    async fn find_by_id(&self, id: i64) -> RepoResult<Option<Customer>> {
        find_by_id(&self.pool, id).await
    }

    async fn find_by_people(&self, people_id: i64) -> RepoResult<Option<Customer>> {
        find_by_people(&self.pool, people_id).await
    }

    async fn top_by_purchases(&self, limit: i64) -> RepoResult<Vec<Customer>> {
        top_by_purchases(&self.pool, limit).await
    }

    async fn create(&self, data: &NewCustomer) -> RepoResult<Customer> {
        create(&self.pool, data).await
    }

    async fn update(&self, id: i64, data: &CustomerUpdate) -> RepoResult<Customer> {
        update(&self.pool, id, data).await
    }
}
