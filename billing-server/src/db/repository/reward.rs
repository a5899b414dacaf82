//! Reward Repository

use super::{
    RepoError, RepoResult, RewardRepository, SqliteStore, decimal_to_text,
    optional_decimal_from_text,
};
use crate::loyalty::apply_delta;
use async_trait::async_trait;
use shared::models::{Reward, RewardCreate, RewardType, RewardUpdate};
use sqlx::SqlitePool;

/// Balance resource name carried by `RepoError::InsufficientBalance`
pub const RESOURCE: &str = "reward";

pub(crate) const REWARD_SELECT: &str = "SELECT id, name, description, reward_type, points_cost, discount_value, presentation_id, stock, valid_from, valid_until, image_url, terms, active, created_at, updated_at FROM reward";

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct RewardRow {
    id: i64,
    name: String,
    description: Option<String>,
    reward_type: RewardType,
    points_cost: i64,
    discount_value: Option<String>,
    presentation_id: Option<i64>,
    stock: i64,
    valid_from: Option<i64>,
    valid_until: Option<i64>,
    image_url: Option<String>,
    terms: Option<String>,
    active: bool,
    created_at: i64,
    updated_at: i64,
}

impl TryFrom<RewardRow> for Reward {
    type Error = RepoError;

    fn try_from(row: RewardRow) -> RepoResult<Self> {
        Ok(Self {
            id: row.id,
            name: row.name,
            description: row.description,
            reward_type: row.reward_type,
            points_cost: row.points_cost,
            discount_value: optional_decimal_from_text(
                "discount_value",
                row.discount_value.as_deref(),
            )?,
            presentation_id: row.presentation_id,
            stock: row.stock,
            valid_from: row.valid_from,
            valid_until: row.valid_until,
            image_url: row.image_url,
            terms: row.terms,
            active: row.active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn into_models(rows: Vec<RewardRow>) -> RepoResult<Vec<Reward>> {
    rows.into_iter().map(Reward::try_from).collect()
}

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Reward>> {
    let sql = format!("{REWARD_SELECT} WHERE active = 1 ORDER BY points_cost ASC");
    let rows = sqlx::query_as::<_, RewardRow>(&sql).fetch_all(pool).await?;
    into_models(rows)
}

pub async fn find_available(pool: &SqlitePool, now: i64) -> RepoResult<Vec<Reward>> {
    let sql = format!(
        "{REWARD_SELECT} WHERE active = 1 AND (valid_from IS NULL OR valid_from <= ?1) AND (valid_until IS NULL OR valid_until >= ?1) ORDER BY points_cost ASC"
    );
    let rows = sqlx::query_as::<_, RewardRow>(&sql)
        .bind(now)
        .fetch_all(pool)
        .await?;
    into_models(rows)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Reward>> {
    let sql = format!("{REWARD_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, RewardRow>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    row.map(Reward::try_from).transpose()
}

pub async fn create(pool: &SqlitePool, data: &RewardCreate) -> RepoResult<Reward> {
    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO reward (id, name, description, reward_type, points_cost, discount_value, presentation_id, stock, valid_from, valid_until, image_url, terms, active, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?14)",
    )
    .bind(id)
    .bind(&data.name)
    .bind(&data.description)
    .bind(data.reward_type)
    .bind(data.points_cost)
    .bind(data.discount_value.map(decimal_to_text))
    .bind(data.presentation_id)
    .bind(data.stock.unwrap_or(0))
    .bind(data.valid_from)
    .bind(data.valid_until)
    .bind(&data.image_url)
    .bind(&data.terms)
    .bind(data.active.unwrap_or(true))
    .bind(now)
    .execute(pool)
    .await?;
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create reward".into()))
}

pub async fn update(pool: &SqlitePool, id: i64, data: &RewardUpdate) -> RepoResult<Reward> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE reward SET name = COALESCE(?1, name), description = COALESCE(?2, description), reward_type = COALESCE(?3, reward_type), points_cost = COALESCE(?4, points_cost), discount_value = COALESCE(?5, discount_value), presentation_id = COALESCE(?6, presentation_id), stock = COALESCE(?7, stock), valid_from = COALESCE(?8, valid_from), valid_until = COALESCE(?9, valid_until), image_url = COALESCE(?10, image_url), terms = COALESCE(?11, terms), active = COALESCE(?12, active), updated_at = ?13 WHERE id = ?14",
    )
    .bind(&data.name)
    .bind(&data.description)
    .bind(data.reward_type)
    .bind(data.points_cost)
    .bind(data.discount_value.map(decimal_to_text))
    .bind(data.presentation_id)
    .bind(data.stock)
    .bind(data.valid_from)
    .bind(data.valid_until)
    .bind(&data.image_url)
    .bind(&data.terms)
    .bind(data.active)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Reward {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Reward {id} not found")))
}

/// Read, check, then write with a conditional UPDATE so a concurrent change
/// can never push stock below zero.
pub async fn adjust_stock(pool: &SqlitePool, id: i64, delta: i64) -> RepoResult<Reward> {
    let current = find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Reward {id} not found")))?;
    apply_delta(current.stock, delta).map_err(|e| RepoError::from_balance(RESOURCE, e))?;

    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE reward SET stock = stock + ?1, updated_at = ?2 WHERE id = ?3 AND stock + ?1 >= 0",
    )
    .bind(delta)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        let latest = find_by_id(pool, id).await?.map_or(0, |r| r.stock);
        return Err(RepoError::InsufficientBalance {
            resource: RESOURCE,
            current: latest,
            requested: delta,
        });
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Reward {id} not found")))
}

#[async_trait]
impl RewardRepository for SqliteStore {
    async fn find_all(&self) -> RepoResult<Vec<Reward>> {
        find_all(&self.pool).await
    }

    async fn find_available(&self, now: i64) -> RepoResult<Vec<Reward>> {
        find_available(&self.pool, now).await
    }

    async fn find_by_id(&self, id: i64) -> RepoResult<Option<Reward>> {
        find_by_id(&self.pool, id).await
    }

    async fn create(&self, data: &RewardCreate) -> RepoResult<Reward> {
        create(&self.pool, data).await
    }

    async fn update(&self, id: i64, data: &RewardUpdate) -> RepoResult<Reward> {
        update(&self.pool, id, data).await
    }

    async fn adjust_stock(&self, id: i64, delta: i64) -> RepoResult<Reward> {
        adjust_stock(&self.pool, id, delta).await
    }
}
