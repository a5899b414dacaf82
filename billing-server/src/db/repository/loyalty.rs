//! Loyalty Ledger Repository
//!
//! Point movements and redemptions run inside one SQLite transaction: the
//! balance write, the stock write and the ledger insert commit together or
//! not at all.

use super::customer::{CUSTOMER_SELECT, CustomerRow};
use super::reward::{REWARD_SELECT, RewardRow};
use super::{LoyaltyRepository, RepoError, RepoResult, SqliteStore};
use crate::loyalty::apply_delta;
use async_trait::async_trait;
use shared::models::{Customer, LoyaltyTransaction, LoyaltyTransactionCreate, Reward};
use sqlx::{SqliteConnection, SqlitePool};

const TRANSACTION_SELECT: &str = "SELECT id, customer_id, points, transaction_type, description, order_id, reward_id, created_at FROM loyalty_transaction";

async fn customer_in(conn: &mut SqliteConnection, id: i64) -> RepoResult<Customer> {
    let sql = format!("{CUSTOMER_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, CustomerRow>(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Customer {id} not found")))?;
    Customer::try_from(row)
}

async fn reward_in(conn: &mut SqliteConnection, id: i64) -> RepoResult<Reward> {
    let sql = format!("{REWARD_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, RewardRow>(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Reward {id} not found")))?;
    Reward::try_from(row)
}

/// Guarded signed point write (credit or debit); the WHERE clause re-checks the balance at write time
async fn shift_points(
    conn: &mut SqliteConnection,
    customer_id: i64,
    delta: i64,
    now: i64,
) -> RepoResult<()> {
    let current: i64 = sqlx::query_scalar("SELECT loyalty_points FROM customer WHERE id = ?")
        .bind(customer_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Customer {customer_id} not found")))?;
    apply_delta(current, delta).map_err(|e| RepoError::from_balance(super::customer::RESOURCE, e))?;

    let rows = sqlx::query(
        "UPDATE customer SET loyalty_points = loyalty_points + ?1, updated_at = ?2 WHERE id = ?3 AND loyalty_points + ?1 >= 0",
    )
    .bind(delta)
    .bind(now)
    .bind(customer_id)
    .execute(&mut *conn)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::InsufficientBalance {
            resource: super::customer::RESOURCE,
            current,
            requested: delta,
        });
    }
    Ok(())
}

async fn take_reward_unit(conn: &mut SqliteConnection, reward_id: i64, now: i64) -> RepoResult<()> {
    let stock: i64 = sqlx::query_scalar("SELECT stock FROM reward WHERE id = ?")
        .bind(reward_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Reward {reward_id} not found")))?;
    apply_delta(stock, -1).map_err(|e| RepoError::from_balance(super::reward::RESOURCE, e))?;

    let rows = sqlx::query(
        "UPDATE reward SET stock = stock - 1, updated_at = ?1 WHERE id = ?2 AND stock - 1 >= 0",
    )
    .bind(now)
    .bind(reward_id)
    .execute(&mut *conn)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::InsufficientBalance {
            resource: super::reward::RESOURCE,
            current: stock,
            requested: -1,
        });
    }
    Ok(())
}

async fn insert_entry(
    conn: &mut SqliteConnection,
    entry: &LoyaltyTransactionCreate,
    now: i64,
) -> RepoResult<LoyaltyTransaction> {
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO loyalty_transaction (id, customer_id, points, transaction_type, description, order_id, reward_id, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
    )
    .bind(id)
    .bind(entry.customer_id)
    .bind(entry.points)
    .bind(entry.transaction_type)
    .bind(&entry.description)
    .bind(entry.order_id)
    .bind(entry.reward_id)
    .bind(now)
    .execute(&mut *conn)
    .await?;
    Ok(LoyaltyTransaction {
        id,
        customer_id: entry.customer_id,
        points: entry.points,
        transaction_type: entry.transaction_type,
        description: entry.description.clone(),
        order_id: entry.order_id,
        reward_id: entry.reward_id,
        created_at: now,
    })
}

pub async fn apply_points(
    pool: &SqlitePool,
    entry: &LoyaltyTransactionCreate,
) -> RepoResult<(Customer, LoyaltyTransaction)> {
    let now = shared::util::now_millis();
    let mut tx = pool.begin().await?;
    shift_points(&mut tx, entry.customer_id, entry.points, now).await?;
    let transaction = insert_entry(&mut tx, entry, now).await?;
    let customer = customer_in(&mut tx, entry.customer_id).await?;
    tx.commit().await?;
    Ok((customer, transaction))
}

pub async fn redeem(
    pool: &SqlitePool,
    entry: &LoyaltyTransactionCreate,
) -> RepoResult<(Customer, Reward, LoyaltyTransaction)> {
    let reward_id = entry
        .reward_id
        .ok_or_else(|| RepoError::Validation("Redemption requires a reward".into()))?;
    let now = shared::util::now_millis();
    let mut tx = pool.begin().await?;
    shift_points(&mut tx, entry.customer_id, entry.points, now).await?;
    take_reward_unit(&mut tx, reward_id, now).await?;
    let transaction = insert_entry(&mut tx, entry, now).await?;
    let customer = customer_in(&mut tx, entry.customer_id).await?;
    let reward = reward_in(&mut tx, reward_id).await?;
    tx.commit().await?;
    Ok((customer, reward, transaction))
}

pub async fn recent_transactions(
    pool: &SqlitePool,
    customer_id: i64,
    limit: Option<i64>,
) -> RepoResult<Vec<LoyaltyTransaction>> {
    // SQLite treats a negative LIMIT as unbounded
    let sql = format!(
        "{TRANSACTION_SELECT} WHERE customer_id = ? ORDER BY created_at DESC, id DESC LIMIT ?"
    );
    let rows = sqlx::query_as::<_, LoyaltyTransaction>(&sql)
        .bind(customer_id)
        .bind(limit.unwrap_or(-1))
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

#[async_trait]
impl LoyaltyRepository for SqliteStore {
    async fn apply_points(
        &self,
        entry: &LoyaltyTransactionCreate,
    ) -> RepoResult<(Customer, LoyaltyTransaction)> {
        apply_points(&self.pool, entry).await
    }

    async fn redeem(
        &self,
        entry: &LoyaltyTransactionCreate,
    ) -> RepoResult<(Customer, Reward, LoyaltyTransaction)> {
        redeem(&self.pool, entry).await
    }

    async fn recent_transactions(
        &self,
        customer_id: i64,
        limit: Option<i64>,
    ) -> RepoResult<Vec<LoyaltyTransaction>> {
        recent_transactions(&self.pool, customer_id, limit).await
    }
}
