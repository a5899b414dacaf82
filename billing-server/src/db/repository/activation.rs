//! Soft-delete Repository
//!
//! Single activation path shared by every [`shared::models::Activatable`] table.

use super::{ActivationRepository, RepoError, RepoResult, SqliteStore};
use async_trait::async_trait;
use shared::models::{Activatable, Customer, CustomerCategory, Presentation, Reward};
use sqlx::SqlitePool;

/// Tables that carry an `active` flag
const ACTIVATABLE_TABLES: [&str; 4] = [
    Customer::TABLE,
    CustomerCategory::TABLE,
    Reward::TABLE,
    Presentation::TABLE,
];

pub(crate) fn check_table(table: &str) -> RepoResult<()> {
    if ACTIVATABLE_TABLES.contains(&table) {
        Ok(())
    } else {
        Err(RepoError::Validation(format!("{table} does not support activation")))
    }
}

pub async fn set_active(pool: &SqlitePool, table: &'static str, id: i64, active: bool) -> RepoResult<bool> {
    check_table(table)?;
    let now = shared::util::now_millis();
    // Table name comes from the whitelist above
    let sql = format!("UPDATE {table} SET active = ?1, updated_at = ?2 WHERE id = ?3");
    let rows = sqlx::query(&sql)
        .bind(active)
        .bind(now)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}

#[async_trait]
impl ActivationRepository for SqliteStore {
    async fn set_active(&self, table: &'static str, id: i64, active: bool) -> RepoResult<bool> {
        set_active(&self.pool, table, id, active).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_activatable_tables_accepted() {
        assert!(check_table("customer").is_ok());
        assert!(check_table("reward").is_ok());
        assert!(check_table("people").is_err());
        assert!(check_table("loyalty_transaction").is_err());
    }
}
