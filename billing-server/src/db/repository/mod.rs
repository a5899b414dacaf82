//! Repository Module
//!
//! One `#[async_trait]` trait per aggregate. [`SqliteStore`] implements them
//! over a `SqlitePool` (each file below holds the SQL as free functions plus
//! the trait impl); [`crate::db::MemoryStore`] implements them in memory for
//! tests and tooling.

pub mod activation;
pub mod customer;
pub mod customer_category;
pub mod loyalty;
pub mod people;
pub mod presentation;
pub mod reward;

use crate::loyalty::BalanceError;
use async_trait::async_trait;
use rust_decimal::Decimal;
use shared::error::{AppError, ErrorCode};
use shared::models::{
    Activatable, Customer, CustomerCategory, CustomerCategoryCreate, CustomerCategoryUpdate,
    CustomerUpdate, LoyaltyTransaction, LoyaltyTransactionCreate, People, PeopleCreate,
    PeopleUpdate, Presentation, PresentationCreate, PresentationUpdate, Reward, RewardCreate,
    RewardUpdate,
};
use sqlx::SqlitePool;
use std::str::FromStr;
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// A guarded balance (points or stock) would have gone negative
    #[error("Insufficient {resource} balance: {current} cannot absorb {requested}")]
    InsufficientBalance {
        resource: &'static str,
        current: i64,
        requested: i64,
    },
}

impl RepoError {
    pub fn from_balance(resource: &'static str, err: BalanceError) -> Self {
        match err {
            BalanceError::Insufficient { current, requested } => RepoError::InsufficientBalance {
                resource,
                current,
                requested,
            },
            BalanceError::Overflow => RepoError::Validation(format!("{resource} balance overflow")),
        }
    }
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => RepoError::NotFound("row not found".into()),
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                RepoError::Duplicate(db_err.message().to_string())
            }
            sqlx::Error::Database(db_err)
                if db_err.is_check_violation() || db_err.is_foreign_key_violation() =>
            {
                RepoError::Validation(db_err.message().to_string())
            }
            _ => RepoError::Database(err.to_string()),
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(msg) => AppError::with_message(ErrorCode::NotFound, msg),
            RepoError::Duplicate(_) => AppError::new(ErrorCode::DuplicateEntry),
            RepoError::Database(msg) => AppError::database(msg),
            RepoError::Validation(msg) => AppError::validation(msg),
            RepoError::InsufficientBalance {
                resource,
                current,
                requested,
            } if resource == customer::RESOURCE => {
                AppError::insufficient_points(current, requested)
            }
            RepoError::InsufficientBalance {
                current, requested, ..
            } => AppError::insufficient_stock(current, requested),
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

// =============================================================================
// Decimal columns are TEXT; conversion happens only here
// =============================================================================

pub(crate) fn decimal_from_text(column: &str, value: &str) -> RepoResult<Decimal> {
    Decimal::from_str(value)
        .map_err(|e| RepoError::Database(format!("Invalid decimal in {column}: {value} ({e})")))
}

pub(crate) fn optional_decimal_from_text(
    column: &str,
    value: Option<&str>,
) -> RepoResult<Option<Decimal>> {
    value.map(|v| decimal_from_text(column, v)).transpose()
}

pub(crate) fn decimal_to_text(value: Decimal) -> String {
    value.normalize().to_string()
}

// =============================================================================
// Repository traits
// =============================================================================

#[async_trait]
pub trait PeopleRepository: Send + Sync {
    /// Newest first
    async fn find_all(&self) -> RepoResult<Vec<People>>;
    async fn find_by_id(&self, id: i64) -> RepoResult<Option<People>>;
    async fn find_by_ruc_ci(&self, ruc_ci: &str) -> RepoResult<Option<People>>;
    async fn find_by_email(&self, email: &str) -> RepoResult<Option<People>>;
    async fn create(&self, data: &PeopleCreate) -> RepoResult<People>;
    async fn update(&self, id: i64, data: &PeopleUpdate) -> RepoResult<People>;
}

#[async_trait]
pub trait CustomerCategoryRepository: Send + Sync {
    /// Active categories ordered by name
    async fn find_all(&self) -> RepoResult<Vec<CustomerCategory>>;
    /// Active or not
    async fn find_by_id(&self, id: i64) -> RepoResult<Option<CustomerCategory>>;
    async fn find_by_name(&self, name: &str) -> RepoResult<Option<CustomerCategory>>;
    async fn create(&self, data: &CustomerCategoryCreate) -> RepoResult<CustomerCategory>;
    async fn update(&self, id: i64, data: &CustomerCategoryUpdate) -> RepoResult<CustomerCategory>;
}

/// Fields of a freshly registered customer; balances start at zero
#[derive(Debug, Clone)]
pub struct NewCustomer {
    pub people_id: i64,
    pub customer_category_id: i64,
    pub preferred_payment_method: Option<String>,
}

#[async_trait]
pub trait CustomerRepository: Send + Sync {
    /// Active customers, newest first
    async fn find_all(&self) -> RepoResult<Vec<Customer>>;
    async fn find_by_id(&self, id: i64) -> RepoResult<Option<Customer>>;
    async fn find_by_people(&self, people_id: i64) -> RepoResult<Option<Customer>>;
    /// Active customers by total purchases, highest first
    async fn top_by_purchases(&self, limit: i64) -> RepoResult<Vec<Customer>>;
    async fn create(&self, data: &NewCustomer) -> RepoResult<Customer>;
    /// Applies the customer-level fields of `data`; nested people changes are ignored
    async fn update(&self, id: i64, data: &CustomerUpdate) -> RepoResult<Customer>;
}

#[async_trait]
pub trait RewardRepository: Send + Sync {
    /// Active rewards, cheapest first
    async fn find_all(&self) -> RepoResult<Vec<Reward>>;
    /// Active rewards whose validity window contains `now`, cheapest first
    async fn find_available(&self, now: i64) -> RepoResult<Vec<Reward>>;
    async fn find_by_id(&self, id: i64) -> RepoResult<Option<Reward>>;
    async fn create(&self, data: &RewardCreate) -> RepoResult<Reward>;
    async fn update(&self, id: i64, data: &RewardUpdate) -> RepoResult<Reward>;
    /// Guarded stock change, fails with `InsufficientBalance` below zero
    async fn adjust_stock(&self, id: i64, delta: i64) -> RepoResult<Reward>;
}

#[async_trait]
pub trait PresentationRepository: Send + Sync {
    async fn find_by_product(&self, product_id: i64) -> RepoResult<Vec<Presentation>>;
    async fn find_by_id(&self, id: i64) -> RepoResult<Option<Presentation>>;
    async fn find_by_barcode(&self, barcode: &str) -> RepoResult<Option<Presentation>>;
    /// Active presentations with `stock <= min_stock`, lowest stock first
    async fn find_low_stock(&self) -> RepoResult<Vec<Presentation>>;
    async fn create(&self, data: &PresentationCreate) -> RepoResult<Presentation>;
    async fn update(&self, id: i64, data: &PresentationUpdate) -> RepoResult<Presentation>;
    /// Guarded stock change, fails with `InsufficientBalance` below zero
    async fn adjust_stock(&self, id: i64, delta: i64) -> RepoResult<Presentation>;
}

#[async_trait]
pub trait LoyaltyRepository: Send + Sync {
    /// Apply a signed point delta and append the ledger entry in one unit
    async fn apply_points(
        &self,
        entry: &LoyaltyTransactionCreate,
    ) -> RepoResult<(Customer, LoyaltyTransaction)>;

    /// Deduct points, take one unit of reward stock and append the ledger
    /// entry in one unit. `entry.reward_id` names the reward.
    async fn redeem(
        &self,
        entry: &LoyaltyTransactionCreate,
    ) -> RepoResult<(Customer, Reward, LoyaltyTransaction)>;

    /// Newest first; `None` returns the full ledger
    async fn recent_transactions(
        &self,
        customer_id: i64,
        limit: Option<i64>,
    ) -> RepoResult<Vec<LoyaltyTransaction>>;
}

#[async_trait]
pub trait ActivationRepository: Send + Sync {
    /// Flip the `active` flag of a row in one of the soft-deletable tables.
    /// Returns false when no such row exists.
    async fn set_active(&self, table: &'static str, id: i64, active: bool) -> RepoResult<bool>;
}

/// Soft-delete any [`Activatable`] entity through the shared activation path
pub async fn deactivate<T: Activatable>(
    repo: &dyn ActivationRepository,
    id: i64,
) -> RepoResult<bool> {
    repo.set_active(T::TABLE, id, false).await
}

/// SQLite-backed store; implements every repository trait
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
