//! Database Module
//!
//! Handles the SQLite connection pool and migrations, and bundles the
//! repository trait objects the services are built on.

pub mod memory;
pub mod repository;

pub use memory::MemoryStore;
pub use repository::SqliteStore;

use repository::{
    ActivationRepository, CustomerCategoryRepository, CustomerRepository, LoyaltyRepository,
    PeopleRepository, PresentationRepository, RewardRepository,
};
use shared::error::AppError;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use std::str::FromStr;
use std::sync::Arc;

/// Database service, owns the SQLite connection pool
#[derive(Clone)]
pub struct DbService {
    pub pool: SqlitePool,
}

impl DbService {
    /// Open (or create) the database in WAL mode and apply migrations
    pub async fn new(db_path: &str) -> Result<Self, AppError> {
        let options = SqliteConnectOptions::from_str(&format!("sqlite:{db_path}"))
            .map_err(|e| AppError::database(format!("Invalid database path: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .pragma("foreign_keys", "ON")
            .optimize_on_close(true, None);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(|e| AppError::database(format!("Failed to open database: {e}")))?;

        // Wait up to 5s on write contention instead of failing immediately
        sqlx::query("PRAGMA busy_timeout = 5000;")
            .execute(&pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to set busy_timeout: {e}")))?;

        tracing::info!("Database connection established (SQLite WAL, busy_timeout=5000ms)");

        sqlx::migrate!("./migrations")
            .set_ignore_missing(true)
            .run(&pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to apply migrations: {e}")))?;
        tracing::info!("Database migrations applied");

        Ok(Self { pool })
    }
}

/// Repository handles injected into services
#[derive(Clone)]
pub struct Repositories {
    pub people: Arc<dyn PeopleRepository>,
    pub categories: Arc<dyn CustomerCategoryRepository>,
    pub customers: Arc<dyn CustomerRepository>,
    pub rewards: Arc<dyn RewardRepository>,
    pub presentations: Arc<dyn PresentationRepository>,
    pub loyalty: Arc<dyn LoyaltyRepository>,
    pub activation: Arc<dyn ActivationRepository>,
}

impl Repositories {
    fn from_store<S>(store: S) -> Self
    where
        S: PeopleRepository
            + CustomerCategoryRepository
            + CustomerRepository
            + RewardRepository
            + PresentationRepository
            + LoyaltyRepository
            + ActivationRepository
            + 'static,
    {
        let store = Arc::new(store);
        Self {
            people: store.clone(),
            categories: store.clone(),
            customers: store.clone(),
            rewards: store.clone(),
            presentations: store.clone(),
            loyalty: store.clone(),
            activation: store,
        }
    }

    /// SQLite-backed repositories
    pub fn sqlite(pool: SqlitePool) -> Self {
        Self::from_store(SqliteStore::new(pool))
    }

    /// Fresh in-memory repositories
    pub fn in_memory() -> Self {
        Self::from_store(MemoryStore::new())
    }
}
