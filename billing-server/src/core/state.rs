use std::sync::Arc;

use crate::auth::JwtService;
use crate::core::{Config, Result, ServerError};
use crate::db::{DbService, Repositories};
use crate::services::{
    CustomerCategoryService, CustomerService, LoyaltyService, PeopleService,
    PresentationService, RewardService,
};

/// Server state, holding shared references to every service
///
/// Cloning is cheap: repositories are `Arc` trait objects and each service
/// only wraps a clone of them.
///
/// | field | meaning |
/// |-------|---------|
/// | config | immutable configuration |
/// | repos | injected store (SQLite in production, in-memory in tests) |
/// | jwt_service | bearer token verification |
/// | people .. presentations | business services |
///
/// ```ignore
/// let state = ServerState::initialize(&config).await?;
/// let customer = state.customers.find_one(id).await?;
/// ```
#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub repos: Repositories,
    pub jwt_service: Arc<JwtService>,
    pub people: PeopleService,
    pub customers: CustomerService,
    pub categories: CustomerCategoryService,
    pub loyalty: LoyaltyService,
    pub rewards: RewardService,
    pub presentations: PresentationService,
}

impl ServerState {
    /// Build state around already-open repositories (no seeding)
    pub fn with_repositories(config: Config, repos: Repositories) -> Self {
        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));
        Self {
            people: PeopleService::new(repos.clone()),
            customers: CustomerService::new(repos.clone()),
            categories: CustomerCategoryService::new(repos.clone()),
            loyalty: LoyaltyService::new(repos.clone()),
            rewards: RewardService::new(repos.clone()),
            presentations: PresentationService::new(repos.clone()),
            config,
            repos,
            jwt_service,
        }
    }

    /// Initialize server state
    ///
    /// 1. Create the work directory
    /// 2. Open the SQLite database and apply migrations
    /// 3. Seed the default customer categories (when enabled)
    pub async fn initialize(config: &Config) -> Result<Self> {
        std::fs::create_dir_all(&config.work_dir)?;

        let db = DbService::new(&config.database_path)
            .await
            .map_err(|e| ServerError::Database(e.message))?;
        let state = Self::with_repositories(config.clone(), Repositories::sqlite(db.pool));

        if config.seed_defaults {
            state.categories.seed_defaults().await?;
        }

        tracing::info!(
            database = %config.database_path,
            environment = %config.environment,
            "Server state initialized"
        );
        Ok(state)
    }

    pub fn get_jwt_service(&self) -> Arc<JwtService> {
        self.jwt_service.clone()
    }
}
