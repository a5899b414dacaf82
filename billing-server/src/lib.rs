//! Billing Server - customer loyalty back-office
//!
//! - **Customers** (`services::customer`): reconciliation of people and
//!   customer accounts by RUC/CI and email
//! - **Loyalty** (`loyalty`, `services::loyalty`): guarded point balances,
//!   category multipliers and reward redemption
//! - **Inventory** (`services::presentation`, `services::reward`): guarded
//!   stock counters
//! - **HTTP API** (`api`): axum routes behind JWT authentication
//!
//! ```text
//! billing-server/src/
//! ├── core/          # config, state, errors, server
//! ├── auth/          # JWT verification, permissions
//! ├── api/           # HTTP routes and handlers
//! ├── services/      # business rules
//! ├── loyalty/       # pure point/discount math
//! ├── db/            # repository traits, SQLite and in-memory stores
//! └── utils/         # logging, validation, result types
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod loyalty;
pub mod services;
pub mod utils;

// Re-export public types
pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState};
pub use utils::{AppError, AppResult};

// Re-export unified error types from shared
pub use utils::{ApiResponse, ErrorCategory, ErrorCode};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

// Security logging macro - supports tracing format specifiers
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

/// Initialize logging from the loaded configuration
pub fn setup_environment(config: &Config) {
    init_logger_with_file(
        Some(&config.log_level),
        Some(config.log_json),
        config.log_dir.as_deref(),
    );
}
