//! Data models
//!
//! Shared between billing-server and the frontend (via API, camelCase JSON).
//! All IDs are `i64` snowflakes, all timestamps Unix millis.
//! Row types without decimals use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.

pub mod activatable;
pub mod customer;
pub mod customer_category;
pub mod loyalty_transaction;
pub mod people;
pub mod presentation;
pub mod reward;

// Re-exports
pub use activatable::Activatable;
pub use customer::*;
pub use customer_category::*;
pub use loyalty_transaction::*;
pub use people::*;
pub use presentation::*;
pub use reward::*;
