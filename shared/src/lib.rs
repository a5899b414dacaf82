//! Shared types for the small-billing back-office
//!
//! Domain models, request payloads, the unified error system and small
//! utilities used by the server crate and its tests.

pub mod error;
pub mod models;
pub mod util;

// Re-exports
pub use axum::Json;
pub use http;
pub use serde::{Deserialize, Serialize};

pub use error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
