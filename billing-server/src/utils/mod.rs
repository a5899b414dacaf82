//! Utilities
//!
//! - [`AppError`] / [`ApiResponse`] - error type and JSON error body (from shared::error)
//! - [`validation`] - text and format checks for request payloads
//! - [`logger`] - tracing subscriber setup

pub mod logger;
pub mod result;
pub mod validation;

pub use result::AppResult;
pub use shared::error::{ApiResponse, AppError, ErrorCategory, ErrorCode};
