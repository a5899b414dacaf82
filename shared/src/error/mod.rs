//! Error codes and the error type shared by every layer
//!
//! Code ranges: 0xxx general, 1xxx auth, 2xxx permission, 3xxx customer,
//! 4xxx loyalty, 5xxx reward, 6xxx inventory, 9xxx system.
//!
//! ```
//! use shared::error::{ApiResponse, AppError, ErrorCode};
//!
//! let err = AppError::validation("Invalid email format").with_detail("field", "mainEmail");
//! let body = ApiResponse::error(&err);
//! assert_eq!(body.code, ErrorCode::ValidationFailed.code());
//! ```

mod category;
mod codes;
mod http;
mod types;

pub use category::ErrorCategory;
pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{ApiResponse, AppError, AppResult};
