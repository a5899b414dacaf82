//! Unified error codes for the billing back-office
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Customer / person / category errors
//! - 4xxx: Loyalty point errors
//! - 5xxx: Reward errors
//! - 6xxx: Inventory (presentation) errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values so the frontend can switch
/// on them without string matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,

    // ==================== 3xxx: Customer ====================
    /// Customer not found
    CustomerNotFound = 3001,
    /// A customer is already linked to this person
    CustomerAlreadyExists = 3002,
    /// RUC/CI or email already registered
    DuplicateEntry = 3003,
    /// Customer is inactive
    CustomerInactive = 3004,
    /// Person not found
    PeopleNotFound = 3101,
    /// Customer category not found
    CategoryNotFound = 3201,
    /// Customer category name already exists
    CategoryNameExists = 3202,

    // ==================== 4xxx: Loyalty ====================
    /// Not enough loyalty points
    InsufficientPoints = 4001,
    /// Point adjustment of zero
    InvalidPointsDelta = 4002,

    // ==================== 5xxx: Reward ====================
    /// Reward not found
    RewardNotFound = 5001,
    /// Reward is inactive or outside its validity window
    RewardUnavailable = 5002,

    // ==================== 6xxx: Inventory ====================
    /// Presentation not found
    PresentationNotFound = 6001,
    /// Not enough stock
    InsufficientStock = 6002,
    /// Barcode already registered
    BarcodeExists = 6003,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",

            // Auth
            ErrorCode::NotAuthenticated => "User is not authenticated",
            ErrorCode::TokenExpired => "Authentication token has expired",
            ErrorCode::TokenInvalid => "Authentication token is invalid",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",

            // Customer
            ErrorCode::CustomerNotFound => "Customer not found",
            ErrorCode::CustomerAlreadyExists => "Customer already exists",
            ErrorCode::DuplicateEntry => "El RUC/CI o email ya están registrados",
            ErrorCode::CustomerInactive => "Customer is inactive",
            ErrorCode::PeopleNotFound => "Person not found",
            ErrorCode::CategoryNotFound => "Customer category not found",
            ErrorCode::CategoryNameExists => "Customer category name already exists",

            // Loyalty
            ErrorCode::InsufficientPoints => "Insufficient points",
            ErrorCode::InvalidPointsDelta => "Points delta must not be zero",

            // Reward
            ErrorCode::RewardNotFound => "Reward not found",
            ErrorCode::RewardUnavailable => "Reward is not available",

            // Inventory
            ErrorCode::PresentationNotFound => "Presentation not found",
            ErrorCode::InsufficientStock => "Insufficient stock",
            ErrorCode::BarcodeExists => "Barcode already exists",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// A numeric code with no matching variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid error code: {0}")]
pub struct InvalidErrorCode(pub u16);

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1003 => Ok(ErrorCode::TokenExpired),
            1004 => Ok(ErrorCode::TokenInvalid),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),

            // Customer
            3001 => Ok(ErrorCode::CustomerNotFound),
            3002 => Ok(ErrorCode::CustomerAlreadyExists),
            3003 => Ok(ErrorCode::DuplicateEntry),
            3004 => Ok(ErrorCode::CustomerInactive),
            3101 => Ok(ErrorCode::PeopleNotFound),
            3201 => Ok(ErrorCode::CategoryNotFound),
            3202 => Ok(ErrorCode::CategoryNameExists),

            // Loyalty
            4001 => Ok(ErrorCode::InsufficientPoints),
            4002 => Ok(ErrorCode::InvalidPointsDelta),

            // Reward
            5001 => Ok(ErrorCode::RewardNotFound),
            5002 => Ok(ErrorCode::RewardUnavailable),

            // Inventory
            6001 => Ok(ErrorCode::PresentationNotFound),
            6002 => Ok(ErrorCode::InsufficientStock),
            6003 => Ok(ErrorCode::BarcodeExists),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::Success.code(), 0);
        assert_eq!(ErrorCode::NotFound.code(), 3);
        assert_eq!(ErrorCode::CustomerAlreadyExists.code(), 3002);
        assert_eq!(ErrorCode::InsufficientPoints.code(), 4001);
        assert_eq!(ErrorCode::InsufficientStock.code(), 6002);
    }

    #[test]
    fn test_try_from_valid() {
        assert_eq!(ErrorCode::try_from(0), Ok(ErrorCode::Success));
        assert_eq!(ErrorCode::try_from(1001), Ok(ErrorCode::NotAuthenticated));
        assert_eq!(ErrorCode::try_from(3003), Ok(ErrorCode::DuplicateEntry));
        assert_eq!(ErrorCode::try_from(5002), Ok(ErrorCode::RewardUnavailable));
        assert_eq!(ErrorCode::try_from(9002), Ok(ErrorCode::DatabaseError));
    }

    #[test]
    fn test_try_from_invalid() {
        assert_eq!(ErrorCode::try_from(999), Err(InvalidErrorCode(999)));
        assert_eq!(ErrorCode::try_from(7001), Err(InvalidErrorCode(7001)));
        // No login or role codes: tokens are verified, never issued on request
        for retired in [4, 1002, 2002, 2003, 9003] {
            assert_eq!(ErrorCode::try_from(retired), Err(InvalidErrorCode(retired)));
        }
    }

    #[test]
    fn test_serialize_as_number() {
        let json = serde_json::to_string(&ErrorCode::RewardNotFound).unwrap();
        assert_eq!(json, "5001");

        let code: ErrorCode = serde_json::from_str("3201").unwrap();
        assert_eq!(code, ErrorCode::CategoryNotFound);

        let result: Result<ErrorCode, _> = serde_json::from_str("10000");
        assert!(result.is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", ErrorCode::Success), "0");
        assert_eq!(format!("{}", ErrorCode::CustomerNotFound), "3001");
    }

    #[test]
    fn test_message() {
        assert_eq!(ErrorCode::InsufficientPoints.message(), "Insufficient points");
        assert_eq!(
            ErrorCode::DuplicateEntry.message(),
            "El RUC/CI o email ya están registrados"
        );
    }
}
