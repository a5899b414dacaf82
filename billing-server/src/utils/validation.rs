//! Input validation helpers
//!
//! Centralized text length constants and validation functions.
//! SQLite TEXT has no built-in length enforcement, so limits live here.

use crate::utils::AppError;
use validator::ValidateEmail;

// ── Text length limits ──────────────────────────────────────────────

/// Entity names: people, categories, rewards, presentations
pub const MAX_NAME_LEN: usize = 200;

/// Notes, descriptions, terms, stock reasons
pub const MAX_NOTE_LEN: usize = 500;

/// Short identifiers: RUC/CI, phone, barcode, payment method, color codes
pub const MAX_SHORT_TEXT_LEN: usize = 100;

/// Email addresses (RFC 5321)
pub const MAX_EMAIL_LEN: usize = 254;

/// URLs / image paths
pub const MAX_URL_LEN: usize = 2048;

/// Addresses
pub const MAX_ADDRESS_LEN: usize = 500;

// ── Validation helpers ──────────────────────────────────────────────

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty")));
    }
    if value.len() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.len()
        )));
    }
    Ok(())
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> Result<(), AppError> {
    if let Some(v) = value
        && v.len() > max_len
    {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            v.len()
        )));
    }
    Ok(())
}

/// Optional email: blank is accepted (treated as absent), otherwise it must
/// look like an address.
pub fn validate_optional_email(value: &Option<String>, field: &str) -> Result<(), AppError> {
    validate_optional_text(value, field, MAX_EMAIL_LEN)?;
    if let Some(v) = value.as_deref().map(str::trim)
        && !v.is_empty()
        && !v.validate_email()
    {
        return Err(AppError::validation(format!("{field} is not a valid email")));
    }
    Ok(())
}

/// Optional `YYYY-MM-DD` date
pub fn validate_optional_date(value: &Option<String>, field: &str) -> Result<(), AppError> {
    if let Some(v) = value.as_deref().filter(|v| !v.trim().is_empty())
        && chrono::NaiveDate::parse_from_str(v, "%Y-%m-%d").is_err()
    {
        return Err(AppError::validation(format!(
            "{field} must be a date in YYYY-MM-DD format"
        )));
    }
    Ok(())
}

/// Optional `#RRGGBB` color
pub fn validate_optional_color(value: &Option<String>, field: &str) -> Result<(), AppError> {
    if let Some(v) = value {
        let valid = v
            .strip_prefix('#')
            .is_some_and(|hex| hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit()));
        if !valid {
            return Err(AppError::validation(format!(
                "{field} must be a #RRGGBB color"
            )));
        }
    }
    Ok(())
}
