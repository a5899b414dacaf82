//! Guarded non-negative balances
//!
//! Loyalty points, presentation stock and reward stock all follow the same
//! rule: add a signed delta, reject the change if the result would go below
//! zero, otherwise persist the new value.

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BalanceError {
    #[error("balance {current} cannot absorb {requested}")]
    Insufficient { current: i64, requested: i64 },

    #[error("balance overflow")]
    Overflow,
}

/// Apply `delta` to `current`, refusing any result below zero.
pub fn apply_delta(current: i64, delta: i64) -> Result<i64, BalanceError> {
    let next = current.checked_add(delta).ok_or(BalanceError::Overflow)?;
    if next < 0 {
        return Err(BalanceError::Insufficient {
            current,
            requested: delta,
        });
    }
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positive_delta() {
        assert_eq!(apply_delta(30, 20), Ok(50));
    }

    #[test]
    fn test_exact_drain_to_zero() {
        assert_eq!(apply_delta(30, -30), Ok(0));
    }

    #[test]
    fn test_negative_result_rejected() {
        assert_eq!(
            apply_delta(30, -50),
            Err(BalanceError::Insufficient {
                current: 30,
                requested: -50
            })
        );
    }

    #[test]
    fn test_overflow_rejected() {
        assert_eq!(apply_delta(i64::MAX, 1), Err(BalanceError::Overflow));
    }
}
