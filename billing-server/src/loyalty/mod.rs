//! Loyalty domain rules
//!
//! - [`balance`] - guarded non-negative balance updates (points and stock)
//! - [`calculator`] - category point accrual and discount math

pub mod balance;
pub mod calculator;

pub use balance::{BalanceError, apply_delta};
pub use calculator::{base_points, discount_for, points_for_purchase};
