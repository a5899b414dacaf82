//! Loyalty Transaction Model

use serde::{Deserialize, Serialize};

/// Kind of point movement
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum LoyaltyTransactionType {
    Earned,
    Redeemed,
    Adjustment,
}

/// One signed entry in a customer's point ledger (append-only)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct LoyaltyTransaction {
    pub id: i64,
    pub customer_id: i64,
    pub points: i64,
    #[serde(rename = "type")]
    pub transaction_type: LoyaltyTransactionType,
    pub description: String,
    pub order_id: Option<i64>,
    pub reward_id: Option<i64>,
    pub created_at: i64,
}

/// Ledger entry to append
#[derive(Debug, Clone)]
pub struct LoyaltyTransactionCreate {
    pub customer_id: i64,
    pub points: i64,
    pub transaction_type: LoyaltyTransactionType,
    pub description: String,
    pub order_id: Option<i64>,
    pub reward_id: Option<i64>,
}

/// Point history summary for one customer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerLoyaltyHistory {
    pub customer_id: i64,
    pub current_points: i64,
    pub total_earned: i64,
    pub total_redeemed: i64,
    pub transactions: Vec<LoyaltyTransaction>,
}

impl CustomerLoyaltyHistory {
    /// Summarize a ledger. Earned sums positive entries, redeemed sums
    /// `REDEEMED` entries as a positive number.
    pub fn from_ledger(
        customer_id: i64,
        current_points: i64,
        transactions: Vec<LoyaltyTransaction>,
    ) -> Self {
        let total_earned = transactions
            .iter()
            .filter(|t| t.points > 0)
            .map(|t| t.points)
            .sum();
        let total_redeemed = transactions
            .iter()
            .filter(|t| t.transaction_type == LoyaltyTransactionType::Redeemed)
            .map(|t| t.points.abs())
            .sum();
        Self {
            customer_id,
            current_points,
            total_earned,
            total_redeemed,
            transactions,
        }
    }
}
