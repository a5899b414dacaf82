//! Reward Model

use super::activatable::impl_activatable;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// What a reward grants
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum RewardType {
    /// Money off (`discount_value`)
    Discount,
    /// A product presentation (`presentation_id`)
    Product,
}

/// Reward catalog entry, priced in points
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Reward {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub reward_type: RewardType,
    pub points_cost: i64,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub discount_value: Option<Decimal>,
    pub presentation_id: Option<i64>,
    pub stock: i64,
    pub valid_from: Option<i64>,
    pub valid_until: Option<i64>,
    pub image_url: Option<String>,
    pub terms: Option<String>,
    pub active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

impl_activatable!(Reward, "reward");

impl Reward {
    /// Active and inside its validity window (bounds inclusive, open when null)
    pub fn is_available_at(&self, now: i64) -> bool {
        self.active
            && self.valid_from.is_none_or(|from| now >= from)
            && self.valid_until.is_none_or(|until| now <= until)
    }
}

/// Create reward payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardCreate {
    pub name: String,
    pub description: Option<String>,
    pub reward_type: RewardType,
    pub points_cost: i64,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub discount_value: Option<Decimal>,
    pub presentation_id: Option<i64>,
    pub stock: Option<i64>,
    pub valid_from: Option<i64>,
    pub valid_until: Option<i64>,
    pub image_url: Option<String>,
    pub terms: Option<String>,
    pub active: Option<bool>,
}

/// Update reward payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub reward_type: Option<RewardType>,
    pub points_cost: Option<i64>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub discount_value: Option<Decimal>,
    pub presentation_id: Option<i64>,
    pub stock: Option<i64>,
    pub valid_from: Option<i64>,
    pub valid_until: Option<i64>,
    pub image_url: Option<String>,
    pub terms: Option<String>,
    pub active: Option<bool>,
}

/// Signed stock adjustment (rewards and presentations)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockUpdate {
    pub quantity: i64,
    pub reason: Option<String>,
}
