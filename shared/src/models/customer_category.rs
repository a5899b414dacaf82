//! Customer Category Model

use super::activatable::impl_activatable;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Customer tier: discount, point multiplier and ticket threshold
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CustomerCategory {
    pub id: i64,
    pub name: String,
    /// 0-100
    #[serde(with = "rust_decimal::serde::float")]
    pub discount_percentage: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub points_multiplier: Decimal,
    /// Spend needed to earn one base point
    #[serde(with = "rust_decimal::serde::float")]
    pub ticket_threshold: Decimal,
    /// "#RRGGBB"
    pub color: Option<String>,
    pub active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

impl_activatable!(CustomerCategory, "customer_category");

/// Create customer category payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerCategoryCreate {
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub discount_percentage: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub points_multiplier: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub ticket_threshold: Decimal,
    pub color: Option<String>,
    pub active: Option<bool>,
}

/// Update customer category payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerCategoryUpdate {
    pub name: Option<String>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub discount_percentage: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub points_multiplier: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub ticket_threshold: Option<Decimal>,
    pub color: Option<String>,
    pub active: Option<bool>,
}
