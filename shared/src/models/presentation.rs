//! Presentation Model

use super::activatable::impl_activatable;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Sellable unit of a product (size/pack) with its own barcode and stock
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Presentation {
    pub id: i64,
    pub product_id: i64,
    pub name: String,
    /// Unique
    pub barcode: String,
    /// Units contained in this presentation
    pub quantity: i64,
    #[serde(with = "rust_decimal::serde::float")]
    pub cost_price: Decimal,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub last_cost_price: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub average_cost_price: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::float")]
    pub sale_price: Decimal,
    /// Never negative
    pub stock: i64,
    pub min_stock: i64,
    pub max_stock: Option<i64>,
    pub active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

impl_activatable!(Presentation, "presentation");

impl Presentation {
    pub fn is_low_stock(&self) -> bool {
        self.stock <= self.min_stock
    }
}

/// Create presentation payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresentationCreate {
    pub product_id: i64,
    pub name: String,
    pub barcode: String,
    pub quantity: Option<i64>,
    #[serde(with = "rust_decimal::serde::float")]
    pub cost_price: Decimal,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub last_cost_price: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub average_cost_price: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::float")]
    pub sale_price: Decimal,
    pub stock: Option<i64>,
    pub min_stock: Option<i64>,
    pub max_stock: Option<i64>,
    pub active: Option<bool>,
}

/// Update presentation payload (product and barcode are fixed)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresentationUpdate {
    pub name: Option<String>,
    pub quantity: Option<i64>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub cost_price: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub last_cost_price: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub average_cost_price: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub sale_price: Option<Decimal>,
    pub min_stock: Option<i64>,
    pub max_stock: Option<i64>,
    pub active: Option<bool>,
}
