//! Customer Model

use super::activatable::impl_activatable;
use super::{CustomerCategory, LoyaltyTransaction, People, PeopleCreate, PeopleUpdate, Reward};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Customer account: a Person enrolled in a category, accruing points
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: i64,
    /// 1:1 with People
    pub people_id: i64,
    pub customer_category_id: i64,
    /// Never negative
    pub loyalty_points: i64,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_purchases: Decimal,
    pub last_purchase_date: Option<i64>,
    pub preferred_payment_method: Option<String>,
    pub active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

impl_activatable!(Customer, "customer");

/// Create customer payload (person data is reconciled, not referenced by id)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerCreate {
    pub people: PeopleCreate,
    pub customer_category_id: i64,
    pub preferred_payment_method: Option<String>,
}

/// Update customer payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerUpdate {
    pub customer_category_id: Option<i64>,
    pub preferred_payment_method: Option<String>,
    pub active: Option<bool>,
    pub people: Option<PeopleUpdate>,
}

impl CustomerUpdate {
    /// True when no customer-level field is set
    pub fn has_customer_changes(&self) -> bool {
        self.customer_category_id.is_some()
            || self.preferred_payment_method.is_some()
            || self.active.is_some()
    }
}

/// Customer with person and category (list/detail views)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerWithRelations {
    #[serde(flatten)]
    pub customer: Customer,
    pub people: People,
    pub customer_category: Option<CustomerCategory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loyalty_transactions: Option<Vec<LoyaltyTransaction>>,
}

/// Conflict payload when the person already has a customer account
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExistingCustomer {
    pub existing_customer: bool,
    pub customer: Customer,
    pub people: People,
    pub customer_category: Option<CustomerCategory>,
    pub message: String,
}

impl ExistingCustomer {
    pub fn new(
        customer: Customer,
        people: People,
        customer_category: Option<CustomerCategory>,
    ) -> Self {
        let mut message = format!(
            "Cliente ya registrado: {} - CI/RUC: {}",
            people.full_name(),
            people.ruc_ci.as_deref().unwrap_or("")
        );
        if let Some(email) = people.main_email.as_deref().filter(|e| !e.is_empty()) {
            message.push_str(&format!(" - Email: {}", email));
        }
        Self {
            existing_customer: true,
            customer,
            people,
            customer_category,
            message,
        }
    }
}

/// Signed point adjustment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointsUpdate {
    pub points: i64,
}

/// Reward redemption request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedeemRequest {
    pub reward_id: i64,
}

/// Outcome of a successful redemption
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Redemption {
    pub customer: Customer,
    pub reward: Reward,
    pub transaction: LoyaltyTransaction,
}

/// Points and discount a purchase amount would produce for a customer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointsPreview {
    pub customer_id: i64,
    pub customer_category_id: i64,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub base_points: i64,
    pub points: i64,
    #[serde(with = "rust_decimal::serde::float")]
    pub discount: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{IdentityType, PersonType};

    fn people(email: Option<&str>) -> People {
        People {
            id: 10,
            first_name: "Juan".into(),
            last_name: Some("Pérez".into()),
            ruc_ci: Some("0102030405".into()),
            birth_date: None,
            main_email: email.map(Into::into),
            phone: None,
            address: None,
            person_type: PersonType::Natural,
            identity_type: IdentityType::Cedula,
            date_registered: 0,
        }
    }

    fn customer() -> Customer {
        Customer {
            id: 20,
            people_id: 10,
            customer_category_id: 1,
            loyalty_points: 0,
            total_purchases: Decimal::ZERO,
            last_purchase_date: None,
            preferred_payment_method: None,
            active: true,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn test_existing_customer_message() {
        let existing = ExistingCustomer::new(customer(), people(None), None);
        assert_eq!(
            existing.message,
            "Cliente ya registrado: Juan Pérez - CI/RUC: 0102030405"
        );

        let existing = ExistingCustomer::new(customer(), people(Some("j@x.com")), None);
        assert_eq!(
            existing.message,
            "Cliente ya registrado: Juan Pérez - CI/RUC: 0102030405 - Email: j@x.com"
        );
        assert!(existing.existing_customer);
    }

    #[test]
    fn test_customer_json_shape() {
        let json = serde_json::to_value(customer()).unwrap();
        assert_eq!(json["peopleId"], 10);
        assert_eq!(json["loyaltyPoints"], 0);
        assert!(json["totalPurchases"].is_number());
        assert_eq!(json["active"], true);
    }

    #[test]
    fn test_with_relations_flattens_customer() {
        let view = CustomerWithRelations {
            customer: customer(),
            people: people(None),
            customer_category: None,
            loyalty_transactions: None,
        };
        let json = serde_json::to_value(view).unwrap();
        assert_eq!(json["id"], 20);
        assert_eq!(json["people"]["firstName"], "Juan");
        assert!(json.get("loyaltyTransactions").is_none());
    }
}
