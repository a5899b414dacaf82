//! Loyalty Points
//!
//! Manual point adjustments, reward redemption and purchase previews. Every
//! balance change goes through the store's guarded delta, so neither points
//! nor stock can end up negative.

use crate::db::Repositories;
use crate::loyalty::{base_points, discount_for, points_for_purchase};
use crate::utils::{AppError, AppResult, ErrorCode};
use rust_decimal::Decimal;
use shared::models::{
    Customer, CustomerLoyaltyHistory, LoyaltyTransactionCreate, LoyaltyTransactionType,
    PointsPreview, Redemption,
};

const MANUAL_ADJUSTMENT: &str = "Manual adjustment";

#[derive(Clone)]
pub struct LoyaltyService {
    repos: Repositories,
}

impl LoyaltyService {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    async fn customer(&self, id: i64) -> AppResult<Customer> {
        self.repos
            .customers
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::CustomerNotFound))
    }

    /// Apply a signed point delta and record it in the ledger.
    pub async fn update_points(&self, customer_id: i64, delta: i64) -> AppResult<Customer> {
        if delta == 0 {
            return Err(AppError::with_message(
                ErrorCode::InvalidPointsDelta,
                "points must not be 0",
            ));
        }
        self.customer(customer_id).await?;

        let transaction_type = if delta > 0 {
            LoyaltyTransactionType::Earned
        } else {
            LoyaltyTransactionType::Adjustment
        };
        let (customer, _) = self
            .repos
            .loyalty
            .apply_points(&LoyaltyTransactionCreate {
                customer_id,
                points: delta,
                transaction_type,
                description: MANUAL_ADJUSTMENT.to_string(),
                order_id: None,
                reward_id: None,
            })
            .await?;
        tracing::info!(
            customer_id,
            delta,
            balance = customer.loyalty_points,
            "Loyalty points adjusted"
        );
        Ok(customer)
    }

    /// Exchange points for one unit of a reward.
    pub async fn redeem(&self, customer_id: i64, reward_id: i64, now: i64) -> AppResult<Redemption> {
        let customer = self.customer(customer_id).await?;
        if !customer.active {
            return Err(AppError::new(ErrorCode::CustomerInactive));
        }
        let reward = self
            .repos
            .rewards
            .find_by_id(reward_id)
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::RewardNotFound))?;
        if !reward.is_available_at(now) {
            return Err(AppError::new(ErrorCode::RewardUnavailable)
                .with_detail("rewardId", reward_id));
        }
        if reward.stock < 1 {
            return Err(AppError::insufficient_stock(reward.stock, -1));
        }
        if customer.loyalty_points < reward.points_cost {
            return Err(AppError::insufficient_points(
                customer.loyalty_points,
                -reward.points_cost,
            ));
        }

        let (customer, reward, transaction) = self
            .repos
            .loyalty
            .redeem(&LoyaltyTransactionCreate {
                customer_id,
                points: -reward.points_cost,
                transaction_type: LoyaltyTransactionType::Redeemed,
                description: format!("Canje de recompensa: {}", reward.name),
                order_id: None,
                reward_id: Some(reward_id),
            })
            .await?;
        tracing::info!(
            customer_id,
            reward_id,
            points = transaction.points,
            stock = reward.stock,
            "Reward redeemed"
        );
        Ok(Redemption {
            customer,
            reward,
            transaction,
        })
    }

    /// Points and discount a purchase would produce, without recording it.
    pub async fn points_preview(&self, customer_id: i64, amount: Decimal) -> AppResult<PointsPreview> {
        if amount < Decimal::ZERO {
            return Err(AppError::validation("amount must not be negative"));
        }
        let customer = self.customer(customer_id).await?;
        let category = self
            .repos
            .categories
            .find_by_id(customer.customer_category_id)
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::CategoryNotFound))?;
        let out_of_range = || AppError::validation("amount out of range");
        Ok(PointsPreview {
            customer_id,
            customer_category_id: category.id,
            amount,
            base_points: base_points(amount, category.ticket_threshold).ok_or_else(out_of_range)?,
            points: points_for_purchase(amount, &category).ok_or_else(out_of_range)?,
            discount: discount_for(amount, &category).ok_or_else(out_of_range)?,
        })
    }

    /// Full ledger with earned/redeemed totals, newest first.
    pub async fn loyalty_history(&self, customer_id: i64) -> AppResult<CustomerLoyaltyHistory> {
        let customer = self.customer(customer_id).await?;
        let transactions = self
            .repos
            .loyalty
            .recent_transactions(customer_id, None)
            .await?;
        Ok(CustomerLoyaltyHistory::from_ledger(
            customer_id,
            customer.loyalty_points,
            transactions,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::NewCustomer;
    use shared::models::{CustomerCategoryCreate, PeopleCreate, RewardCreate, RewardType};

    struct Fixture {
        service: LoyaltyService,
        repos: Repositories,
        customer_id: i64,
    }

    async fn fixture(points: i64) -> Fixture {
        let repos = Repositories::in_memory();
        let category = repos
            .categories
            .create(&CustomerCategoryCreate {
                name: "Cliente VIP".into(),
                discount_percentage: Decimal::from(10),
                points_multiplier: Decimal::from(2),
                ticket_threshold: Decimal::from(10),
                color: None,
                active: None,
            })
            .await
            .unwrap();
        let person = repos
            .people
            .create(&PeopleCreate {
                first_name: "Ana".into(),
                ..Default::default()
            })
            .await
            .unwrap();
        let customer = repos
            .customers
            .create(&NewCustomer {
                people_id: person.id,
                customer_category_id: category.id,
                preferred_payment_method: None,
            })
            .await
            .unwrap();
        let service = LoyaltyService::new(repos.clone());
        if points > 0 {
            service.update_points(customer.id, points).await.unwrap();
        }
        Fixture {
            service,
            repos,
            customer_id: customer.id,
        }
    }

    async fn reward(repos: &Repositories, cost: i64, stock: i64, valid_until: Option<i64>) -> i64 {
        repos
            .rewards
            .create(&RewardCreate {
                name: "Café gratis".into(),
                description: None,
                reward_type: RewardType::Discount,
                points_cost: cost,
                discount_value: Some(Decimal::new(250, 2)),
                presentation_id: None,
                stock: Some(stock),
                valid_from: None,
                valid_until,
                image_url: None,
                terms: None,
                active: None,
            })
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_positive_delta_is_earned() {
        let f = fixture(30).await;
        let customer = f.service.update_points(f.customer_id, 20).await.unwrap();
        assert_eq!(customer.loyalty_points, 50);

        let history = f.service.loyalty_history(f.customer_id).await.unwrap();
        assert_eq!(history.transactions.len(), 2);
        assert_eq!(
            history.transactions[0].transaction_type,
            LoyaltyTransactionType::Earned
        );
        assert_eq!(history.transactions[0].description, MANUAL_ADJUSTMENT);
        assert_eq!(history.total_earned, 50);
    }

    #[tokio::test]
    async fn test_overdraw_rejected() {
        let f = fixture(30).await;
        let err = f.service.update_points(f.customer_id, -50).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InsufficientPoints);

        let history = f.service.loyalty_history(f.customer_id).await.unwrap();
        assert_eq!(history.current_points, 30);
        assert_eq!(history.transactions.len(), 1);
    }

    #[tokio::test]
    async fn test_zero_and_unknown_customer() {
        let f = fixture(0).await;
        let err = f.service.update_points(f.customer_id, 0).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidPointsDelta);

        let err = f.service.update_points(404, 5).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::CustomerNotFound);
    }

    #[tokio::test]
    async fn test_redeem_deducts_points_and_stock() {
        let f = fixture(120).await;
        let reward_id = reward(&f.repos, 100, 2, None).await;

        let redemption = f.service.redeem(f.customer_id, reward_id, 1_000).await.unwrap();
        assert_eq!(redemption.customer.loyalty_points, 20);
        assert_eq!(redemption.reward.stock, 1);
        assert_eq!(redemption.transaction.points, -100);
        assert_eq!(redemption.transaction.reward_id, Some(reward_id));
        assert_eq!(
            redemption.transaction.transaction_type,
            LoyaltyTransactionType::Redeemed
        );
        assert_eq!(redemption.transaction.description, "Canje de recompensa: Café gratis");
    }

    #[tokio::test]
    async fn test_redeem_rejections_keep_balances() {
        let f = fixture(50).await;
        let expensive = reward(&f.repos, 100, 5, None).await;
        let sold_out = reward(&f.repos, 10, 0, None).await;
        let expired = reward(&f.repos, 10, 5, Some(500)).await;

        let err = f.service.redeem(f.customer_id, expensive, 1_000).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InsufficientPoints);
        let err = f.service.redeem(f.customer_id, sold_out, 1_000).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InsufficientStock);
        let err = f.service.redeem(f.customer_id, expired, 1_000).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::RewardUnavailable);
        let err = f.service.redeem(f.customer_id, 9, 1_000).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::RewardNotFound);

        let history = f.service.loyalty_history(f.customer_id).await.unwrap();
        assert_eq!(history.current_points, 50);
        assert_eq!(history.total_redeemed, 0);
        let stock = f.repos.rewards.find_by_id(expensive).await.unwrap().unwrap().stock;
        assert_eq!(stock, 5);
    }

    #[tokio::test]
    async fn test_points_preview_uses_category() {
        let f = fixture(0).await;
        let preview = f
            .service
            .points_preview(f.customer_id, Decimal::from(50))
            .await
            .unwrap();
        assert_eq!(preview.base_points, 5);
        assert_eq!(preview.points, 10);
        assert_eq!(preview.discount, Decimal::new(500, 2));
    }

    #[tokio::test]
    async fn test_points_preview_rejects_amount_out_of_range() {
        let f = fixture(0).await;
        let err = f
            .service
            .points_preview(f.customer_id, Decimal::MAX)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
        assert_eq!(err.message, "amount out of range");
    }
}
