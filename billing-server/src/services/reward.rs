//! Reward Catalog

use crate::db::Repositories;
use crate::db::repository::deactivate;
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, MAX_URL_LEN, validate_optional_text, validate_required_text,
};
use crate::utils::{AppError, AppResult, ErrorCode};
use rust_decimal::Decimal;
use shared::models::{Reward, RewardCreate, RewardType, RewardUpdate, StockUpdate};

/// Effective reward fields after merging an update onto the stored row
struct RewardRules {
    reward_type: RewardType,
    points_cost: i64,
    discount_value: Option<Decimal>,
    presentation_id: Option<i64>,
    stock: i64,
    valid_from: Option<i64>,
    valid_until: Option<i64>,
}

impl RewardRules {
    fn check(&self) -> AppResult<()> {
        if self.points_cost <= 0 {
            return Err(AppError::validation("pointsCost must be greater than 0"));
        }
        if self.stock < 0 {
            return Err(AppError::validation("stock must not be negative"));
        }
        match self.reward_type {
            RewardType::Discount => {
                if !self.discount_value.is_some_and(|v| v > Decimal::ZERO) {
                    return Err(AppError::validation(
                        "DISCOUNT rewards require a discountValue greater than 0",
                    ));
                }
            }
            RewardType::Product => {
                if self.presentation_id.is_none() {
                    return Err(AppError::validation(
                        "PRODUCT rewards require a presentationId",
                    ));
                }
            }
        }
        if let (Some(from), Some(until)) = (self.valid_from, self.valid_until)
            && from > until
        {
            return Err(AppError::validation("validFrom must not be after validUntil"));
        }
        Ok(())
    }
}

#[derive(Clone)]
pub struct RewardService {
    repos: Repositories,
}

impl RewardService {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    async fn ensure_presentation(&self, presentation_id: Option<i64>) -> AppResult<()> {
        if let Some(id) = presentation_id
            && self.repos.presentations.find_by_id(id).await?.is_none()
        {
            return Err(AppError::new(ErrorCode::PresentationNotFound)
                .with_detail("presentationId", id));
        }
        Ok(())
    }

    /// Active rewards, cheapest first
    pub async fn find_all(&self) -> AppResult<Vec<Reward>> {
        Ok(self.repos.rewards.find_all().await?)
    }

    /// Active rewards whose validity window contains `now`, cheapest first
    pub async fn find_available(&self, now: i64) -> AppResult<Vec<Reward>> {
        Ok(self.repos.rewards.find_available(now).await?)
    }

    pub async fn find_one(&self, id: i64) -> AppResult<Reward> {
        self.repos
            .rewards
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::RewardNotFound))
    }

    pub async fn create(&self, data: RewardCreate) -> AppResult<Reward> {
        validate_required_text(&data.name, "name", MAX_NAME_LEN)?;
        validate_optional_text(&data.description, "description", MAX_NOTE_LEN)?;
        validate_optional_text(&data.terms, "terms", MAX_NOTE_LEN)?;
        validate_optional_text(&data.image_url, "imageUrl", MAX_URL_LEN)?;
        RewardRules {
            reward_type: data.reward_type,
            points_cost: data.points_cost,
            discount_value: data.discount_value,
            presentation_id: data.presentation_id,
            stock: data.stock.unwrap_or(0),
            valid_from: data.valid_from,
            valid_until: data.valid_until,
        }
        .check()?;
        self.ensure_presentation(data.presentation_id).await?;

        let reward = self.repos.rewards.create(&data).await?;
        tracing::info!(reward_id = reward.id, name = %reward.name, "Reward created");
        Ok(reward)
    }

    pub async fn update(&self, id: i64, data: RewardUpdate) -> AppResult<Reward> {
        let current = self.find_one(id).await?;

        if let Some(name) = &data.name {
            validate_required_text(name, "name", MAX_NAME_LEN)?;
        }
        validate_optional_text(&data.description, "description", MAX_NOTE_LEN)?;
        validate_optional_text(&data.terms, "terms", MAX_NOTE_LEN)?;
        validate_optional_text(&data.image_url, "imageUrl", MAX_URL_LEN)?;
        RewardRules {
            reward_type: data.reward_type.unwrap_or(current.reward_type),
            points_cost: data.points_cost.unwrap_or(current.points_cost),
            discount_value: data.discount_value.or(current.discount_value),
            presentation_id: data.presentation_id.or(current.presentation_id),
            stock: data.stock.unwrap_or(current.stock),
            valid_from: data.valid_from.or(current.valid_from),
            valid_until: data.valid_until.or(current.valid_until),
        }
        .check()?;
        if data.presentation_id.is_some() {
            self.ensure_presentation(data.presentation_id).await?;
        }

        let reward = self.repos.rewards.update(id, &data).await?;
        tracing::info!(reward_id = id, "Reward updated");
        Ok(reward)
    }

    /// Soft delete
    pub async fn delete(&self, id: i64) -> AppResult<bool> {
        if !deactivate::<Reward>(self.repos.activation.as_ref(), id).await? {
            return Err(AppError::new(ErrorCode::RewardNotFound));
        }
        tracing::info!(reward_id = id, "Reward deactivated");
        Ok(true)
    }

    /// Signed stock delta; the result never goes below zero.
    pub async fn update_stock(&self, id: i64, data: StockUpdate) -> AppResult<Reward> {
        if data.quantity == 0 {
            return Err(AppError::validation("quantity must not be 0"));
        }
        validate_optional_text(&data.reason, "reason", MAX_NOTE_LEN)?;
        self.find_one(id).await?;

        let reward = self.repos.rewards.adjust_stock(id, data.quantity).await?;
        tracing::info!(
            reward_id = id,
            delta = data.quantity,
            stock = reward.stock,
            reason = data.reason.as_deref().unwrap_or(""),
            "Reward stock adjusted"
        );
        Ok(reward)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> RewardService {
        RewardService::new(Repositories::in_memory())
    }

    fn discount(name: &str, cost: i64) -> RewardCreate {
        RewardCreate {
            name: name.into(),
            description: None,
            reward_type: RewardType::Discount,
            points_cost: cost,
            discount_value: Some(Decimal::from(5)),
            presentation_id: None,
            stock: Some(3),
            valid_from: None,
            valid_until: None,
            image_url: None,
            terms: None,
            active: None,
        }
    }

    #[tokio::test]
    async fn test_create_rules() {
        let service = service();

        let err = service.create(discount("Gratis", 0)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);

        let mut data = discount("Sin valor", 10);
        data.discount_value = None;
        assert!(service.create(data).await.is_err());

        let mut data = discount("Producto", 10);
        data.reward_type = RewardType::Product;
        assert_eq!(
            service.create(data.clone()).await.unwrap_err().code,
            ErrorCode::ValidationFailed
        );
        data.presentation_id = Some(77);
        assert_eq!(
            service.create(data).await.unwrap_err().code,
            ErrorCode::PresentationNotFound
        );

        let mut data = discount("Ventana", 10);
        data.valid_from = Some(200);
        data.valid_until = Some(100);
        assert!(service.create(data).await.is_err());
    }

    #[tokio::test]
    async fn test_update_merges_with_stored_values() {
        let service = service();
        let reward = service.create(discount("Café", 50)).await.unwrap();

        // Window end before the stored start
        let mut data = discount("Ventana", 10);
        data.valid_from = Some(500);
        let windowed = service.create(data).await.unwrap();
        let err = service
            .update(
                windowed.id,
                RewardUpdate {
                    valid_until: Some(100),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);

        let updated = service
            .update(
                reward.id,
                RewardUpdate {
                    points_cost: Some(75),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.points_cost, 75);
        assert_eq!(updated.discount_value, Some(Decimal::from(5)));
    }

    #[tokio::test]
    async fn test_stock_guard() {
        let service = service();
        let reward = service.create(discount("Café", 50)).await.unwrap();

        let err = service
            .update_stock(reward.id, StockUpdate { quantity: -5, reason: None })
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InsufficientStock);
        assert_eq!(service.find_one(reward.id).await.unwrap().stock, 3);

        let reward = service
            .update_stock(
                reward.id,
                StockUpdate {
                    quantity: -3,
                    reason: Some("Entregadas".into()),
                },
            )
            .await
            .unwrap();
        assert_eq!(reward.stock, 0);
    }

    #[tokio::test]
    async fn test_delete_hides_from_listing() {
        let service = service();
        let reward = service.create(discount("Café", 50)).await.unwrap();
        assert!(service.delete(reward.id).await.unwrap());
        assert!(service.find_all().await.unwrap().is_empty());
        assert!(service.find_available(0).await.unwrap().is_empty());
        assert_eq!(
            service.delete(12345).await.unwrap_err().code,
            ErrorCode::RewardNotFound
        );
    }
}
