//! Customer Category Rules
//!
//! Discount tiers. Deactivated categories stay readable so existing
//! customers keep resolving their tier.

use crate::db::Repositories;
use crate::db::repository::{RepoError, deactivate};
use crate::utils::validation::{MAX_NAME_LEN, validate_optional_color, validate_required_text};
use crate::utils::{AppError, AppResult, ErrorCode};
use rust_decimal::Decimal;
use shared::models::{CustomerCategory, CustomerCategoryCreate, CustomerCategoryUpdate};

/// Default tiers: name, discount %, points multiplier, ticket threshold, color
const DEFAULT_CATEGORIES: [(&str, i64, (i64, u32), i64, &str); 4] = [
    ("Usuario Final", 0, (1, 0), 10, "#6B7280"),
    ("Cliente VIP", 10, (2, 0), 5, "#F59E0B"),
    ("Empresas", 15, (15, 1), 3, "#3B82F6"),
    ("Reventa/Distribuidor", 20, (12, 1), 2, "#8B5CF6"),
];

fn validate_discount(value: Decimal) -> AppResult<()> {
    if value < Decimal::ZERO || value > Decimal::ONE_HUNDRED {
        return Err(AppError::validation(
            "discountPercentage must be between 0 and 100",
        ));
    }
    Ok(())
}

fn validate_multiplier(value: Decimal) -> AppResult<()> {
    if value < Decimal::ZERO {
        return Err(AppError::validation("pointsMultiplier must not be negative"));
    }
    Ok(())
}

fn validate_threshold(value: Decimal) -> AppResult<()> {
    if value <= Decimal::ZERO {
        return Err(AppError::validation("ticketThreshold must be greater than 0"));
    }
    Ok(())
}

fn name_conflict(err: RepoError) -> AppError {
    match err {
        RepoError::Duplicate(_) => AppError::new(ErrorCode::CategoryNameExists),
        other => other.into(),
    }
}

#[derive(Clone)]
pub struct CustomerCategoryService {
    repos: Repositories,
}

impl CustomerCategoryService {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    pub async fn find_all(&self) -> AppResult<Vec<CustomerCategory>> {
        Ok(self.repos.categories.find_all().await?)
    }

    pub async fn find_one(&self, id: i64) -> AppResult<CustomerCategory> {
        self.repos
            .categories
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::CategoryNotFound))
    }

    pub async fn create(&self, data: CustomerCategoryCreate) -> AppResult<CustomerCategory> {
        let data = CustomerCategoryCreate {
            name: data.name.trim().to_string(),
            ..data
        };
        validate_required_text(&data.name, "name", MAX_NAME_LEN)?;
        validate_discount(data.discount_percentage)?;
        validate_multiplier(data.points_multiplier)?;
        validate_threshold(data.ticket_threshold)?;
        validate_optional_color(&data.color, "color")?;

        if self.repos.categories.find_by_name(&data.name).await?.is_some() {
            return Err(AppError::new(ErrorCode::CategoryNameExists));
        }
        let category = self
            .repos
            .categories
            .create(&data)
            .await
            .map_err(name_conflict)?;
        tracing::info!(category_id = category.id, name = %category.name, "Customer category created");
        Ok(category)
    }

    pub async fn update(
        &self,
        id: i64,
        data: CustomerCategoryUpdate,
    ) -> AppResult<CustomerCategory> {
        self.find_one(id).await?;

        let data = CustomerCategoryUpdate {
            name: data.name.map(|n| n.trim().to_string()),
            ..data
        };
        if let Some(name) = &data.name {
            validate_required_text(name, "name", MAX_NAME_LEN)?;
            if let Some(existing) = self.repos.categories.find_by_name(name).await?
                && existing.id != id
            {
                return Err(AppError::new(ErrorCode::CategoryNameExists));
            }
        }
        if let Some(v) = data.discount_percentage {
            validate_discount(v)?;
        }
        if let Some(v) = data.points_multiplier {
            validate_multiplier(v)?;
        }
        if let Some(v) = data.ticket_threshold {
            validate_threshold(v)?;
        }
        validate_optional_color(&data.color, "color")?;

        self.repos
            .categories
            .update(id, &data)
            .await
            .map_err(name_conflict)
    }

    /// Soft delete
    pub async fn delete(&self, id: i64) -> AppResult<bool> {
        if !deactivate::<CustomerCategory>(self.repos.activation.as_ref(), id).await? {
            return Err(AppError::new(ErrorCode::CategoryNotFound));
        }
        tracing::info!(category_id = id, "Customer category deactivated");
        Ok(true)
    }

    /// Create any default tier that is missing (by name). Returns how many
    /// were created.
    pub async fn seed_defaults(&self) -> AppResult<usize> {
        let mut created = 0;
        for (name, discount, (multiplier, scale), threshold, color) in DEFAULT_CATEGORIES {
            if self.repos.categories.find_by_name(name).await?.is_some() {
                continue;
            }
            self.repos
                .categories
                .create(&CustomerCategoryCreate {
                    name: name.to_string(),
                    discount_percentage: Decimal::from(discount),
                    points_multiplier: Decimal::new(multiplier, scale),
                    ticket_threshold: Decimal::from(threshold),
                    color: Some(color.to_string()),
                    active: Some(true),
                })
                .await?;
            created += 1;
        }
        if created > 0 {
            tracing::info!(created, "Default customer categories seeded");
        }
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> CustomerCategoryService {
        CustomerCategoryService::new(Repositories::in_memory())
    }

    fn create(name: &str) -> CustomerCategoryCreate {
        CustomerCategoryCreate {
            name: name.into(),
            discount_percentage: Decimal::from(10),
            points_multiplier: Decimal::from(2),
            ticket_threshold: Decimal::from(5),
            color: Some("#F59E0B".into()),
            active: None,
        }
    }

    #[tokio::test]
    async fn test_seed_is_idempotent() {
        let service = service();
        assert_eq!(service.seed_defaults().await.unwrap(), 4);
        assert_eq!(service.seed_defaults().await.unwrap(), 0);

        let all = service.find_all().await.unwrap();
        assert_eq!(all.len(), 4);
        let empresas = all.iter().find(|c| c.name == "Empresas").unwrap();
        assert_eq!(empresas.points_multiplier, Decimal::new(15, 1));
        assert_eq!(empresas.ticket_threshold, Decimal::from(3));
    }

    #[tokio::test]
    async fn test_duplicate_name_rejected() {
        let service = service();
        service.create(create("VIP")).await.unwrap();
        let err = service.create(create("VIP")).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::CategoryNameExists);
    }

    #[tokio::test]
    async fn test_rule_bounds() {
        let service = service();
        let mut data = create("A");
        data.discount_percentage = Decimal::from(101);
        assert!(service.create(data).await.is_err());

        let mut data = create("B");
        data.ticket_threshold = Decimal::ZERO;
        assert!(service.create(data).await.is_err());

        let mut data = create("C");
        data.points_multiplier = Decimal::from(-1);
        assert!(service.create(data).await.is_err());

        let mut data = create("D");
        data.color = Some("orange".into());
        assert!(service.create(data).await.is_err());
    }

    #[tokio::test]
    async fn test_deactivated_category_stays_readable() {
        let service = service();
        let category = service.create(create("Temporal")).await.unwrap();
        assert!(service.delete(category.id).await.unwrap());

        assert!(service.find_all().await.unwrap().is_empty());
        let fetched = service.find_one(category.id).await.unwrap();
        assert!(!fetched.active);

        let err = service.delete(999).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::CategoryNotFound);
    }

    #[tokio::test]
    async fn test_update_rename_conflict() {
        let service = service();
        service.create(create("Uno")).await.unwrap();
        let dos = service.create(create("Dos")).await.unwrap();
        let err = service
            .update(
                dos.id,
                CustomerCategoryUpdate {
                    name: Some("Uno".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::CategoryNameExists);

        let renamed = service
            .update(
                dos.id,
                CustomerCategoryUpdate {
                    name: Some("Dos".into()),
                    discount_percentage: Some(Decimal::from(5)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(renamed.discount_percentage, Decimal::from(5));
    }
}
