//! Presentation Inventory

use crate::db::Repositories;
use crate::db::repository::{RepoError, deactivate};
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, MAX_SHORT_TEXT_LEN, validate_optional_text,
    validate_required_text,
};
use crate::utils::{AppError, AppResult, ErrorCode};
use rust_decimal::Decimal;
use shared::models::{Presentation, PresentationCreate, PresentationUpdate, StockUpdate};

fn validate_price(value: Option<Decimal>, field: &str) -> AppResult<()> {
    if value.is_some_and(|v| v < Decimal::ZERO) {
        return Err(AppError::validation(format!("{field} must not be negative")));
    }
    Ok(())
}

fn validate_counts(quantity: Option<i64>, min_stock: Option<i64>, max_stock: Option<i64>) -> AppResult<()> {
    if quantity.is_some_and(|q| q < 1) {
        return Err(AppError::validation("quantity must be at least 1"));
    }
    if min_stock.is_some_and(|m| m < 0) {
        return Err(AppError::validation("minStock must not be negative"));
    }
    if let (Some(min), Some(max)) = (min_stock, max_stock)
        && max < min
    {
        return Err(AppError::validation("maxStock must not be below minStock"));
    }
    Ok(())
}

#[derive(Clone)]
pub struct PresentationService {
    repos: Repositories,
}

impl PresentationService {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    /// Active presentations of a product, by name
    pub async fn find_by_product(&self, product_id: i64) -> AppResult<Vec<Presentation>> {
        Ok(self.repos.presentations.find_by_product(product_id).await?)
    }

    pub async fn find_one(&self, id: i64) -> AppResult<Presentation> {
        self.repos
            .presentations
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::PresentationNotFound))
    }

    pub async fn find_by_barcode(&self, barcode: &str) -> AppResult<Presentation> {
        self.repos
            .presentations
            .find_by_barcode(barcode.trim())
            .await?
            .ok_or_else(|| {
                AppError::new(ErrorCode::PresentationNotFound).with_detail("barcode", barcode)
            })
    }

    /// Active presentations at or below their minimum stock, lowest first
    pub async fn low_stock(&self) -> AppResult<Vec<Presentation>> {
        Ok(self.repos.presentations.find_low_stock().await?)
    }

    pub async fn create(&self, data: PresentationCreate) -> AppResult<Presentation> {
        let data = PresentationCreate {
            barcode: data.barcode.trim().to_string(),
            ..data
        };
        validate_required_text(&data.name, "name", MAX_NAME_LEN)?;
        validate_required_text(&data.barcode, "barcode", MAX_SHORT_TEXT_LEN)?;
        validate_price(Some(data.cost_price), "costPrice")?;
        validate_price(Some(data.sale_price), "salePrice")?;
        validate_price(data.last_cost_price, "lastCostPrice")?;
        validate_price(data.average_cost_price, "averageCostPrice")?;
        validate_counts(data.quantity, data.min_stock, data.max_stock)?;
        if data.stock.is_some_and(|s| s < 0) {
            return Err(AppError::validation("stock must not be negative"));
        }

        if self
            .repos
            .presentations
            .find_by_barcode(&data.barcode)
            .await?
            .is_some()
        {
            return Err(AppError::new(ErrorCode::BarcodeExists).with_detail("barcode", data.barcode));
        }
        let presentation = self
            .repos
            .presentations
            .create(&data)
            .await
            .map_err(|e| match e {
                RepoError::Duplicate(_) => AppError::new(ErrorCode::BarcodeExists),
                other => other.into(),
            })?;
        tracing::info!(
            presentation_id = presentation.id,
            barcode = %presentation.barcode,
            "Presentation created"
        );
        Ok(presentation)
    }

    pub async fn update(&self, id: i64, data: PresentationUpdate) -> AppResult<Presentation> {
        let current = self.find_one(id).await?;

        if let Some(name) = &data.name {
            validate_required_text(name, "name", MAX_NAME_LEN)?;
        }
        validate_price(data.cost_price, "costPrice")?;
        validate_price(data.sale_price, "salePrice")?;
        validate_price(data.last_cost_price, "lastCostPrice")?;
        validate_price(data.average_cost_price, "averageCostPrice")?;
        validate_counts(
            data.quantity,
            Some(data.min_stock.unwrap_or(current.min_stock)),
            data.max_stock.or(current.max_stock),
        )?;

        let presentation = self.repos.presentations.update(id, &data).await?;
        tracing::info!(presentation_id = id, "Presentation updated");
        Ok(presentation)
    }

    /// Signed stock delta; the result never goes below zero.
    pub async fn update_stock(&self, id: i64, data: StockUpdate) -> AppResult<Presentation> {
        if data.quantity == 0 {
            return Err(AppError::validation("quantity must not be 0"));
        }
        validate_optional_text(&data.reason, "reason", MAX_NOTE_LEN)?;
        self.find_one(id).await?;

        let presentation = self
            .repos
            .presentations
            .adjust_stock(id, data.quantity)
            .await?;
        if presentation.is_low_stock() {
            tracing::warn!(
                presentation_id = id,
                stock = presentation.stock,
                min_stock = presentation.min_stock,
                "Presentation at or below minimum stock"
            );
        }
        tracing::info!(
            presentation_id = id,
            delta = data.quantity,
            stock = presentation.stock,
            reason = data.reason.as_deref().unwrap_or(""),
            "Presentation stock adjusted"
        );
        Ok(presentation)
    }

    /// Soft delete
    pub async fn delete(&self, id: i64) -> AppResult<bool> {
        if !deactivate::<Presentation>(self.repos.activation.as_ref(), id).await? {
            return Err(AppError::new(ErrorCode::PresentationNotFound));
        }
        tracing::info!(presentation_id = id, "Presentation deactivated");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> PresentationService {
        PresentationService::new(Repositories::in_memory())
    }

    fn create(barcode: &str, stock: i64, min_stock: i64) -> PresentationCreate {
        PresentationCreate {
            product_id: 1,
            name: format!("Botella {barcode}"),
            barcode: barcode.into(),
            quantity: Some(1),
            cost_price: Decimal::new(80, 2),
            last_cost_price: None,
            average_cost_price: None,
            sale_price: Decimal::new(125, 2),
            stock: Some(stock),
            min_stock: Some(min_stock),
            max_stock: None,
            active: None,
        }
    }

    #[tokio::test]
    async fn test_barcode_unique_and_lookup() {
        let service = service();
        let created = service.create(create("7861234500012", 10, 2)).await.unwrap();
        let err = service
            .create(create(" 7861234500012 ", 1, 0))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::BarcodeExists);

        let found = service.find_by_barcode("7861234500012").await.unwrap();
        assert_eq!(found.id, created.id);
        assert_eq!(
            service.find_by_barcode("000").await.unwrap_err().code,
            ErrorCode::PresentationNotFound
        );
    }

    #[tokio::test]
    async fn test_stock_never_negative() {
        let service = service();
        let p = service.create(create("111", 4, 1)).await.unwrap();

        let err = service
            .update_stock(p.id, StockUpdate { quantity: -5, reason: None })
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InsufficientStock);
        assert_eq!(service.find_one(p.id).await.unwrap().stock, 4);

        let p = service
            .update_stock(
                p.id,
                StockUpdate {
                    quantity: -4,
                    reason: Some("Venta".into()),
                },
            )
            .await
            .unwrap();
        assert_eq!(p.stock, 0);
    }

    #[tokio::test]
    async fn test_low_stock_sorted() {
        let service = service();
        service.create(create("a", 3, 5)).await.unwrap();
        service.create(create("b", 50, 5)).await.unwrap();
        service.create(create("c", 1, 2)).await.unwrap();

        let low = service.low_stock().await.unwrap();
        let stocks: Vec<i64> = low.iter().map(|p| p.stock).collect();
        assert_eq!(stocks, vec![1, 3]);
    }

    #[tokio::test]
    async fn test_negative_price_rejected() {
        let service = service();
        let mut data = create("neg", 1, 0);
        data.sale_price = Decimal::from(-1);
        assert_eq!(
            service.create(data).await.unwrap_err().code,
            ErrorCode::ValidationFailed
        );
    }
}
