//! Customer Reconciliation Flow
//!
//! Registering a customer first looks the person up by RUC/CI, then by
//! email. A person that already has a customer is reported back instead of
//! duplicated; a person without one is refreshed and reused.
//!
//! ```text
//! validate ─▶ lookup person ─▶ has customer? ──yes──▶ AlreadyExists (409)
//!                  │                 │no
//!                  │none             ▼
//!                  ▼           refresh person
//!            create person ─────────┴──────▶ create customer
//! ```

use crate::db::Repositories;
use crate::db::repository::{NewCustomer, RepoError, RepoResult, deactivate};
use crate::services::people;
use crate::utils::validation::{MAX_SHORT_TEXT_LEN, validate_optional_text};
use crate::utils::{AppError, AppResult, ErrorCode};
use axum::Json;
use axum::response::{IntoResponse, Response};
use http::StatusCode;
use shared::models::{
    Customer, CustomerCreate, CustomerUpdate, CustomerWithRelations, ExistingCustomer, People,
    PeopleCreate, PeopleUpdate,
};
use shared::util::non_blank;
use thiserror::Error;

/// Ledger entries embedded in the customer detail view
pub const RECENT_TRANSACTIONS: i64 = 10;
pub const DEFAULT_TOP_LIMIT: i64 = 10;
pub const MAX_TOP_LIMIT: i64 = 100;

/// Outcome of a failed create/update
#[derive(Debug, Error)]
pub enum ReconciliationError {
    /// The person is already registered as a customer
    #[error("{}", .0.message)]
    AlreadyExists(Box<ExistingCustomer>),

    /// RUC/CI or email collided with another person
    #[error("El RUC/CI o email ya están registrados")]
    DuplicateEntry,

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Unknown(String),
}

impl From<RepoError> for ReconciliationError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::Duplicate(_) => ReconciliationError::DuplicateEntry,
            RepoError::NotFound(msg) => ReconciliationError::NotFound(msg),
            RepoError::Validation(msg) => ReconciliationError::Validation(msg),
            other => ReconciliationError::Unknown(other.to_string()),
        }
    }
}

impl From<AppError> for ReconciliationError {
    fn from(err: AppError) -> Self {
        match err.code {
            ErrorCode::ValidationFailed => ReconciliationError::Validation(err.message),
            ErrorCode::DuplicateEntry => ReconciliationError::DuplicateEntry,
            _ => ReconciliationError::Unknown(err.message),
        }
    }
}

impl IntoResponse for ReconciliationError {
    fn into_response(self) -> Response {
        match self {
            ReconciliationError::AlreadyExists(existing) => (
                StatusCode::CONFLICT,
                Json(serde_json::json!({
                    "statusCode": StatusCode::CONFLICT.as_u16(),
                    "code": ErrorCode::CustomerAlreadyExists.code(),
                    "message": existing.message,
                    "error": "Customer Already Exists",
                    "data": existing,
                })),
            )
                .into_response(),
            ReconciliationError::DuplicateEntry => (
                StatusCode::CONFLICT,
                Json(serde_json::json!({
                    "statusCode": StatusCode::CONFLICT.as_u16(),
                    "code": ErrorCode::DuplicateEntry.code(),
                    "message": ErrorCode::DuplicateEntry.message(),
                    "error": "Duplicate Entry",
                })),
            )
                .into_response(),
            ReconciliationError::Validation(msg) => AppError::validation(msg).into_response(),
            ReconciliationError::NotFound(msg) => {
                AppError::with_message(ErrorCode::CustomerNotFound, msg).into_response()
            }
            ReconciliationError::Unknown(msg) => AppError::internal(msg).into_response(),
        }
    }
}

/// Fields refreshed on a reused person: names, birth date and types are
/// overwritten; contact fields only when the new value is non-blank.
fn refresh_from(input: &PeopleCreate) -> PeopleUpdate {
    PeopleUpdate {
        first_name: Some(input.first_name.clone()),
        last_name: input.last_name.clone(),
        birth_date: input.birth_date.clone(),
        main_email: non_blank(&input.main_email).map(String::from),
        phone: non_blank(&input.phone).map(String::from),
        address: non_blank(&input.address).map(String::from),
        person_type: Some(input.person_type),
        identity_type: Some(input.identity_type),
    }
}

#[derive(Clone)]
pub struct CustomerService {
    repos: Repositories,
}

impl CustomerService {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    async fn ensure_category(&self, category_id: i64) -> Result<(), ReconciliationError> {
        if self.repos.categories.find_by_id(category_id).await?.is_none() {
            return Err(ReconciliationError::Validation(format!(
                "customerCategoryId {category_id} does not exist"
            )));
        }
        Ok(())
    }

    /// Person by RUC/CI, falling back to email. Blank values count as absent.
    async fn lookup_person(&self, input: &PeopleCreate) -> RepoResult<Option<People>> {
        if let Some(ruc_ci) = non_blank(&input.ruc_ci)
            && let Some(person) = self.repos.people.find_by_ruc_ci(ruc_ci).await?
        {
            return Ok(Some(person));
        }
        if let Some(email) = non_blank(&input.main_email) {
            return self.repos.people.find_by_email(email).await;
        }
        Ok(None)
    }

    async fn existing_customer(
        &self,
        customer: Customer,
        person: People,
    ) -> RepoResult<ExistingCustomer> {
        let category = self
            .repos
            .categories
            .find_by_id(customer.customer_category_id)
            .await?;
        Ok(ExistingCustomer::new(customer, person, category))
    }

    /// Register a customer, reusing the person when one already matches.
    pub async fn create(&self, input: CustomerCreate) -> Result<Customer, ReconciliationError> {
        people::validate_create(&input.people)?;
        validate_optional_text(
            &input.preferred_payment_method,
            "preferredPaymentMethod",
            MAX_SHORT_TEXT_LEN,
        )?;
        self.ensure_category(input.customer_category_id).await?;

        let person = match self.lookup_person(&input.people).await? {
            Some(person) => {
                if let Some(customer) = self.repos.customers.find_by_people(person.id).await? {
                    tracing::warn!(
                        customer_id = customer.id,
                        people_id = person.id,
                        "Customer already registered"
                    );
                    let existing = self.existing_customer(customer, person).await?;
                    return Err(ReconciliationError::AlreadyExists(Box::new(existing)));
                }
                let refresh = refresh_from(&people::normalize_create(&input.people));
                self.repos.people.update(person.id, &refresh).await?
            }
            None => {
                self.repos
                    .people
                    .create(&people::normalize_create(&input.people))
                    .await?
            }
        };

        let customer = self
            .repos
            .customers
            .create(&NewCustomer {
                people_id: person.id,
                customer_category_id: input.customer_category_id,
                preferred_payment_method: non_blank(&input.preferred_payment_method)
                    .map(String::from),
            })
            .await?;
        tracing::info!(
            customer_id = customer.id,
            people_id = person.id,
            "Customer created"
        );
        Ok(customer)
    }

    /// Every check runs before the first write. Person changes are then
    /// persisted first and customer fields only after they succeed.
    pub async fn update(
        &self,
        id: i64,
        input: CustomerUpdate,
    ) -> Result<CustomerWithRelations, ReconciliationError> {
        let customer = self
            .repos
            .customers
            .find_by_id(id)
            .await?
            .ok_or_else(|| ReconciliationError::NotFound(format!("Customer {id} not found")))?;

        let person = match &input.people {
            Some(person) => {
                people::validate_update(person)?;
                Some(people::normalize_update(person)).filter(|p| !p.is_empty())
            }
            None => None,
        };
        validate_optional_text(
            &input.preferred_payment_method,
            "preferredPaymentMethod",
            MAX_SHORT_TEXT_LEN,
        )?;
        if let Some(category_id) = input.customer_category_id {
            self.ensure_category(category_id).await?;
        }

        if let Some(person) = person {
            self.repos.people.update(customer.people_id, &person).await?;
        }
        let customer = if input.has_customer_changes() {
            self.repos.customers.update(id, &input).await?
        } else {
            customer
        };
        tracing::info!(customer_id = id, "Customer updated");
        Ok(self.with_relations(customer, true).await?)
    }

    async fn with_relations(
        &self,
        customer: Customer,
        with_transactions: bool,
    ) -> RepoResult<CustomerWithRelations> {
        let people = self
            .repos
            .people
            .find_by_id(customer.people_id)
            .await?
            .ok_or_else(|| {
                RepoError::Database(format!(
                    "People {} missing for customer {}",
                    customer.people_id, customer.id
                ))
            })?;
        let customer_category = self
            .repos
            .categories
            .find_by_id(customer.customer_category_id)
            .await?;
        let loyalty_transactions = if with_transactions {
            Some(
                self.repos
                    .loyalty
                    .recent_transactions(customer.id, Some(RECENT_TRANSACTIONS))
                    .await?,
            )
        } else {
            None
        };
        Ok(CustomerWithRelations {
            customer,
            people,
            customer_category,
            loyalty_transactions,
        })
    }

    async fn with_relations_all(
        &self,
        customers: Vec<Customer>,
    ) -> AppResult<Vec<CustomerWithRelations>> {
        let mut rows = Vec::with_capacity(customers.len());
        for customer in customers {
            rows.push(self.with_relations(customer, false).await?);
        }
        Ok(rows)
    }

    /// Active customers, newest first
    pub async fn find_all(&self) -> AppResult<Vec<CustomerWithRelations>> {
        let customers = self.repos.customers.find_all().await?;
        self.with_relations_all(customers).await
    }

    /// Customer with person, category and the most recent ledger entries
    pub async fn find_one(&self, id: i64) -> AppResult<CustomerWithRelations> {
        let customer = self
            .repos
            .customers
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::CustomerNotFound))?;
        Ok(self.with_relations(customer, true).await?)
    }

    pub async fn find_by_people(&self, people_id: i64) -> AppResult<CustomerWithRelations> {
        let customer = self
            .repos
            .customers
            .find_by_people(people_id)
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::CustomerNotFound))?;
        Ok(self.with_relations(customer, false).await?)
    }

    /// Highest total purchases first; limit defaults to 10, capped at 100
    pub async fn top_customers(&self, limit: Option<i64>) -> AppResult<Vec<CustomerWithRelations>> {
        let limit = limit.unwrap_or(DEFAULT_TOP_LIMIT).clamp(1, MAX_TOP_LIMIT);
        let customers = self.repos.customers.top_by_purchases(limit).await?;
        self.with_relations_all(customers).await
    }

    /// Soft delete
    pub async fn delete(&self, id: i64) -> AppResult<bool> {
        if !deactivate::<Customer>(self.repos.activation.as_ref(), id).await? {
            return Err(AppError::new(ErrorCode::CustomerNotFound));
        }
        tracing::info!(customer_id = id, "Customer deactivated");
        Ok(true)
    }
}
