//! Person Registry

use crate::db::Repositories;
use crate::db::repository::RepoError;
use crate::utils::validation::{
    MAX_ADDRESS_LEN, MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, validate_optional_date,
    validate_optional_email, validate_optional_text, validate_required_text,
};
use crate::utils::{AppError, AppResult, ErrorCode};
use shared::models::{People, PeopleCreate, PeopleUpdate};
use shared::util::non_blank;

/// Blank optional strings become `None` so they never hit the unique indexes
fn blank_to_none(value: &Option<String>) -> Option<String> {
    non_blank(value).map(String::from)
}

pub(crate) fn normalize_create(data: &PeopleCreate) -> PeopleCreate {
    PeopleCreate {
        first_name: data.first_name.trim().to_string(),
        last_name: blank_to_none(&data.last_name),
        ruc_ci: blank_to_none(&data.ruc_ci),
        birth_date: blank_to_none(&data.birth_date),
        main_email: blank_to_none(&data.main_email),
        phone: blank_to_none(&data.phone),
        address: blank_to_none(&data.address),
        person_type: data.person_type,
        identity_type: data.identity_type,
    }
}

/// Blank optional fields mean "unchanged", same as absent ones
pub(crate) fn normalize_update(data: &PeopleUpdate) -> PeopleUpdate {
    PeopleUpdate {
        first_name: data.first_name.as_deref().map(|n| n.trim().to_string()),
        last_name: blank_to_none(&data.last_name),
        birth_date: blank_to_none(&data.birth_date),
        main_email: blank_to_none(&data.main_email),
        phone: blank_to_none(&data.phone),
        address: blank_to_none(&data.address),
        person_type: data.person_type,
        identity_type: data.identity_type,
    }
}

pub(crate) fn validate_create(data: &PeopleCreate) -> AppResult<()> {
    validate_required_text(&data.first_name, "firstName", MAX_NAME_LEN)?;
    validate_optional_text(&data.last_name, "lastName", MAX_NAME_LEN)?;
    validate_optional_text(&data.ruc_ci, "rucCi", MAX_SHORT_TEXT_LEN)?;
    validate_optional_date(&data.birth_date, "birthDate")?;
    validate_optional_email(&data.main_email, "mainEmail")?;
    validate_optional_text(&data.phone, "phone", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&data.address, "address", MAX_ADDRESS_LEN)?;
    Ok(())
}

pub(crate) fn validate_update(data: &PeopleUpdate) -> AppResult<()> {
    if let Some(first_name) = &data.first_name {
        validate_required_text(first_name, "firstName", MAX_NAME_LEN)?;
    }
    validate_optional_text(&data.last_name, "lastName", MAX_NAME_LEN)?;
    validate_optional_date(&data.birth_date, "birthDate")?;
    validate_optional_email(&data.main_email, "mainEmail")?;
    validate_optional_text(&data.phone, "phone", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&data.address, "address", MAX_ADDRESS_LEN)?;
    Ok(())
}

#[derive(Clone)]
pub struct PeopleService {
    repos: Repositories,
}

impl PeopleService {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    pub async fn find_all(&self) -> AppResult<Vec<People>> {
        Ok(self.repos.people.find_all().await?)
    }

    pub async fn find_one(&self, id: i64) -> AppResult<People> {
        self.repos
            .people
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::PeopleNotFound))
    }

    pub async fn create(&self, data: PeopleCreate) -> AppResult<People> {
        validate_create(&data)?;
        let data = normalize_create(&data);
        let person = self.repos.people.create(&data).await.map_err(|e| match e {
            RepoError::Duplicate(_) => AppError::new(ErrorCode::DuplicateEntry),
            other => other.into(),
        })?;
        tracing::info!(people_id = person.id, "Person registered");
        Ok(person)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_blank_identifiers_do_not_collide() {
        let service = PeopleService::new(Repositories::in_memory());
        for name in ["Ana", "Luis"] {
            service
                .create(PeopleCreate {
                    first_name: name.into(),
                    ruc_ci: Some("  ".into()),
                    main_email: Some(String::new()),
                    ..Default::default()
                })
                .await
                .unwrap();
        }
        assert_eq!(service.find_all().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_duplicate_ruc_ci_rejected() {
        let service = PeopleService::new(Repositories::in_memory());
        let data = PeopleCreate {
            first_name: "Ana".into(),
            ruc_ci: Some("0102030405".into()),
            ..Default::default()
        };
        service.create(data.clone()).await.unwrap();
        let err = service.create(data).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::DuplicateEntry);
    }

    #[tokio::test]
    async fn test_first_name_required() {
        let service = PeopleService::new(Repositories::in_memory());
        let err = service
            .create(PeopleCreate {
                first_name: "  ".into(),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
    }
}
