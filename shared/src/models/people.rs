//! People Model

use serde::{Deserialize, Serialize};

/// Natural person or legal entity
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum PersonType {
    #[default]
    Natural,
    Juridica,
}

/// Kind of identity document carried in `ruc_ci`
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum IdentityType {
    #[default]
    Cedula,
    Ruc,
    Pasaporte,
}

/// Person entity (identity record, never hard-deleted)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct People {
    pub id: i64,
    pub first_name: String,
    pub last_name: Option<String>,
    /// Tax id (RUC) or national id (CI), unique when present
    pub ruc_ci: Option<String>,
    /// YYYY-MM-DD
    pub birth_date: Option<String>,
    /// Unique when present
    pub main_email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub person_type: PersonType,
    pub identity_type: IdentityType,
    pub date_registered: i64,
}

impl People {
    /// "First Last", or just the first name
    pub fn full_name(&self) -> String {
        match self.last_name.as_deref().map(str::trim) {
            Some(last) if !last.is_empty() => format!("{} {}", self.first_name, last),
            _ => self.first_name.clone(),
        }
    }
}

/// Create person payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeopleCreate {
    pub first_name: String,
    pub last_name: Option<String>,
    pub ruc_ci: Option<String>,
    pub birth_date: Option<String>,
    pub main_email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    #[serde(default)]
    pub person_type: PersonType,
    #[serde(default)]
    pub identity_type: IdentityType,
}

/// Update person payload (RUC/CI is fixed once registered)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeopleUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub birth_date: Option<String>,
    pub main_email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub person_type: Option<PersonType>,
    pub identity_type: Option<IdentityType>,
}

impl PeopleUpdate {
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.birth_date.is_none()
            && self.main_email.is_none()
            && self.phone.is_none()
            && self.address.is_none()
            && self.person_type.is_none()
            && self.identity_type.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person(last_name: Option<&str>) -> People {
        People {
            id: 1,
            first_name: "Ana".into(),
            last_name: last_name.map(Into::into),
            ruc_ci: None,
            birth_date: None,
            main_email: None,
            phone: None,
            address: None,
            person_type: PersonType::Natural,
            identity_type: IdentityType::Cedula,
            date_registered: 0,
        }
    }

    #[test]
    fn test_full_name() {
        assert_eq!(person(Some("Pérez")).full_name(), "Ana Pérez");
        assert_eq!(person(None).full_name(), "Ana");
        assert_eq!(person(Some("  ")).full_name(), "Ana");
    }

    #[test]
    fn test_create_payload_defaults() {
        let payload: PeopleCreate =
            serde_json::from_str(r#"{"firstName":"Ana","rucCi":"0102030405"}"#).unwrap();
        assert_eq!(payload.person_type, PersonType::Natural);
        assert_eq!(payload.identity_type, IdentityType::Cedula);

        let payload: PeopleCreate = serde_json::from_str(
            r#"{"firstName":"ACME","personType":"JURIDICA","identityType":"RUC"}"#,
        )
        .unwrap();
        assert_eq!(payload.person_type, PersonType::Juridica);
        assert_eq!(payload.identity_type, IdentityType::Ruc);
    }
}
