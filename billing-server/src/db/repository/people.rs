//! People Repository

use super::{PeopleRepository, RepoError, RepoResult, SqliteStore};
use async_trait::async_trait;
use shared::models::{People, PeopleCreate, PeopleUpdate};
use sqlx::SqlitePool;

const PEOPLE_SELECT: &str = "SELECT id, first_name, last_name, ruc_ci, birth_date, main_email, phone, address, person_type, identity_type, date_registered FROM people";

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<People>> {
    let sql = format!("{PEOPLE_SELECT} ORDER BY date_registered DESC");
    let rows = sqlx::query_as::<_, People>(&sql).fetch_all(pool).await?;
    Ok(rows)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<People>> {
    let sql = format!("{PEOPLE_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, People>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn find_by_ruc_ci(pool: &SqlitePool, ruc_ci: &str) -> RepoResult<Option<People>> {
    let sql = format!("{PEOPLE_SELECT} WHERE ruc_ci = ?");
    let row = sqlx::query_as::<_, People>(&sql)
        .bind(ruc_ci)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn find_by_email(pool: &SqlitePool, email: &str) -> RepoResult<Option<People>> {
    let sql = format!("{PEOPLE_SELECT} WHERE main_email = ?");
    let row = sqlx::query_as::<_, People>(&sql)
        .bind(email)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn create(pool: &SqlitePool, data: &PeopleCreate) -> RepoResult<People> {
    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO people (id, first_name, last_name, ruc_ci, birth_date, main_email, phone, address, person_type, identity_type, date_registered) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
    )
    .bind(id)
    .bind(&data.first_name)
    .bind(&data.last_name)
    .bind(&data.ruc_ci)
    .bind(&data.birth_date)
    .bind(&data.main_email)
    .bind(&data.phone)
    .bind(&data.address)
    .bind(data.person_type)
    .bind(data.identity_type)
    .bind(now)
    .execute(pool)
    .await?;
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create person".into()))
}

pub async fn update(pool: &SqlitePool, id: i64, data: &PeopleUpdate) -> RepoResult<People> {
    let rows = sqlx::query(
        "UPDATE people SET first_name = COALESCE(?1, first_name), last_name = COALESCE(?2, last_name), birth_date = COALESCE(?3, birth_date), main_email = COALESCE(?4, main_email), phone = COALESCE(?5, phone), address = COALESCE(?6, address), person_type = COALESCE(?7, person_type), identity_type = COALESCE(?8, identity_type) WHERE id = ?9",
    )
    .bind(&data.first_name)
    .bind(&data.last_name)
    .bind(&data.birth_date)
    .bind(&data.main_email)
    .bind(&data.phone)
    .bind(&data.address)
    .bind(data.person_type)
    .bind(data.identity_type)
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("People {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("People {id} not found")))
}

#[async_trait]
impl PeopleRepository for SqliteStore {
    async fn find_all(&self) -> RepoResult<Vec<People>> {
        find_all(&self.pool).await
    }

    async fn find_by_id(&self, id: i64) -> RepoResult<Option<People>> {
        find_by_id(&self.pool, id).await
    }

    async fn find_by_ruc_ci(&self, ruc_ci: &str) -> RepoResult<Option<People>> {
        find_by_ruc_ci(&self.pool, ruc_ci).await
    }

    async fn find_by_email(&self, email: &str) -> RepoResult<Option<People>> {
        find_by_email(&self.pool, email).await
    }

    async fn create(&self, data: &PeopleCreate) -> RepoResult<People> {
        create(&self.pool, data).await
    }

    async fn update(&self, id: i64, data: &PeopleUpdate) -> RepoResult<People> {
        update(&self.pool, id, data).await
    }
}
