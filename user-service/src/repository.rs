use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common_auth::{Role, UserId};
use sqlx::{FromRow, PgPool};
use thiserror::Error;

use crate::models::UserRecord;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("email is already in use")]
    DuplicateEmail,
    #[error("user not found")]
    NotFound,
    #[error("stored record is invalid: {0}")]
    Corrupted(String),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Capability set the core needs from the identity store. The unique email
/// constraint lives in the store itself; `create`/`update` report a
/// violation as `DuplicateEmail` rather than a raw database fault.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, RepoError>;
    async fn find_by_id(&self, id: &UserId) -> Result<Option<UserRecord>, RepoError>;
    async fn create(&self, record: UserRecord) -> Result<UserRecord, RepoError>;
    async fn update(&self, record: UserRecord) -> Result<UserRecord, RepoError>;
    async fn delete(&self, id: &UserId) -> Result<UserRecord, RepoError>;
    /// Page numbering starts at 1. Returns the page plus the total count so
    /// callers can derive the page count.
    async fn list(&self, page: u32, page_size: u32) -> Result<(Vec<UserRecord>, i64), RepoError>;
}

pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const USER_COLUMNS: &str =
    "id, first_name, last_name, email, password_hash, role, created_at, updated_at";

#[derive(FromRow)]
struct UserRow {
    id: String,
    first_name: String,
    last_name: String,
    email: String,
    password_hash: String,
    role: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for UserRecord {
    type Error = RepoError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let id = UserId::parse(&row.id)
            .map_err(|err| RepoError::Corrupted(format!("id '{}': {err}", row.id)))?;
        let role = row
            .role
            .parse::<Role>()
            .map_err(|err| RepoError::Corrupted(err.to_string()))?;
        Ok(UserRecord {
            id,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            password_hash: row.password_hash,
            role,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.code().as_deref() == Some("23505"))
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, RepoError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        row.map(UserRecord::try_from).transpose()
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<UserRecord>, RepoError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(UserRecord::try_from).transpose()
    }

    async fn create(&self, record: UserRecord) -> Result<UserRecord, RepoError> {
        sqlx::query(
            "INSERT INTO users (id, first_name, last_name, email, password_hash, role, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(record.id.as_str())
        .bind(&record.first_name)
        .bind(&record.last_name)
        .bind(&record.email)
        .bind(&record.password_hash)
        .bind(record.role.as_str())
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|err| {
            if is_unique_violation(&err) {
                RepoError::DuplicateEmail
            } else {
                RepoError::Database(err)
            }
        })?;

        Ok(record)
    }

    async fn update(&self, record: UserRecord) -> Result<UserRecord, RepoError> {
        let result = sqlx::query(
            "UPDATE users
             SET first_name = $2, last_name = $3, email = $4, password_hash = $5,
                 role = $6, updated_at = $7
             WHERE id = $1",
        )
        .bind(record.id.as_str())
        .bind(&record.first_name)
        .bind(&record.last_name)
        .bind(&record.email)
        .bind(&record.password_hash)
        .bind(record.role.as_str())
        .bind(record.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|err| {
            if is_unique_violation(&err) {
                RepoError::DuplicateEmail
            } else {
                RepoError::Database(err)
            }
        })?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(record)
    }

    async fn delete(&self, id: &UserId) -> Result<UserRecord, RepoError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "DELETE FROM users WHERE id = $1 RETURNING {USER_COLUMNS}"
        ))
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => UserRecord::try_from(row),
            None => Err(RepoError::NotFound),
        }
    }

    async fn list(&self, page: u32, page_size: u32) -> Result<(Vec<UserRecord>, i64), RepoError> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        let offset = i64::from(page.saturating_sub(1)) * i64::from(page_size);
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at, id LIMIT $1 OFFSET $2"
        ))
        .bind(i64::from(page_size))
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let records = rows
            .into_iter()
            .map(UserRecord::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok((records, total))
    }
}
