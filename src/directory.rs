//! User Directory
//!
//! Persistence boundary for user accounts. The service layer talks to the
//! [`UserDirectory`] trait only; [`PgUserDirectory`] is the Postgres-backed
//! implementation and an in-memory one lives in [`crate::testing`] for
//! tests.
//!
//! Expected schema:
//!
//! ```sql
//! CREATE TABLE users (
//!     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
//!     email TEXT NOT NULL UNIQUE,
//!     password_hash TEXT NOT NULL,
//!     first_name TEXT NOT NULL,
//!     last_name TEXT NOT NULL,
//!     last_login TIMESTAMPTZ,
//!     reset_token TEXT,
//!     reset_token_expires_at TIMESTAMPTZ,
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
//!     updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
//! );
//!
//! CREATE TABLE user_profiles (
//!     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
//!     user_id UUID NOT NULL UNIQUE REFERENCES users(id) ON DELETE CASCADE,
//!     bio TEXT,
//!     avatar_url TEXT,
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
//!     updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
//! );
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

/// A user row as stored. Never serialized to clients; see [`PublicUser`].
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRecord {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub last_login: Option<DateTime<Utc>>,
    pub reset_token: Option<String>,
    pub reset_token_expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Client-facing view of a user. Excludes the password hash and any reset
/// token state.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<&UserRecord> for PublicUser {
    fn from(user: &UserRecord) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            last_login: user.last_login,
            created_at: user.created_at,
        }
    }
}

/// Fields required to create a user. The password arrives already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
}

/// Directory operation failure.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// Unique constraint on email violated.
    #[error("email is already registered")]
    DuplicateEmail,
    #[error("directory query failed: {0}")]
    Query(#[from] sqlx::Error),
}

/// Storage operations needed by the account service.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, DirectoryError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, DirectoryError>;

    /// Look up the user holding a reset token. Expiry is checked by the
    /// caller, not here.
    async fn find_by_reset_token(
        &self,
        token: &str,
    ) -> Result<Option<UserRecord>, DirectoryError>;

    /// Insert a user and their empty profile row.
    async fn create(&self, user: NewUser) -> Result<UserRecord, DirectoryError>;

    /// Record a successful login timestamp.
    async fn touch_last_login(&self, id: Uuid) -> Result<(), DirectoryError>;

    /// Attach a reset token and its expiry to a user.
    async fn set_reset_token(
        &self,
        id: Uuid,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), DirectoryError>;

    /// Replace the password hash and clear any outstanding reset token.
    async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<(), DirectoryError>;
}

/// Postgres-backed directory.
#[derive(Clone)]
pub struct PgUserDirectory {
    pool: PgPool,
}

impl PgUserDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const USER_COLUMNS: &str = "id, email, password_hash, first_name, last_name, last_login, \
     reset_token, reset_token_expires_at, created_at, updated_at";

fn map_insert_err(err: sqlx::Error) -> DirectoryError {
    // 23505 is unique_violation; the only unique constraint a user insert
    // can hit is the email index.
    if let sqlx::Error::Database(ref db) = err {
        if db.code().as_deref() == Some("23505") {
            return DirectoryError::DuplicateEmail;
        }
    }
    DirectoryError::Query(err)
}

#[async_trait]
impl UserDirectory for PgUserDirectory {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, DirectoryError> {
        let user = sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, DirectoryError> {
        let user = sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_by_reset_token(
        &self,
        token: &str,
    ) -> Result<Option<UserRecord>, DirectoryError> {
        let user = sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE reset_token = $1"
        ))
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn create(&self, user: NewUser) -> Result<UserRecord, DirectoryError> {
        // User plus default profile in one transaction so a failed profile
        // insert never strands a profileless user.
        let mut tx = self.pool.begin().await?;

        let record = sqlx::query_as::<_, UserRecord>(&format!(
            "INSERT INTO users (email, password_hash, first_name, last_name) \
             VALUES ($1, $2, $3, $4) RETURNING {USER_COLUMNS}"
        ))
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_insert_err)?;

        sqlx::query("INSERT INTO user_profiles (user_id) VALUES ($1)")
            .bind(record.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(record)
    }

    async fn touch_last_login(&self, id: Uuid) -> Result<(), DirectoryError> {
        sqlx::query("UPDATE users SET last_login = now(), updated_at = now() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn set_reset_token(
        &self,
        id: Uuid,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), DirectoryError> {
        sqlx::query(
            "UPDATE users SET reset_token = $2, reset_token_expires_at = $3, updated_at = now() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(token)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<(), DirectoryError> {
        sqlx::query(
            "UPDATE users SET password_hash = $2, reset_token = NULL, \
             reset_token_expires_at = NULL, updated_at = now() WHERE id = $1",
        )
        .bind(id)
        .bind(password_hash)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_user_excludes_secrets() {
        let record = UserRecord {
            id: Uuid::new_v4(),
            email: "user@example.com".into(),
            password_hash: "$2b$10$abcdefghijklmnopqrstuv".into(),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            last_login: None,
            reset_token: Some("sensitive-token".into()),
            reset_token_expires_at: Some(Utc::now()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_string(&PublicUser::from(&record)).unwrap();
        assert!(!json.contains("password"));
        assert!(!json.contains("sensitive-token"));
        assert!(json.contains("\"firstName\":\"Ada\""));
        assert!(json.contains("user@example.com"));
    }
}
