use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::{StoreError, UNIQUE_VIOLATION};

/// A registered user.
///
/// The password hash never serializes into a response body.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Typed access to the user collection.
pub struct Users {
    pool: PgPool,
}

impl Users {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Look up a user by exact email match.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, email, password_hash, created_at
             FROM users
             WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Persist a new user.
    ///
    /// A unique violation on email maps to [`StoreError::DuplicateKey`], so a
    /// registration racing past the pre-insert check still fails cleanly.
    pub async fn insert(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<Uuid, StoreError> {
        let id = Uuid::new_v4();

        let result = sqlx::query(
            "INSERT INTO users (id, name, email, password_hash) VALUES ($1, $2, $3, $4)",
        )
        .bind(id)
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(id),
            Err(sqlx::Error::Database(db)) if db.code().as_deref() == Some(UNIQUE_VIOLATION) => {
                Err(StoreError::DuplicateKey("users.email".to_string()))
            }
            Err(e) => Err(StoreError::Sqlx(e)),
        }
    }
}
