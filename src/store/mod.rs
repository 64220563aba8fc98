use serde::Serialize;
use serde_json::Value;
use sqlx::{postgres::PgPoolOptions, PgPool, Row};
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

pub mod users;

pub use users::{User, Users};

/// Errors from the document store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid document id: {0}")]
    InvalidId(String),

    #[error("duplicate key: {0}")]
    DuplicateKey(String),

    #[error("invalid database URL")]
    InvalidDatabaseUrl,

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Postgres error code for unique-constraint violations.
const UNIQUE_VIOLATION: &str = "23505";

/// Parse a caller-supplied document identifier.
///
/// Rejects non-conforming identifier strings before any query runs.
pub fn parse_document_id(raw: &str) -> Result<Uuid, StoreError> {
    Uuid::parse_str(raw).map_err(|_| StoreError::InvalidId(raw.to_string()))
}

/// Acknowledgment returned by [`Collection::insert`].
#[derive(Debug, Clone, Serialize)]
pub struct InsertAck {
    pub acknowledged: bool,
    pub inserted_id: Uuid,
}

/// Acknowledgment returned by [`Collection::update_by_id`].
#[derive(Debug, Clone, Serialize)]
pub struct UpdateAck {
    pub acknowledged: bool,
    pub matched_count: u64,
    pub modified_count: u64,
}

/// Acknowledgment returned by [`Collection::delete_by_id`].
#[derive(Debug, Clone, Serialize)]
pub struct DeleteAck {
    pub acknowledged: bool,
    pub deleted_count: u64,
}

/// Connection to the document store, established once at startup and shared
/// across all request handling for the process lifetime.
#[derive(Clone)]
pub struct DocumentStore {
    pool: PgPool,
}

impl DocumentStore {
    /// Open the store connection pool.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        // Parse up front so the connection target can be logged without
        // credentials.
        let parsed = url::Url::parse(database_url).map_err(|_| StoreError::InvalidDatabaseUrl)?;
        info!(
            host = parsed.host_str().unwrap_or("<none>"),
            database = parsed.path(),
            "connecting to document store"
        );

        let pool = PgPoolOptions::new().connect(database_url).await?;
        Ok(Self { pool })
    }

    /// Idempotently create the backing tables and indexes.
    pub async fn ensure_collections(&self) -> Result<(), StoreError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS users (
                id UUID PRIMARY KEY,
                name TEXT NOT NULL,
                email TEXT NOT NULL,
                password_hash TEXT NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )",
        )
        .execute(&self.pool)
        .await?;

        // Uniqueness is enforced here so a racing check-then-insert still
        // cannot create two users with the same email.
        sqlx::query("CREATE UNIQUE INDEX IF NOT EXISTS users_email_key ON users (email)")
            .execute(&self.pool)
            .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS documents (
                id UUID PRIMARY KEY,
                collection TEXT NOT NULL,
                doc JSONB NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS documents_collection_idx ON documents (collection)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Access a schema-less document collection by name.
    pub fn collection(&self, name: impl Into<String>) -> Collection {
        Collection {
            name: name.into(),
            pool: self.pool.clone(),
        }
    }

    /// Access the typed user collection.
    pub fn users(&self) -> Users {
        Users::new(self.pool.clone())
    }
}

/// A named collection of schema-less documents.
///
/// Every operation is a single atomic statement; no locking or transaction
/// discipline is layered on top.
pub struct Collection {
    name: String,
    pool: PgPool,
}

impl Collection {
    /// Insert a caller-supplied document verbatim, assigning its identifier.
    pub async fn insert(&self, doc: Value) -> Result<InsertAck, StoreError> {
        let id = Uuid::new_v4();

        sqlx::query("INSERT INTO documents (id, collection, doc) VALUES ($1, $2, $3)")
            .bind(id)
            .bind(&self.name)
            .bind(doc)
            .execute(&self.pool)
            .await?;

        Ok(InsertAck {
            acknowledged: true,
            inserted_id: id,
        })
    }

    /// Every document in the collection, in store-native order.
    pub async fn find_all(&self) -> Result<Vec<Value>, StoreError> {
        let rows = sqlx::query("SELECT id, doc FROM documents WHERE collection = $1")
            .bind(&self.name)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter()
            .map(|row| {
                let id: Uuid = row.try_get("id")?;
                let doc: Value = row.try_get("doc")?;
                Ok(with_id(doc, id))
            })
            .collect()
    }

    /// Look up a single document by identifier.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Value>, StoreError> {
        let row = sqlx::query("SELECT doc FROM documents WHERE collection = $1 AND id = $2")
            .bind(&self.name)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let doc: Value = row.try_get("doc")?;
                Ok(Some(with_id(doc, id)))
            }
            None => Ok(None),
        }
    }

    /// Merge-update named fields on the matching document.
    ///
    /// Fields not mentioned in `patch` are left untouched. A miss is a no-op
    /// with `matched_count` 0, still reported as acknowledged.
    pub async fn update_by_id(&self, id: Uuid, patch: Value) -> Result<UpdateAck, StoreError> {
        let result =
            sqlx::query("UPDATE documents SET doc = doc || $3 WHERE collection = $1 AND id = $2")
                .bind(&self.name)
                .bind(id)
                .bind(patch)
                .execute(&self.pool)
                .await?;

        Ok(UpdateAck {
            acknowledged: true,
            matched_count: result.rows_affected(),
            modified_count: result.rows_affected(),
        })
    }

    /// Remove the matching document. A miss is a no-op with `deleted_count` 0.
    pub async fn delete_by_id(&self, id: Uuid) -> Result<DeleteAck, StoreError> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
            .bind(&self.name)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(DeleteAck {
            acknowledged: true,
            deleted_count: result.rows_affected(),
        })
    }
}

/// Surface the store-assigned identifier inside the returned document.
fn with_id(doc: Value, id: Uuid) -> Value {
    match doc {
        Value::Object(mut map) => {
            map.insert("id".to_string(), Value::String(id.to_string()));
            Value::Object(map)
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_well_formed_ids() {
        let id = Uuid::new_v4();
        assert_eq!(parse_document_id(&id.to_string()).unwrap(), id);
    }

    #[test]
    fn rejects_malformed_ids() {
        assert!(matches!(
            parse_document_id("not-a-uuid"),
            Err(StoreError::InvalidId(_))
        ));
        assert!(matches!(parse_document_id(""), Err(StoreError::InvalidId(_))));
    }

    #[test]
    fn injects_id_into_object_documents() {
        let id = Uuid::new_v4();
        let doc = with_id(json!({"title": "Rust"}), id);
        assert_eq!(doc["title"], "Rust");
        assert_eq!(doc["id"], id.to_string());
    }

    #[test]
    fn leaves_non_object_documents_alone() {
        let id = Uuid::new_v4();
        assert_eq!(with_id(json!([1, 2, 3]), id), json!([1, 2, 3]));
    }
}
