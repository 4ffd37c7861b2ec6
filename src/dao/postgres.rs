//! Document collections on PostgreSQL: one JSONB table per resource.
//!
//! The `id` column holds the value of the resource's id field and is the primary key, so
//! id uniqueness under concurrent writers is enforced by the database. Merges run as a
//! single `doc || patch` statement, which keeps each write atomic per document.

use super::{Dao, DaoError};
use crate::document::{self, Document};
use crate::store::{ensure_collection, qualified_table};
use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;

pub struct PgDocumentDao {
    pool: PgPool,
    table: String,
    id_field: String,
}

impl PgDocumentDao {
    /// Dao over an existing collection table.
    pub fn new(pool: PgPool, schema: &str, collection: &str, id_field: impl Into<String>) -> Self {
        PgDocumentDao {
            pool,
            table: qualified_table(schema, collection),
            id_field: id_field.into(),
        }
    }

    /// Create the collection table if missing, then return a dao over it.
    pub async fn open(
        pool: PgPool,
        schema: &str,
        collection: &str,
        id_field: impl Into<String>,
    ) -> Result<Self, DaoError> {
        ensure_collection(&pool, schema, collection).await?;
        Ok(Self::new(pool, schema, collection, id_field))
    }

    fn conflict(&self, id: &str) -> DaoError {
        DaoError::Conflict(format!("{} '{}' already exists", self.id_field, id))
    }
}

fn into_document(v: Value) -> Result<Document, DaoError> {
    match v {
        Value::Object(m) => Ok(m),
        _ => Err(DaoError::Store("stored document is not a JSON object".into())),
    }
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.is_unique_violation())
}

#[async_trait]
impl Dao for PgDocumentDao {
    fn id_field(&self) -> &str {
        &self.id_field
    }

    async fn list(&self, filter: Option<&Document>) -> Result<Vec<Document>, DaoError> {
        let filter = Value::Object(filter.cloned().unwrap_or_default());
        let sql = format!("SELECT doc FROM {} WHERE doc @> $1 ORDER BY seq", self.table);
        tracing::debug!(sql = %sql, filter = %filter, "query");
        let rows: Vec<(Value,)> = sqlx::query_as(&sql).bind(&filter).fetch_all(&self.pool).await?;
        rows.into_iter().map(|(v,)| into_document(v)).collect()
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Document>, DaoError> {
        let sql = format!("SELECT doc FROM {} WHERE id = $1", self.table);
        tracing::debug!(sql = %sql, id = %id, "query");
        let row: Option<(Value,)> = sqlx::query_as(&sql).bind(id).fetch_optional(&self.pool).await?;
        row.map(|(v,)| into_document(v)).transpose()
    }

    async fn create(&self, mut payload: Document) -> Result<Document, DaoError> {
        let id = document::ensure_id(&mut payload, &self.id_field)?;
        let sql = format!(
            "INSERT INTO {} (id, doc) VALUES ($1, $2) ON CONFLICT (id) DO NOTHING RETURNING doc",
            self.table
        );
        tracing::debug!(sql = %sql, id = %id, "query");
        let row: Option<(Value,)> = sqlx::query_as(&sql)
            .bind(&id)
            .bind(Value::Object(payload))
            .fetch_optional(&self.pool)
            .await?;
        match row {
            Some((v,)) => into_document(v),
            None => Err(self.conflict(&id)),
        }
    }

    async fn update_by_id(&self, id: &str, patch: Document) -> Result<Option<Document>, DaoError> {
        let new_id = document::id_value(&patch, &self.id_field)?.map(str::to_string);
        let sql = format!(
            r#"
            UPDATE {}
            SET doc = doc || $2, id = COALESCE($3, id), updated_at = NOW()
            WHERE id = $1
            RETURNING doc
            "#,
            self.table
        );
        tracing::debug!(sql = %sql, id = %id, "query");
        let result: Result<Option<(Value,)>, sqlx::Error> = sqlx::query_as(&sql)
            .bind(id)
            .bind(Value::Object(patch))
            .bind(new_id.as_deref())
            .fetch_optional(&self.pool)
            .await;
        match result {
            Ok(row) => row.map(|(v,)| into_document(v)).transpose(),
            Err(e) if is_unique_violation(&e) => Err(self.conflict(new_id.as_deref().unwrap_or(id))),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete_by_id(&self, id: &str) -> Result<bool, DaoError> {
        let sql = format!("DELETE FROM {} WHERE id = $1", self.table);
        tracing::debug!(sql = %sql, id = %id, "query");
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> Result<(), DaoError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
