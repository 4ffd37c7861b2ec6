//! Data access objects: generic CRUD over one document collection.
//!
//! Controllers only see the [`Dao`] trait. NotFound is an `Option`, conflicts and
//! malformed payloads are explicit [`DaoError`] variants, and everything else the
//! store can fail with is collapsed into [`DaoError::Store`].

mod memory;
mod postgres;

pub use memory::MemoryDao;
pub use postgres::PgDocumentDao;

use crate::document::Document;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DaoError {
    /// Id collision on create or update.
    #[error("{0}")]
    Conflict(String),
    /// Payload is not a well-formed document.
    #[error("{0}")]
    Validation(String),
    /// Connectivity or internal store fault.
    #[error("{0}")]
    Store(String),
}

impl From<sqlx::Error> for DaoError {
    fn from(e: sqlx::Error) -> Self {
        DaoError::Store(e.to_string())
    }
}

#[async_trait]
pub trait Dao: Send + Sync {
    /// Name of the attribute used as the public identifier.
    fn id_field(&self) -> &str;

    /// All documents containing every (key, value) of `filter`, in insertion order.
    async fn list(&self, filter: Option<&Document>) -> Result<Vec<Document>, DaoError>;

    async fn get_by_id(&self, id: &str) -> Result<Option<Document>, DaoError>;

    /// Insert a document, assigning an id when the payload has none.
    async fn create(&self, payload: Document) -> Result<Document, DaoError>;

    /// Merge `patch` into the stored document. `None` when no document has `id`.
    async fn update_by_id(&self, id: &str, patch: Document) -> Result<Option<Document>, DaoError>;

    /// Returns whether a document was removed.
    async fn delete_by_id(&self, id: &str) -> Result<bool, DaoError>;

    /// Cheap round-trip to the store, for readiness checks.
    async fn ping(&self) -> Result<(), DaoError>;
}
