//! Concrete resources. Each supplies its name, id field and dao to the shared route set.

pub mod role;

use crate::config::{ServerConfig, StoreKind};
use crate::dao::{Dao, DaoError, MemoryDao, PgDocumentDao};
use crate::error::AppError;
use crate::routes::ResourceRouter;
use axum::Router;
use sqlx::PgPool;
use std::sync::Arc;

/// Opens the dao for one resource on the configured store.
pub enum DaoFactory {
    Memory,
    Postgres { pool: PgPool, schema: String },
}

impl DaoFactory {
    pub async fn from_config(config: &ServerConfig) -> Result<Self, AppError> {
        Ok(match config.store {
            StoreKind::Memory => DaoFactory::Memory,
            StoreKind::Postgres => {
                let pool = crate::store::connect(config).await?;
                DaoFactory::Postgres {
                    pool,
                    schema: config.schema.clone(),
                }
            }
        })
    }

    pub async fn open(&self, collection: &str, id_field: &str) -> Result<Arc<dyn Dao>, DaoError> {
        let dao: Arc<dyn Dao> = match self {
            DaoFactory::Memory => Arc::new(MemoryDao::new(id_field)),
            DaoFactory::Postgres { pool, schema } => {
                Arc::new(PgDocumentDao::open(pool.clone(), schema, collection, id_field).await?)
            }
        };
        Ok(dao)
    }
}

/// Register every controller on `router`.
pub async fn register_all(router: Router, factory: &DaoFactory) -> Result<ResourceRouter, AppError> {
    let router = ResourceRouter::new(router);
    let router = role::register(router, factory.open(role::RESOURCE, role::ID_FIELD).await?)?;
    Ok(router)
}
