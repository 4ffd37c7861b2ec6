//! CMS backend: generic CRUD resource controllers over a document store.

pub mod config;
pub mod controllers;
pub mod dao;
pub mod document;
pub mod error;
pub mod handlers;
pub mod response;
pub mod routes;
pub mod state;
pub mod store;

pub use config::{ServerConfig, StoreKind};
pub use controllers::{register_all, DaoFactory};
pub use dao::{Dao, DaoError, MemoryDao, PgDocumentDao};
pub use document::Document;
pub use error::{AppError, ConfigError};
pub use routes::{app, register_base_routes, ResourceConfig, ResourceRouter};
pub use state::ResourceState;
