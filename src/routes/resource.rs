//! Resource CRUD routes. Each resource contributes a fixed route set under `/<name>`:
//! `GET|POST /<name>` and `GET|PUT|DELETE /<name>/:id`.

use crate::config::validate_resource;
use crate::dao::Dao;
use crate::error::ConfigError;
use crate::handlers::resource::{
    create, delete as delete_handler, list, method_not_allowed, read, update,
};
use crate::state::ResourceState;
use axum::{routing::get, Router};
use std::collections::HashSet;
use std::sync::Arc;

/// What a controller supplies to get the standard routes.
#[derive(Clone)]
pub struct ResourceConfig {
    pub name: String,
    pub id_field: String,
    pub dao: Arc<dyn Dao>,
}

impl ResourceConfig {
    pub fn new(name: impl Into<String>, id_field: impl Into<String>, dao: Arc<dyn Dao>) -> Self {
        ResourceConfig {
            name: name.into(),
            id_field: id_field.into(),
            dao,
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        validate_resource(&self.name, &self.id_field)?;
        if self.dao.id_field() != self.id_field {
            return Err(ConfigError::InvalidIdField {
                resource: self.name.clone(),
                id_field: format!("{} (dao keyed by {})", self.id_field, self.dao.id_field()),
            });
        }
        Ok(())
    }
}

/// Route set for one resource, with its own state.
pub fn resource_routes(config: ResourceConfig) -> Result<Router, ConfigError> {
    config.validate()?;
    let collection = format!("/{}", config.name);
    let item = format!("/{}/:id", config.name);
    let state = ResourceState {
        name: Arc::from(config.name.as_str()),
        id_field: Arc::from(config.id_field.as_str()),
        dao: config.dao,
    };
    Ok(Router::new()
        .route(&collection, get(list).post(create).fallback(method_not_allowed))
        .route(
            &item,
            get(read).put(update).delete(delete_handler).fallback(method_not_allowed),
        )
        .with_state(state))
}

/// Merge the route set for `config` into `router`.
///
/// Paths are prefixed by the resource name, so distinct resources never collide. Registering
/// the same name twice on one router panics inside axum; use [`ResourceRouter`] to get an error
/// instead.
pub fn register_base_routes(router: Router, config: ResourceConfig) -> Result<Router, ConfigError> {
    Ok(router.merge(resource_routes(config)?))
}

/// Router wrapper that tracks registered resources and refuses duplicates.
pub struct ResourceRouter {
    router: Router,
    names: HashSet<String>,
    daos: Vec<Arc<dyn Dao>>,
}

impl ResourceRouter {
    pub fn new(router: Router) -> Self {
        ResourceRouter {
            router,
            names: HashSet::new(),
            daos: Vec::new(),
        }
    }

    pub fn register(mut self, config: ResourceConfig) -> Result<Self, ConfigError> {
        if self.names.contains(&config.name) {
            return Err(ConfigError::DuplicateResource(config.name));
        }
        let name = config.name.clone();
        let dao = config.dao.clone();
        self.router = register_base_routes(self.router, config)?;
        tracing::info!(resource = %name, "registered resource routes");
        self.names.insert(name);
        self.daos.push(dao);
        Ok(self)
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Daos of every registered resource, in registration order.
    pub fn daos(&self) -> &[Arc<dyn Dao>] {
        &self.daos
    }

    pub fn into_router(self) -> Router {
        self.router
    }
}
