//! Roles, keyed by `RoleId`.

use crate::dao::Dao;
use crate::error::ConfigError;
use crate::routes::{ResourceConfig, ResourceRouter};
use std::sync::Arc;

pub const RESOURCE: &str = "role";
pub const ID_FIELD: &str = "RoleId";

pub fn register(router: ResourceRouter, dao: Arc<dyn Dao>) -> Result<ResourceRouter, ConfigError> {
    router.register(ResourceConfig::new(RESOURCE, ID_FIELD, dao))
}
