//! State shared by the handlers of one registered resource.

use crate::dao::Dao;
use std::sync::Arc;

#[derive(Clone)]
pub struct ResourceState {
    /// Resource name; also the path segment.
    pub name: Arc<str>,
    pub id_field: Arc<str>,
    pub dao: Arc<dyn Dao>,
}
