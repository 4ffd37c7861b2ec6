//! In-process collection. Backs tests and `STORE=memory` runs.

use super::{Dao, DaoError};
use crate::document::{self, Document};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

#[derive(Default)]
struct Collection {
    next_seq: u64,
    /// id -> (insertion sequence, document)
    docs: HashMap<String, (u64, Document)>,
}

pub struct MemoryDao {
    id_field: String,
    inner: Mutex<Collection>,
}

impl MemoryDao {
    pub fn new(id_field: impl Into<String>) -> Self {
        MemoryDao {
            id_field: id_field.into(),
            inner: Mutex::new(Collection::default()),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Collection>, DaoError> {
        self.inner
            .lock()
            .map_err(|_| DaoError::Store("memory collection lock poisoned".into()))
    }
}

#[async_trait]
impl Dao for MemoryDao {
    fn id_field(&self) -> &str {
        &self.id_field
    }

    async fn list(&self, filter: Option<&Document>) -> Result<Vec<Document>, DaoError> {
        let coll = self.lock()?;
        let mut rows: Vec<&(u64, Document)> = coll
            .docs
            .values()
            .filter(|(_, d)| filter.map(|f| document::matches(d, f)).unwrap_or(true))
            .collect();
        rows.sort_by_key(|(seq, _)| *seq);
        Ok(rows.into_iter().map(|(_, d)| d.clone()).collect())
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Document>, DaoError> {
        let coll = self.lock()?;
        Ok(coll.docs.get(id).map(|(_, d)| d.clone()))
    }

    async fn create(&self, mut payload: Document) -> Result<Document, DaoError> {
        let id = document::ensure_id(&mut payload, &self.id_field)?;
        let mut coll = self.lock()?;
        if coll.docs.contains_key(&id) {
            return Err(DaoError::Conflict(format!("{} '{}' already exists", self.id_field, id)));
        }
        let seq = coll.next_seq;
        coll.next_seq += 1;
        coll.docs.insert(id, (seq, payload.clone()));
        Ok(payload)
    }

    async fn update_by_id(&self, id: &str, patch: Document) -> Result<Option<Document>, DaoError> {
        let new_id = document::id_value(&patch, &self.id_field)?.map(str::to_string);
        let mut coll = self.lock()?;
        let Some((seq, current)) = coll.docs.get(id).cloned() else {
            return Ok(None);
        };
        if let Some(new_id) = new_id.as_deref() {
            if new_id != id && coll.docs.contains_key(new_id) {
                return Err(DaoError::Conflict(format!(
                    "{} '{}' already exists",
                    self.id_field, new_id
                )));
            }
        }
        let mut merged = current;
        document::merge(&mut merged, patch);
        let key = new_id.unwrap_or_else(|| id.to_string());
        if key != id {
            coll.docs.remove(id);
        }
        coll.docs.insert(key, (seq, merged.clone()));
        Ok(Some(merged))
    }

    async fn delete_by_id(&self, id: &str) -> Result<bool, DaoError> {
        let mut coll = self.lock()?;
        Ok(coll.docs.remove(id).is_some())
    }

    async fn ping(&self) -> Result<(), DaoError> {
        self.lock().map(|_| ())
    }
}
