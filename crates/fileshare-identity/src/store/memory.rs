use std::sync::{Arc, Mutex};

use super::{OwnerRecord, OwnerStore};
use crate::error::StoreError;

/// In-memory owner store for tests and embedding.
///
/// Clones share one record. A poisoned lock is reported as
/// [`StoreError::Unavailable`] rather than panicking.
#[derive(Clone, Default)]
pub struct MemoryOwnerStore {
    inner: Arc<Mutex<Option<OwnerRecord>>>,
}

impl MemoryOwnerStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<T>(_: T) -> StoreError {
    StoreError::Unavailable("owner store lock poisoned".to_string())
}

impl OwnerStore for MemoryOwnerStore {
    fn owner(&self) -> Result<Option<OwnerRecord>, StoreError> {
        let inner = self.inner.lock().map_err(poisoned)?;
        Ok(inner.clone())
    }

    fn register_owner(&self, record: &OwnerRecord) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock().map_err(poisoned)?;
        if inner.is_some() {
            return Ok(false);
        }
        *inner = Some(record.clone());
        Ok(true)
    }
}
