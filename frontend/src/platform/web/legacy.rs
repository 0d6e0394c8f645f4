//! Read-only view of the page-local store used by earlier builds.

use crate::store::{PersistedStore, StoreError};
use serde_json::Value;
use web_sys::{Storage, Window};

pub struct LegacyStore {
    storage: Storage,
}

impl LegacyStore {
    pub fn new(window: &Window) -> Option<Self> {
        let storage = window.local_storage().ok().flatten()?;
        Some(Self { storage })
    }
}

impl PersistedStore for LegacyStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let raw = self
            .storage
            .get_item(key)
            .map_err(|error| StoreError::Backend(format!("{error:?}")))?;
        // Unparseable leftovers read as absent.
        Ok(raw.and_then(|raw| serde_json::from_str(&raw).ok()))
    }

    async fn set(&self, key: &str, _value: Value) -> Result<(), StoreError> {
        Err(StoreError::Backend(format!(
            "legacy store is read-only, refusing to write `{key}`"
        )))
    }
}
