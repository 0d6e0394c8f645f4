//! State Store
//!
//! Owns the in-memory copy of the persisted [`ProjectState`]. Every mutation
//! runs on a clone, is written through the [`PersistedStore`] and is only
//! committed once the write succeeded, so the panel never shows anything
//! that is not on disk.

use serde_json::Value;
use shared::{ChatId, IdSeed, ModelError, ProjectId, ProjectState};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error("failed to encode state: {0}")]
    Encode(String),
    #[error("storage backend failed: {0}")]
    Backend(String),
}

/// Asynchronous key-value store with JSON values.
///
/// Only ever driven from the single engine task, so the futures need not be
/// `Send`.
#[allow(async_fn_in_trait)]
pub trait PersistedStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;
    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError>;
}

pub struct StateStore<S> {
    backend: S,
    key: String,
    state: ProjectState,
}

impl<S: PersistedStore> StateStore<S> {
    pub fn new(backend: S, key: impl Into<String>) -> Self {
        Self {
            backend,
            key: key.into(),
            state: ProjectState::default(),
        }
    }

    pub fn state(&self) -> &ProjectState {
        &self.state
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Read the record, treating an absent or malformed one as empty.
    pub async fn load(&mut self) -> Result<&ProjectState, StoreError> {
        let stored = self.backend.get(&self.key).await?;
        self.state = stored
            .as_ref()
            .map(ProjectState::from_json_lenient)
            .unwrap_or_default();
        Ok(&self.state)
    }

    /// Adopt a state written elsewhere. Last write wins, no merge.
    pub fn replace(&mut self, state: ProjectState) {
        self.state = state;
    }

    pub async fn create_project(
        &mut self,
        name: &str,
        seed: IdSeed,
    ) -> Result<ProjectId, StoreError> {
        let mut next = self.state.clone();
        let id = next.insert_project(name, seed)?;
        self.commit(next).await?;
        log::info!("📁 Created project {id}");
        Ok(id)
    }

    pub async fn rename_project(&mut self, id: &ProjectId, name: &str) -> Result<bool, StoreError> {
        let mut next = self.state.clone();
        if !next.rename_project(id, name) {
            return Ok(false);
        }
        self.commit(next).await?;
        Ok(true)
    }

    /// Removes the project together with every assignment pointing at it.
    pub async fn delete_project(&mut self, id: &ProjectId) -> Result<bool, StoreError> {
        let mut next = self.state.clone();
        if !next.remove_project(id) {
            return Ok(false);
        }
        self.commit(next).await?;
        log::info!("🗑️ Deleted project {id}");
        Ok(true)
    }

    pub async fn assign(&mut self, chat: &ChatId, project: &ProjectId) -> Result<bool, StoreError> {
        let mut next = self.state.clone();
        if !next.assign(chat, project)? {
            return Ok(false);
        }
        self.commit(next).await?;
        Ok(true)
    }

    pub async fn unassign(&mut self, chat: &ChatId) -> Result<bool, StoreError> {
        let mut next = self.state.clone();
        if !next.unassign(chat) {
            return Ok(false);
        }
        self.commit(next).await?;
        Ok(true)
    }

    async fn commit(&mut self, next: ProjectState) -> Result<(), StoreError> {
        let value = next
            .to_json()
            .map_err(|error| StoreError::Encode(error.to_string()))?;
        self.backend.set(&self.key, value).await?;
        self.state = next;
        Ok(())
    }
}

/// Copy a state record left in the legacy store into the canonical one,
/// once. Does nothing when the canonical record already exists or the
/// legacy record is empty or unreadable. The legacy store is never written.
pub async fn import_legacy<L, C>(
    legacy: &L,
    legacy_key: &str,
    canonical: &C,
    canonical_key: &str,
) -> Result<bool, StoreError>
where
    L: PersistedStore,
    C: PersistedStore,
{
    if canonical.get(canonical_key).await?.is_some() {
        return Ok(false);
    }
    let Some(stored) = legacy.get(legacy_key).await? else {
        return Ok(false);
    };
    let state = ProjectState::from_json_lenient(&stored);
    if state.is_empty() {
        return Ok(false);
    }
    let value = state
        .to_json()
        .map_err(|error| StoreError::Encode(error.to_string()))?;
    canonical.set(canonical_key, value).await?;
    log::info!(
        "📦 Imported {} legacy project(s) into the extension store",
        state.projects.len()
    );
    Ok(true)
}

#[cfg(test)]
pub use memory::MemoryStore;
