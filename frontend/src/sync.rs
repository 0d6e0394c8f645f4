//! Sync Bridge
//!
//! Turns store change notifications and wake messages into engine effects.
//! Instances never share memory; everything they agree on goes through the
//! persisted store.

use shared::config::StorageSection;
use shared::{ProjectState, RuntimeMessage, StorageChange, enabled_from_json};

#[derive(Debug, Clone, PartialEq)]
pub enum SyncEffect {
    /// Transition to enabled: reload state, drop fingerprints, mount.
    Enable,
    /// Tear the panel down. Emitted on every `false`, not only transitions.
    Disable,
    /// Another context wrote the state record.
    ReplaceState(ProjectState),
    Ignore,
}

#[derive(Debug)]
pub struct SyncBridge {
    state_key: String,
    enabled_key: String,
    enabled: bool,
}

impl SyncBridge {
    pub fn new(storage: &StorageSection) -> Self {
        Self {
            state_key: storage.state_key.clone(),
            enabled_key: storage.enabled_key.clone(),
            enabled: false,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) -> SyncEffect {
        match (enabled, self.enabled) {
            (true, true) => SyncEffect::Ignore,
            (true, false) => {
                self.enabled = true;
                SyncEffect::Enable
            }
            (false, _) => {
                self.enabled = false;
                SyncEffect::Disable
            }
        }
    }

    pub fn on_storage_change(&mut self, change: &StorageChange) -> SyncEffect {
        if change.key == self.enabled_key {
            return self.set_enabled(enabled_from_json(change.new_value.as_ref()));
        }
        if change.key == self.state_key && self.enabled {
            let state = change
                .new_value
                .as_ref()
                .map(ProjectState::from_json_lenient)
                .unwrap_or_default();
            return SyncEffect::ReplaceState(state);
        }
        SyncEffect::Ignore
    }

    pub fn on_message(&mut self, message: &RuntimeMessage) -> SyncEffect {
        match message {
            RuntimeMessage::Enable => self.set_enabled(true),
        }
    }
}
