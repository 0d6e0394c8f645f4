//! Shared domain types for the project overlay.
//!
//! Everything here is pure data and logic with no browser dependency, so the
//! content-script engine in `frontend` and its native tests agree on the
//! persisted shapes, the chat identity rules and the configuration format.

pub mod config;
pub mod identity;
pub mod messages;
pub mod model;
pub mod query;

pub use config::{ConfigError, EngineConfig};
pub use identity::{conversation_chat_id, resolve_chat_id};
pub use messages::{RuntimeMessage, StorageChange, enabled_from_json};
pub use model::{
    ButtonStates, ChatId, ChatStatus, IdSeed, ModelError, Project, ProjectId, ProjectState,
};
pub use query::{AttrFilter, Query};
