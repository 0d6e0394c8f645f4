use crate::identity::DEFAULT_MIN_CHAT_ID_LEN;
use crate::query::{AttrFilter, Query};
use serde::{Deserialize, Serialize};

// ===== CONFIG TYPES =====

/// Engine configuration.
///
/// Every section and field falls back to its default, so a TOML document
/// only needs to name what it overrides.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    pub identity: IdentitySection,
    pub locator: LocatorSection,
    pub watcher: WatcherSection,
    pub storage: StorageSection,
    pub panel: PanelSection,
    pub logging: LoggingSection,
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

impl EngineConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct IdentitySection {
    pub min_chat_id_len: usize,
    /// Routes under which sidebar links point at conversations.
    pub route_prefixes: Vec<String>,
}

impl Default for IdentitySection {
    fn default() -> Self {
        Self {
            min_chat_id_len: DEFAULT_MIN_CHAT_ID_LEN,
            route_prefixes: vec![
                "/a/chat/s/".to_string(),
                "/chat/s/".to_string(),
                "/chat/".to_string(),
                "/c/".to_string(),
            ],
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct LocatorSection {
    /// Structural fast-path queries, tried in order.
    pub direct_containers: Vec<Query>,
    pub landmark_roles: Vec<String>,
    pub landmark_tags: Vec<String>,
    /// Visible labels of the host's "start new conversation" control.
    pub new_chat_labels: Vec<String>,
    /// Link paths of the same control.
    pub new_chat_paths: Vec<String>,
}

impl Default for LocatorSection {
    fn default() -> Self {
        Self {
            direct_containers: vec![
                Query::tag("nav"),
                Query::tag("aside"),
                Query::any().with_attr(AttrFilter::equals("role", "navigation")),
            ],
            landmark_roles: vec!["navigation".to_string(), "complementary".to_string()],
            landmark_tags: vec!["nav".to_string(), "aside".to_string()],
            new_chat_labels: vec!["New chat".to_string(), "开启新对话".to_string()],
            new_chat_paths: vec!["/".to_string()],
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct WatcherSection {
    pub poll_interval_ms: u32,
}

impl Default for WatcherSection {
    fn default() -> Self {
        Self {
            poll_interval_ms: 500,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct StorageSection {
    pub state_key: String,
    pub enabled_key: String,
    /// Key of the state record in the legacy page-local store, if any.
    pub legacy_state_key: Option<String>,
}

impl Default for StorageSection {
    fn default() -> Self {
        Self {
            state_key: "dsco_state_v1".to_string(),
            enabled_key: "dsco_enabled_v1".to_string(),
            legacy_state_key: Some("dsco_state_v1".to_string()),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct PanelSection {
    pub title: String,
}

impl Default for PanelSection {
    fn default() -> Self {
        Self {
            title: "Projects".to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct LoggingSection {
    /// One of `error`, `warn`, `info`, `debug`, `trace`.
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}
