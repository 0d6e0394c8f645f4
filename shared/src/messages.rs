//! Cross-context messages and storage notifications.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Point-to-point message delivered through the extension runtime.
///
/// Serialized as `{"type": "dsco:enable"}`; unknown types fail to parse and
/// are ignored by the receiver.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum RuntimeMessage {
    #[serde(rename = "dsco:enable")]
    Enable,
}

/// A single key change reported by the persisted store.
#[derive(Debug, Clone, PartialEq)]
pub struct StorageChange {
    pub key: String,
    /// `None` when the key was removed.
    pub new_value: Option<Value>,
}

impl StorageChange {
    pub fn new(key: impl Into<String>, new_value: Option<Value>) -> Self {
        Self {
            key: key.into(),
            new_value,
        }
    }
}

/// Only a literal `true` enables the overlay; anything else reads as off.
pub fn enabled_from_json(value: Option<&Value>) -> bool {
    matches!(value, Some(Value::Bool(true)))
}
