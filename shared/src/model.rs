use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

// ===== IDENTIFIERS =====

/// Opaque, stable project identifier (`p_<millis>_<suffix>`).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct ProjectId(String);

impl ProjectId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Build a fresh id from a creation timestamp and a random seed.
    pub fn generate(seed: IdSeed) -> Self {
        Self(format!("p_{}_{}", seed.millis, base36_suffix(seed.entropy)))
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Conversation identifier as produced by [`crate::resolve_chat_id`].
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct ChatId(String);

impl ChatId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Inputs for [`ProjectId::generate`]. The browser side fills these from
/// `Date.now()` and `Math.random()`; tests pass fixed values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdSeed {
    pub millis: u64,
    pub entropy: u64,
}

impl IdSeed {
    pub fn new(millis: u64, entropy: u64) -> Self {
        Self { millis, entropy }
    }

    fn next(self) -> Self {
        Self {
            millis: self.millis,
            entropy: self.entropy.wrapping_add(1),
        }
    }
}

const ID_SUFFIX_LEN: usize = 5;
const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

fn base36_suffix(mut value: u64) -> String {
    let mut digits = [b'0'; ID_SUFFIX_LEN];
    for slot in digits.iter_mut().rev() {
        *slot = BASE36[(value % 36) as usize];
        value /= 36;
    }
    digits.iter().map(|&b| b as char).collect()
}

// ===== CORE DATA TYPES =====

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("project name must not be empty")]
    EmptyName,
    #[error("unknown project {0}")]
    UnknownProject(ProjectId),
}

/// The persisted state record: ordered projects plus the chat assignment map.
///
/// `chat_to_project` keeps insertion order so a round trip through the JSON
/// object in storage does not reshuffle the panel.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProjectState {
    pub projects: Vec<Project>,
    pub chat_to_project: IndexMap<ChatId, ProjectId>,
}

impl ProjectState {
    /// Parse a stored record, treating every malformed part as empty.
    pub fn from_json_lenient(value: &Value) -> Self {
        let Some(record) = value.as_object() else {
            return Self::default();
        };

        let projects = record
            .get("projects")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| {
                        let id = item.get("id")?.as_str()?;
                        let name = item.get("name")?.as_str()?;
                        Some(Project {
                            id: ProjectId::new(id),
                            name: name.to_string(),
                        })
                    })
                    .collect()
            })
            .unwrap_or_default();

        let chat_to_project = record
            .get("chatToProject")
            .and_then(Value::as_object)
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(|(chat, project)| {
                        Some((ChatId::new(chat.as_str()), ProjectId::new(project.as_str()?)))
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self {
            projects,
            chat_to_project,
        }
    }

    pub fn to_json(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty() && self.chat_to_project.is_empty()
    }

    pub fn project(&self, id: &ProjectId) -> Option<&Project> {
        self.projects.iter().find(|project| &project.id == id)
    }

    pub fn assigned_project(&self, chat: &ChatId) -> Option<&ProjectId> {
        self.chat_to_project.get(chat)
    }

    /// Chats mapped to `project`, in assignment order.
    pub fn chats_in(&self, project: &ProjectId) -> Vec<ChatId> {
        self.chat_to_project
            .iter()
            .filter(|(_, assigned)| *assigned == project)
            .map(|(chat, _)| chat.clone())
            .collect()
    }

    // ===== MUTATIONS =====

    /// Append a project with a trimmed name and a fresh id.
    pub fn insert_project(&mut self, name: &str, seed: IdSeed) -> Result<ProjectId, ModelError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ModelError::EmptyName);
        }

        let mut seed = seed;
        let mut id = ProjectId::generate(seed);
        while self.project(&id).is_some() {
            seed = seed.next();
            id = ProjectId::generate(seed);
        }

        self.projects.push(Project {
            id: id.clone(),
            name: name.to_string(),
        });
        Ok(id)
    }

    /// Returns `true` when the stored name actually changed.
    pub fn rename_project(&mut self, id: &ProjectId, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() {
            return false;
        }
        match self.projects.iter_mut().find(|project| &project.id == id) {
            Some(project) if project.name != name => {
                project.name = name.to_string();
                true
            }
            _ => false,
        }
    }

    /// Remove a project and every assignment pointing at it.
    pub fn remove_project(&mut self, id: &ProjectId) -> bool {
        let before = self.projects.len();
        self.projects.retain(|project| &project.id != id);
        let removed = self.projects.len() != before;

        let mappings_before = self.chat_to_project.len();
        self.chat_to_project.retain(|_, assigned| assigned != id);

        removed || self.chat_to_project.len() != mappings_before
    }

    /// Last write wins; one project per chat.
    pub fn assign(&mut self, chat: &ChatId, project: &ProjectId) -> Result<bool, ModelError> {
        if self.project(project).is_none() {
            return Err(ModelError::UnknownProject(project.clone()));
        }
        let previous = self.chat_to_project.insert(chat.clone(), project.clone());
        Ok(previous.as_ref() != Some(project))
    }

    pub fn unassign(&mut self, chat: &ChatId) -> bool {
        self.chat_to_project.shift_remove(chat).is_some()
    }

    pub fn chat_status(&self, chat: Option<&ChatId>) -> ChatStatus {
        let Some(chat) = chat else {
            return ChatStatus::NoChat;
        };
        match self.assigned_project(chat) {
            None => ChatStatus::Unassigned,
            Some(project_id) => match self.project(project_id) {
                Some(project) => ChatStatus::Assigned {
                    project: project_id.clone(),
                    name: project.name.clone(),
                },
                None => ChatStatus::MissingProject(project_id.clone()),
            },
        }
    }
}

// ===== STATUS =====

/// Assignment status of the chat currently open in the host app.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ChatStatus {
    NoChat,
    Unassigned,
    Assigned { project: ProjectId, name: String },
    /// The mapping points at a project that no longer exists.
    MissingProject(ProjectId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ButtonStates {
    pub assign_enabled: bool,
    pub unassign_enabled: bool,
}

impl ChatStatus {
    pub fn text(&self) -> String {
        match self {
            ChatStatus::NoChat => "Open a chat to assign it.".to_string(),
            ChatStatus::Unassigned => "Not assigned.".to_string(),
            ChatStatus::Assigned { name, .. } => format!("Assigned to: {name}"),
            ChatStatus::MissingProject(_) => "Assigned to a missing project.".to_string(),
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, ChatStatus::MissingProject(_))
    }

    pub fn assigned_project(&self) -> Option<&ProjectId> {
        match self {
            ChatStatus::Assigned { project, .. } | ChatStatus::MissingProject(project) => {
                Some(project)
            }
            ChatStatus::NoChat | ChatStatus::Unassigned => None,
        }
    }

    pub fn buttons(&self) -> ButtonStates {
        match self {
            ChatStatus::NoChat => ButtonStates {
                assign_enabled: false,
                unassign_enabled: false,
            },
            ChatStatus::Unassigned => ButtonStates {
                assign_enabled: true,
                unassign_enabled: false,
            },
            ChatStatus::Assigned { .. } | ChatStatus::MissingProject(_) => ButtonStates {
                assign_enabled: true,
                unassign_enabled: true,
            },
        }
    }
}
