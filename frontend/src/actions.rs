//! Panel user actions.
//!
//! A click inside the panel is captured as an [`ActionRequest`] (plain data
//! read off the clicked control) and resolved into a typed [`PanelAction`],
//! asking the user through [`Dialogs`] where the action needs input.

use shared::{IdSeed, ProjectId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelAction {
    CreateProject { name: String, seed: IdSeed },
    Assign { project: ProjectId },
    Unassign,
    Rename { project: ProjectId, name: String },
    Delete { project: ProjectId },
}

/// What the clicked control carried.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionRequest {
    /// `data-dsco-action` of the control.
    pub action: String,
    /// `data-dsco-project` of the control, for per-row actions.
    pub project: Option<String>,
    /// Current value of the project selector.
    pub selected: Option<String>,
}

/// Blocking browser dialogs.
pub trait Dialogs {
    fn prompt(&self, message: &str) -> Option<String>;
    fn confirm(&self, message: &str) -> bool;
}

pub const NEW_PROJECT_PROMPT: &str = "Project name?";
pub const RENAME_PROMPT: &str = "New project name?";
pub const DELETE_CONFIRM: &str = "Delete this project? Its chats become unassigned.";

impl ActionRequest {
    /// `None` when the user cancelled or the control lacks what the action
    /// needs.
    pub fn resolve(&self, dialogs: &impl Dialogs, seed: IdSeed) -> Option<PanelAction> {
        match self.action.as_str() {
            "new" => {
                let name = non_empty(dialogs.prompt(NEW_PROJECT_PROMPT))?;
                Some(PanelAction::CreateProject { name, seed })
            }
            "assign" => {
                let project = non_empty(self.selected.clone())?;
                Some(PanelAction::Assign {
                    project: ProjectId::new(project),
                })
            }
            "unassign" => Some(PanelAction::Unassign),
            "rename" => {
                let project = ProjectId::new(non_empty(self.project.clone())?);
                let name = non_empty(dialogs.prompt(RENAME_PROMPT))?;
                Some(PanelAction::Rename { project, name })
            }
            "delete" => {
                let project = ProjectId::new(non_empty(self.project.clone())?);
                dialogs
                    .confirm(DELETE_CONFIRM)
                    .then_some(PanelAction::Delete { project })
            }
            other => {
                log::debug!("Ignoring unknown panel action {other:?}");
                None
            }
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
