//! Diffed Renderer
//!
//! Every pass derives a [`ViewState`] from the store and a sidebar scrape,
//! splits it into four region models and fingerprints each one. A region is
//! rebuilt only when its fingerprint differs from the previous pass, so a
//! status change never tears down the project list and an unchanged view
//! costs zero DOM mutations.

use crate::dom::{DomError, HostDom};
use crate::locator::ScrapedChat;
use crate::panel::{ACTION_ATTR, DEGRADED_ATTR, PROJECT_ATTR, PanelHandles, element, text_element};
use indexmap::IndexMap;
use shared::{ButtonStates, ChatId, ChatStatus, Project, ProjectId, ProjectState};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

pub const SELECT_PLACEHOLDER: &str = "Select project";
pub const EMPTY_LIST_TEXT: &str = "No projects yet.";

// ===== VIEW STATE =====

/// Derived each pass, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    pub current_chat: Option<ChatId>,
    pub status: ChatStatus,
    pub projects: Vec<Project>,
    pub chats_by_project: IndexMap<ProjectId, Vec<ChatId>>,
    pub scraped: IndexMap<ChatId, ScrapedChat>,
}

impl ViewState {
    pub fn derive(
        state: &ProjectState,
        current_chat: Option<ChatId>,
        scraped: IndexMap<ChatId, ScrapedChat>,
    ) -> Self {
        let chats_by_project = state
            .projects
            .iter()
            .map(|project| (project.id.clone(), state.chats_in(&project.id)))
            .collect();
        Self {
            status: state.chat_status(current_chat.as_ref()),
            current_chat,
            projects: state.projects.clone(),
            chats_by_project,
            scraped,
        }
    }

    pub fn select_model(&self) -> SelectModel {
        let selected = self
            .status
            .assigned_project()
            .filter(|id| self.projects.iter().any(|project| &project.id == *id))
            .cloned();
        SelectModel {
            options: self
                .projects
                .iter()
                .map(|project| (project.id.clone(), project.name.clone()))
                .collect(),
            selected,
        }
    }

    pub fn list_model(&self) -> ListModel {
        let rows = self
            .projects
            .iter()
            .map(|project| {
                let chats: Vec<ListChat> = self
                    .chats_by_project
                    .get(&project.id)
                    .map(Vec::as_slice)
                    .unwrap_or_default()
                    .iter()
                    .map(|chat| self.list_chat(chat))
                    .collect();
                ListRow {
                    project: project.id.clone(),
                    name: project.name.clone(),
                    count: chats.len(),
                    chats,
                }
            })
            .collect();
        ListModel { rows }
    }

    pub fn status_model(&self) -> StatusModel {
        StatusModel {
            text: self.status.text(),
            degraded: self.status.is_degraded(),
        }
    }

    pub fn buttons_model(&self) -> ButtonStates {
        self.status.buttons()
    }

    fn list_chat(&self, chat: &ChatId) -> ListChat {
        let scraped = self.scraped.get(chat);
        let title = scraped
            .map(|scraped| scraped.title.as_str())
            .filter(|title| !title.is_empty())
            .unwrap_or(chat.as_str())
            .to_string();
        ListChat {
            id: chat.clone(),
            title,
            path: scraped.map(|scraped| scraped.path.clone()),
            current: self.current_chat.as_ref() == Some(chat),
        }
    }
}

// ===== REGION MODELS =====

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SelectModel {
    pub options: Vec<(ProjectId, String)>,
    pub selected: Option<ProjectId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ListModel {
    pub rows: Vec<ListRow>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ListRow {
    pub project: ProjectId,
    pub name: String,
    pub count: usize,
    pub chats: Vec<ListChat>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ListChat {
    pub id: ChatId,
    pub title: String,
    pub path: Option<String>,
    pub current: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StatusModel {
    pub text: String,
    pub degraded: bool,
}

pub fn fingerprint<T: Hash>(model: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    model.hash(&mut hasher);
    hasher.finish()
}

// ===== RENDERER =====

/// Fingerprints of what is currently on screen. `None` forces a rebuild.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewCache {
    select: Option<u64>,
    list: Option<u64>,
    status: Option<u64>,
    buttons: Option<u64>,
}

/// Regions rebuilt by one pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PatchReport {
    pub select: bool,
    pub list: bool,
    pub status: bool,
    pub buttons: bool,
}

impl PatchReport {
    pub fn is_empty(&self) -> bool {
        !(self.select || self.list || self.status || self.buttons)
    }
}

#[derive(Debug, Default)]
pub struct DiffedRenderer {
    cache: ViewCache,
}

impl DiffedRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget every fingerprint so the next pass repaints the whole panel.
    pub fn invalidate(&mut self) {
        self.cache = ViewCache::default();
    }

    pub fn patch<D: HostDom>(
        &mut self,
        dom: &D,
        panel: &PanelHandles<D::Node>,
        view: &ViewState,
    ) -> Result<PatchReport, DomError> {
        let mut report = PatchReport::default();

        let select = view.select_model();
        report.select = patch_region(&mut self.cache.select, &select, || {
            render_select(dom, &panel.select, &select)
        })?;

        let list = view.list_model();
        report.list = patch_region(&mut self.cache.list, &list, || {
            render_list(dom, &panel.list, &list)
        })?;

        let status = view.status_model();
        report.status = patch_region(&mut self.cache.status, &status, || {
            render_status(dom, &panel.status, &status)
        })?;

        let buttons = view.buttons_model();
        report.buttons = patch_region(&mut self.cache.buttons, &buttons, || {
            set_enabled(dom, &panel.assign_button, buttons.assign_enabled)?;
            set_enabled(dom, &panel.unassign_button, buttons.unassign_enabled)
        })?;

        if !report.is_empty() {
            log::debug!("🎨 Patched regions {report:?}");
        }
        Ok(report)
    }
}

/// Run `render` when `model` differs from what `slot` last recorded. The
/// slot is cleared while rendering so a failed write is retried next pass.
fn patch_region<T: Hash>(
    slot: &mut Option<u64>,
    model: &T,
    render: impl FnOnce() -> Result<(), DomError>,
) -> Result<bool, DomError> {
    let print = fingerprint(model);
    if *slot == Some(print) {
        return Ok(false);
    }
    *slot = None;
    render()?;
    *slot = Some(print);
    Ok(true)
}

fn render_select<D: HostDom>(
    dom: &D,
    select: &D::Node,
    model: &SelectModel,
) -> Result<(), DomError> {
    let mut options = Vec::with_capacity(model.options.len() + 1);
    options.push(text_element(dom, "option", &[("value", "")], SELECT_PLACEHOLDER)?);
    for (id, name) in &model.options {
        options.push(text_element(dom, "option", &[("value", id.as_str())], name)?);
    }
    dom.replace_children(select, &options)?;
    let selected = model.selected.as_ref().map(ProjectId::as_str).unwrap_or("");
    dom.set_value(select, selected)
}

fn render_list<D: HostDom>(dom: &D, list: &D::Node, model: &ListModel) -> Result<(), DomError> {
    if model.rows.is_empty() {
        let empty = text_element(dom, "div", &[("class", "dsco-empty")], EMPTY_LIST_TEXT)?;
        return dom.replace_children(list, &[empty]);
    }

    let rows = model
        .rows
        .iter()
        .map(|row| render_row(dom, row))
        .collect::<Result<Vec<_>, _>>()?;
    dom.replace_children(list, &rows)
}

fn render_row<D: HostDom>(dom: &D, row: &ListRow) -> Result<D::Node, DomError> {
    let project = row.project.as_str();
    let has_current = row.chats.iter().any(|chat| chat.current);
    let class = if has_current {
        "dsco-row dsco-row-current"
    } else {
        "dsco-row"
    };
    let node = element(dom, "div", &[("class", class), (PROJECT_ATTR, project)])?;

    let head = element(dom, "div", &[("class", "dsco-row-head")])?;
    let head_children = [
        text_element(dom, "div", &[("class", "dsco-row-name")], &row.name)?,
        text_element(dom, "div", &[("class", "dsco-row-count")], &row.count.to_string())?,
        text_element(
            dom,
            "button",
            &[
                ("class", "dsco-btn dsco-btn-small"),
                (ACTION_ATTR, "rename"),
                (PROJECT_ATTR, project),
            ],
            "Rename",
        )?,
        text_element(
            dom,
            "button",
            &[
                ("class", "dsco-btn dsco-btn-small dsco-btn-ghost"),
                (ACTION_ATTR, "delete"),
                (PROJECT_ATTR, project),
            ],
            "Delete",
        )?,
    ];
    dom.replace_children(&head, &head_children)?;

    let chats = element(dom, "div", &[("class", "dsco-row-chats")])?;
    let chat_nodes = row
        .chats
        .iter()
        .map(|chat| render_chat(dom, chat))
        .collect::<Result<Vec<_>, _>>()?;
    dom.replace_children(&chats, &chat_nodes)?;

    dom.replace_children(&node, &[head, chats])?;
    Ok(node)
}

fn render_chat<D: HostDom>(dom: &D, chat: &ListChat) -> Result<D::Node, DomError> {
    let node = match &chat.path {
        Some(path) => text_element(
            dom,
            "a",
            &[("class", "dsco-chat"), ("href", path)],
            &chat.title,
        )?,
        None => text_element(dom, "span", &[("class", "dsco-chat")], &chat.title)?,
    };
    if chat.current {
        dom.set_attribute(&node, "data-dsco-current", "true")?;
    }
    Ok(node)
}

fn render_status<D: HostDom>(
    dom: &D,
    status: &D::Node,
    model: &StatusModel,
) -> Result<(), DomError> {
    dom.set_text(status, &model.text)?;
    if model.degraded {
        dom.set_attribute(status, DEGRADED_ATTR, "true")
    } else {
        dom.remove_attribute(status, DEGRADED_ATTR)
    }
}

fn set_enabled<D: HostDom>(dom: &D, button: &D::Node, enabled: bool) -> Result<(), DomError> {
    if enabled {
        dom.remove_attribute(button, "disabled")
    } else {
        dom.set_attribute(button, "disabled", "")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::fixture::{FixtureDom, NodeId};
    use crate::panel::build_panel;
    use shared::IdSeed;
    use shared::config::PanelSection;

    fn setup() -> (FixtureDom, PanelHandles<NodeId>) {
        let dom = FixtureDom::new();
        let panel = build_panel(&dom, &PanelSection::default()).unwrap();
        dom.append_child(&dom.body_node(), &panel.root).unwrap();
        (dom, panel)
    }

    fn chat() -> ChatId {
        ChatId::new("abcdef123")
    }

    fn work_state() -> (ProjectState, ProjectId) {
        let mut state = ProjectState::default();
        let id = state.insert_project("Work", IdSeed::new(1, 1)).unwrap();
        (state, id)
    }

    fn disabled(dom: &FixtureDom, node: NodeId) -> bool {
        dom.attribute(&node, "disabled").is_some()
    }

    #[test]
    fn test_identical_view_renders_nothing_the_second_time() {
        let (dom, panel) = setup();
        let (mut state, work) = work_state();
        state.assign(&chat(), &work).unwrap();
        let view = ViewState::derive(&state, Some(chat()), IndexMap::new());

        let mut renderer = DiffedRenderer::new();
        let first = renderer.patch(&dom, &panel, &view).unwrap();
        assert!(first.select && first.list && first.status && first.buttons);

        dom.reset_mutations();
        let second = renderer.patch(&dom, &panel, &view).unwrap();
        assert!(second.is_empty());
        assert_eq!(dom.mutation_count(), 0);
    }

    #[test]
    fn test_status_change_leaves_list_untouched() {
        let (dom, panel) = setup();
        let (mut state, work) = work_state();
        let mut renderer = DiffedRenderer::new();

        renderer
            .patch(&dom, &panel, &ViewState::derive(&state, Some(chat()), IndexMap::new()))
            .unwrap();
        let rows_before = dom.children(panel.list);

        // Assigning another chat grows the list.
        state.assign(&ChatId::new("zyxwvu987"), &work).unwrap();
        renderer
            .patch(&dom, &panel, &ViewState::derive(&state, None, IndexMap::new()))
            .unwrap();
        let rows_mid = dom.children(panel.list);
        assert_ne!(rows_before, rows_mid);

        // Switching the current chat alone only touches the status region.
        let report = renderer
            .patch(&dom, &panel, &ViewState::derive(&state, Some(chat()), IndexMap::new()))
            .unwrap();
        assert!(!report.list);
        assert!(report.status);
        assert_eq!(dom.children(panel.list), rows_mid);
    }

    #[test]
    fn test_button_state_machine() {
        let (dom, panel) = setup();
        let (mut state, work) = work_state();
        let mut renderer = DiffedRenderer::new();

        renderer
            .patch(&dom, &panel, &ViewState::derive(&state, None, IndexMap::new()))
            .unwrap();
        assert_eq!(dom.text(&panel.status), "Open a chat to assign it.");
        assert!(disabled(&dom, panel.assign_button));
        assert!(disabled(&dom, panel.unassign_button));

        renderer
            .patch(&dom, &panel, &ViewState::derive(&state, Some(chat()), IndexMap::new()))
            .unwrap();
        assert_eq!(dom.text(&panel.status), "Not assigned.");
        assert!(!disabled(&dom, panel.assign_button));
        assert!(disabled(&dom, panel.unassign_button));

        state.assign(&chat(), &work).unwrap();
        renderer
            .patch(&dom, &panel, &ViewState::derive(&state, Some(chat()), IndexMap::new()))
            .unwrap();
        assert_eq!(dom.text(&panel.status), "Assigned to: Work");
        assert!(!disabled(&dom, panel.assign_button));
        assert!(!disabled(&dom, panel.unassign_button));
        assert_eq!(dom.value(panel.select), work.as_str());
        assert_eq!(dom.attribute(&panel.status, DEGRADED_ATTR), None);

        // Dangling mapping: tolerated and flagged.
        state.projects.clear();
        renderer
            .patch(&dom, &panel, &ViewState::derive(&state, Some(chat()), IndexMap::new()))
            .unwrap();
        assert_eq!(dom.text(&panel.status), "Assigned to a missing project.");
        assert_eq!(dom.attribute(&panel.status, DEGRADED_ATTR).as_deref(), Some("true"));
        assert!(!disabled(&dom, panel.assign_button));
        assert!(!disabled(&dom, panel.unassign_button));
        assert_eq!(dom.value(panel.select), "");
        assert_eq!(dom.text(&panel.list), EMPTY_LIST_TEXT);
    }

    #[test]
    fn test_list_rows_use_scraped_titles() {
        let (dom, panel) = setup();
        let (mut state, work) = work_state();
        state.assign(&chat(), &work).unwrap();
        state.assign(&ChatId::new("zyxwvu987"), &work).unwrap();

        let mut scraped = IndexMap::new();
        scraped.insert(
            chat(),
            ScrapedChat {
                title: "Trip plans".to_string(),
                path: "/a/chat/s/abcdef123".to_string(),
            },
        );
        let view = ViewState::derive(&state, Some(chat()), scraped);

        let list = view.list_model();
        assert_eq!(list.rows.len(), 1);
        assert_eq!(list.rows[0].count, 2);
        assert_eq!(list.rows[0].chats[0].title, "Trip plans");
        assert!(list.rows[0].chats[0].current);
        assert_eq!(list.rows[0].chats[1].title, "zyxwvu987");
        assert_eq!(list.rows[0].chats[1].path, None);

        DiffedRenderer::new().patch(&dom, &panel, &view).unwrap();
        assert_eq!(dom.text(&panel.list), "Work2RenameDeleteTrip planszyxwvu987");
        let select_options = dom.children(panel.select);
        assert_eq!(select_options.len(), 2);
        assert_eq!(dom.text(&select_options[0]), SELECT_PLACEHOLDER);
    }

    #[test]
    fn test_invalidate_forces_full_repaint() {
        let (dom, panel) = setup();
        let (state, _) = work_state();
        let view = ViewState::derive(&state, None, IndexMap::new());
        let mut renderer = DiffedRenderer::new();

        renderer.patch(&dom, &panel, &view).unwrap();
        renderer.invalidate();
        let report = renderer.patch(&dom, &panel, &view).unwrap();
        assert!(report.select && report.list && report.status && report.buttons);
    }

    #[test]
    fn test_fingerprint_tracks_content() {
        let a = StatusModel {
            text: "Not assigned.".to_string(),
            degraded: false,
        };
        let mut b = a.clone();
        assert_eq!(fingerprint(&a), fingerprint(&b));
        b.degraded = true;
        assert_ne!(fingerprint(&a), fingerprint(&b));
    }
}
