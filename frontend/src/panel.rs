//! Static skeleton of the injected panel.
//!
//! Built once per engine; the renderer only ever patches the regions held
//! in [`PanelHandles`].

use crate::dom::{DomError, HostDom, PANEL_ROOT_ATTR};
use shared::config::PanelSection;

pub const ACTION_ATTR: &str = "data-dsco-action";
pub const PROJECT_ATTR: &str = "data-dsco-project";
pub const ROLE_ATTR: &str = "data-dsco-role";
pub const DEGRADED_ATTR: &str = "data-dsco-degraded";

pub const LOADING_TEXT: &str = "Loading…";

#[derive(Debug, Clone, PartialEq)]
pub struct PanelHandles<N> {
    pub root: N,
    pub select: N,
    pub status: N,
    pub list: N,
    pub assign_button: N,
    pub unassign_button: N,
}

pub fn element<D: HostDom>(
    dom: &D,
    tag: &str,
    attrs: &[(&str, &str)],
) -> Result<D::Node, DomError> {
    let node = dom.create_element(tag)?;
    for (name, value) in attrs {
        dom.set_attribute(&node, name, value)?;
    }
    Ok(node)
}

pub fn text_element<D: HostDom>(
    dom: &D,
    tag: &str,
    attrs: &[(&str, &str)],
    text: &str,
) -> Result<D::Node, DomError> {
    let node = element(dom, tag, attrs)?;
    dom.set_text(&node, text)?;
    Ok(node)
}

/// Create the detached panel tree. Placement is left to the attachment
/// manager.
pub fn build_panel<D: HostDom>(
    dom: &D,
    config: &PanelSection,
) -> Result<PanelHandles<D::Node>, DomError> {
    let root = element(dom, "div", &[(PANEL_ROOT_ATTR, ""), ("class", "dsco-root")])?;

    let header = element(dom, "div", &[("class", "dsco-header")])?;
    let title = text_element(dom, "div", &[("class", "dsco-title")], &config.title)?;
    let new_button = text_element(
        dom,
        "button",
        &[("class", "dsco-btn dsco-btn-small"), (ACTION_ATTR, "new")],
        "New",
    )?;
    dom.replace_children(&header, &[title, new_button])?;

    let controls = element(dom, "div", &[("class", "dsco-controls")])?;
    let select = element(
        dom,
        "select",
        &[("class", "dsco-select"), (ROLE_ATTR, "project-select")],
    )?;
    let assign_button = text_element(
        dom,
        "button",
        &[("class", "dsco-btn"), (ACTION_ATTR, "assign"), ("disabled", "")],
        "Assign",
    )?;
    let unassign_button = text_element(
        dom,
        "button",
        &[
            ("class", "dsco-btn dsco-btn-ghost"),
            (ACTION_ATTR, "unassign"),
            ("disabled", ""),
        ],
        "Unassign",
    )?;
    dom.replace_children(
        &controls,
        &[select.clone(), assign_button.clone(), unassign_button.clone()],
    )?;

    let status = text_element(
        dom,
        "div",
        &[("class", "dsco-status"), (ROLE_ATTR, "status")],
        LOADING_TEXT,
    )?;
    let list = element(dom, "div", &[("class", "dsco-list"), (ROLE_ATTR, "list")])?;

    dom.replace_children(&root, &[header, controls, status.clone(), list.clone()])?;

    Ok(PanelHandles {
        root,
        select,
        status,
        list,
        assign_button,
        unassign_button,
    })
}
