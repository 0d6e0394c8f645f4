//! Attachment Manager
//!
//! Keeps exactly one panel mounted at a deterministic slot: right after the
//! host's "new chat" control when there is one, otherwise at the end of the
//! navigation container.

use crate::dom::{DomError, HostDom, PANEL_ROOT_ATTR};
use crate::locator::NavLocation;
use crate::panel::{PanelHandles, build_panel};
use shared::config::PanelSection;
use shared::{AttrFilter, Query};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attachment {
    /// Already at its slot; nothing was touched.
    Unchanged,
    /// Existing panel moved back into place after a host rebuild.
    Mounted,
    /// Panel built and mounted for the first time.
    Created,
    /// No navigation container yet.
    Unavailable,
}

pub struct AttachmentManager<N> {
    config: PanelSection,
    panel: Option<PanelHandles<N>>,
}

impl<N: Clone + PartialEq + std::fmt::Debug> AttachmentManager<N> {
    pub fn new(config: &PanelSection) -> Self {
        Self {
            config: config.clone(),
            panel: None,
        }
    }

    pub fn panel(&self) -> Option<&PanelHandles<N>> {
        self.panel.as_ref()
    }

    pub fn is_attached<D: HostDom<Node = N>>(&self, dom: &D) -> bool {
        self.panel
            .as_ref()
            .is_some_and(|panel| dom.is_connected(&panel.root))
    }

    pub fn ensure_attached<D: HostDom<Node = N>>(
        &mut self,
        dom: &D,
        location: Option<&NavLocation<N>>,
    ) -> Result<Attachment, DomError> {
        let Some(location) = location else {
            return Ok(Attachment::Unavailable);
        };
        let (parent, after) = slot(dom, location);

        if let Some(panel) = &self.panel {
            if is_at_slot(dom, &panel.root, &parent, after.as_ref()) {
                return Ok(Attachment::Unchanged);
            }
            place(dom, &panel.root, &parent, after.as_ref())?;
            log::info!("📌 Panel re-attached to {:?}", location.strategy);
            return Ok(Attachment::Mounted);
        }

        remove_strays(dom)?;
        let panel = build_panel(dom, &self.config)?;
        place(dom, &panel.root, &parent, after.as_ref())?;
        self.panel = Some(panel);
        log::info!("📌 Panel mounted via {:?}", location.strategy);
        Ok(Attachment::Created)
    }

    /// Take the panel out of the page. The handles are kept so a later
    /// enable re-mounts the same tree.
    pub fn detach<D: HostDom<Node = N>>(&mut self, dom: &D) -> Result<bool, DomError> {
        match &self.panel {
            Some(panel) if dom.parent(&panel.root).is_some() => {
                dom.remove(&panel.root)?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

/// Parent to mount into and the sibling the panel must directly follow.
fn slot<D: HostDom>(dom: &D, location: &NavLocation<D::Node>) -> (D::Node, Option<D::Node>) {
    if let Some(anchor) = &location.new_chat_anchor {
        if let Some(parent) = dom.parent(anchor) {
            return (parent, Some(anchor.clone()));
        }
    }
    (location.container.clone(), None)
}

fn is_at_slot<D: HostDom>(
    dom: &D,
    root: &D::Node,
    parent: &D::Node,
    after: Option<&D::Node>,
) -> bool {
    if dom.parent(root).as_ref() != Some(parent) || !dom.is_connected(root) {
        return false;
    }
    match after {
        Some(anchor) => dom.previous_sibling(root).as_ref() == Some(anchor),
        None => true,
    }
}

fn place<D: HostDom>(
    dom: &D,
    root: &D::Node,
    parent: &D::Node,
    after: Option<&D::Node>,
) -> Result<(), DomError> {
    match after {
        Some(anchor) => {
            let reference = dom.next_sibling(anchor).filter(|next| next != root);
            dom.insert_before(parent, root, reference.as_ref())
        }
        None => dom.append_child(parent, root),
    }
}

fn remove_strays<D: HostDom>(dom: &D) -> Result<(), DomError> {
    let strays = dom.query(None, &Query::any().with_attr(AttrFilter::present(PANEL_ROOT_ATTR)));
    if !strays.is_empty() {
        log::debug!("🧹 Removing {} stale panel instance(s)", strays.len());
    }
    for stray in strays {
        dom.remove(&stray)?;
    }
    Ok(())
}
