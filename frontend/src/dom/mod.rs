//! Host DOM capability.
//!
//! The engine never touches `web_sys` directly. Everything it needs from the
//! page goes through [`HostDom`], implemented by the browser platform and by
//! the synthetic fixture used in tests.

use shared::Query;

#[cfg(test)]
pub mod fixture;

/// Marker attribute carried by the injected panel root.
pub const PANEL_ROOT_ATTR: &str = "data-dsco-root";

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DomError {
    #[error("failed to create <{0}>")]
    Create(String),
    #[error("DOM operation `{operation}` failed: {message}")]
    Operation {
        operation: &'static str,
        message: String,
    },
}

impl DomError {
    pub fn operation(operation: &'static str, message: impl Into<String>) -> Self {
        Self::Operation {
            operation,
            message: message.into(),
        }
    }
}

pub trait HostDom {
    /// Element handle; equality is node identity.
    type Node: Clone + PartialEq + std::fmt::Debug;

    /// Path of the host page's current location.
    fn pathname(&self) -> String;

    /// Descendants of `scope` (or of the whole document) matching `query`,
    /// in document order.
    fn query(&self, scope: Option<&Self::Node>, query: &Query) -> Vec<Self::Node>;

    fn parent(&self, node: &Self::Node) -> Option<Self::Node>;
    fn previous_sibling(&self, node: &Self::Node) -> Option<Self::Node>;
    fn next_sibling(&self, node: &Self::Node) -> Option<Self::Node>;
    fn is_connected(&self, node: &Self::Node) -> bool;
    /// Inclusive: a node contains itself.
    fn contains(&self, ancestor: &Self::Node, node: &Self::Node) -> bool;

    /// Lowercase tag name.
    fn tag_name(&self, node: &Self::Node) -> String;
    fn attribute(&self, node: &Self::Node, name: &str) -> Option<String>;
    fn text(&self, node: &Self::Node) -> String;
    /// Path component of a link target, for anchors only.
    fn link_path(&self, node: &Self::Node) -> Option<String>;
    fn is_scroll_container(&self, node: &Self::Node) -> bool;

    // ===== MUTATIONS =====

    fn create_element(&self, tag: &str) -> Result<Self::Node, DomError>;
    fn set_attribute(&self, node: &Self::Node, name: &str, value: &str) -> Result<(), DomError>;
    fn remove_attribute(&self, node: &Self::Node, name: &str) -> Result<(), DomError>;
    fn set_text(&self, node: &Self::Node, text: &str) -> Result<(), DomError>;
    /// Current value of a form control (`<select>`).
    fn set_value(&self, node: &Self::Node, value: &str) -> Result<(), DomError>;
    fn append_child(&self, parent: &Self::Node, child: &Self::Node) -> Result<(), DomError>;
    /// Insert `child` before `reference`, or append when `reference` is `None`.
    fn insert_before(
        &self,
        parent: &Self::Node,
        child: &Self::Node,
        reference: Option<&Self::Node>,
    ) -> Result<(), DomError>;
    fn remove(&self, node: &Self::Node) -> Result<(), DomError>;
    fn replace_children(
        &self,
        parent: &Self::Node,
        children: &[Self::Node],
    ) -> Result<(), DomError>;

    // ===== PROVIDED =====

    /// Whether `node` sits inside an injected panel (any instance).
    fn is_inside_panel(&self, node: &Self::Node) -> bool {
        let mut current = Some(node.clone());
        while let Some(candidate) = current {
            if self.attribute(&candidate, PANEL_ROOT_ATTR).is_some() {
                return true;
            }
            current = self.parent(&candidate);
        }
        false
    }

    /// Ancestors from the parent upwards.
    fn ancestors(&self, node: &Self::Node) -> Vec<Self::Node> {
        let mut ancestors = Vec::new();
        let mut current = self.parent(node);
        while let Some(parent) = current {
            current = self.parent(&parent);
            ancestors.push(parent);
        }
        ancestors
    }
}
