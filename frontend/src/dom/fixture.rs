//! Synthetic in-memory DOM for tests.
//!
//! Builder helpers (`el`, `link`, `host_remove`, ...) stand in for the host
//! app and are not counted; every [`HostDom`] mutation is, so tests can
//! assert that a pass touched nothing.

use super::{DomError, HostDom};
use shared::Query;
use std::cell::{Cell, RefCell};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Default)]
struct NodeData {
    tag: String,
    attrs: Vec<(String, String)>,
    text: String,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
    scrollable: bool,
    value: String,
}

pub struct FixtureDom {
    nodes: RefCell<Vec<NodeData>>,
    root: NodeId,
    body: NodeId,
    path: RefCell<String>,
    mutations: Cell<usize>,
}

impl FixtureDom {
    pub fn new() -> Self {
        let dom = Self {
            nodes: RefCell::new(Vec::new()),
            root: NodeId(0),
            body: NodeId(1),
            path: RefCell::new("/".to_string()),
            mutations: Cell::new(0),
        };
        let root = dom.alloc("html", &[]);
        let body = dom.alloc("body", &[]);
        dom.attach(root, body, None);
        dom
    }

    pub fn set_path(&self, path: &str) {
        *self.path.borrow_mut() = path.to_string();
    }

    pub fn body_node(&self) -> NodeId {
        self.body
    }

    pub fn mutation_count(&self) -> usize {
        self.mutations.get()
    }

    pub fn reset_mutations(&self) {
        self.mutations.set(0);
    }

    // ===== HOST-SIDE BUILDERS =====

    pub fn el(&self, parent: NodeId, tag: &str, attrs: &[(&str, &str)]) -> NodeId {
        let node = self.alloc(tag, attrs);
        self.attach(parent, node, None);
        node
    }

    pub fn text_el(&self, parent: NodeId, tag: &str, attrs: &[(&str, &str)], text: &str) -> NodeId {
        let node = self.el(parent, tag, attrs);
        self.nodes.borrow_mut()[node.0].text = text.to_string();
        node
    }

    pub fn link(&self, parent: NodeId, href: &str, text: &str) -> NodeId {
        self.text_el(parent, "a", &[("href", href)], text)
    }

    pub fn mark_scrollable(&self, node: NodeId) {
        self.nodes.borrow_mut()[node.0].scrollable = true;
    }

    /// Remove a subtree the way a host-side re-render would.
    pub fn host_remove(&self, node: NodeId) {
        self.detach(node);
    }

    /// Insert a host element at `index` among `parent`'s children.
    pub fn host_insert(&self, parent: NodeId, tag: &str, index: usize) -> NodeId {
        let node = self.alloc(tag, &[]);
        self.attach(parent, node, Some(index));
        node
    }

    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.nodes.borrow()[node.0].children.clone()
    }

    pub fn value(&self, node: NodeId) -> String {
        self.nodes.borrow()[node.0].value.clone()
    }

    /// Every connected element carrying `attr`.
    pub fn count_with_attr(&self, attr: &str) -> usize {
        self.query(None, &Query::any().with_attr(shared::AttrFilter::present(attr)))
            .len()
    }

    // ===== INTERNALS =====

    fn alloc(&self, tag: &str, attrs: &[(&str, &str)]) -> NodeId {
        let mut nodes = self.nodes.borrow_mut();
        nodes.push(NodeData {
            tag: tag.to_ascii_lowercase(),
            attrs: attrs
                .iter()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect(),
            ..NodeData::default()
        });
        NodeId(nodes.len() - 1)
    }

    fn attach(&self, parent: NodeId, child: NodeId, index: Option<usize>) {
        self.detach(child);
        let mut nodes = self.nodes.borrow_mut();
        let children = &mut nodes[parent.0].children;
        match index {
            Some(index) if index <= children.len() => children.insert(index, child),
            _ => children.push(child),
        }
        nodes[child.0].parent = Some(parent);
    }

    fn detach(&self, child: NodeId) {
        let mut nodes = self.nodes.borrow_mut();
        if let Some(parent) = nodes[child.0].parent.take() {
            nodes[parent.0].children.retain(|node| *node != child);
        }
    }

    fn mutated(&self) {
        self.mutations.set(self.mutations.get() + 1);
    }

    fn collect_descendants(&self, node: NodeId, out: &mut Vec<NodeId>) {
        let children = self.nodes.borrow()[node.0].children.clone();
        for child in children {
            out.push(child);
            self.collect_descendants(child, out);
        }
    }

    fn sibling(&self, node: NodeId, offset: isize) -> Option<NodeId> {
        let nodes = self.nodes.borrow();
        let parent = nodes[node.0].parent?;
        let siblings = &nodes[parent.0].children;
        let position = siblings.iter().position(|candidate| *candidate == node)?;
        let target = position.checked_add_signed(offset)?;
        siblings.get(target).copied()
    }
}

impl HostDom for FixtureDom {
    type Node = NodeId;

    fn pathname(&self) -> String {
        self.path.borrow().clone()
    }

    fn query(&self, scope: Option<&NodeId>, query: &Query) -> Vec<NodeId> {
        let mut descendants = Vec::new();
        self.collect_descendants(*scope.unwrap_or(&self.root), &mut descendants);
        let nodes = self.nodes.borrow();
        descendants
            .into_iter()
            .filter(|node| {
                let data = &nodes[node.0];
                query.matches(&data.tag, |name| {
                    data.attrs
                        .iter()
                        .find(|(attr, _)| attr == name)
                        .map(|(_, value)| value.as_str())
                })
            })
            .collect()
    }

    fn parent(&self, node: &NodeId) -> Option<NodeId> {
        self.nodes.borrow()[node.0].parent
    }

    fn previous_sibling(&self, node: &NodeId) -> Option<NodeId> {
        self.sibling(*node, -1)
    }

    fn next_sibling(&self, node: &NodeId) -> Option<NodeId> {
        self.sibling(*node, 1)
    }

    fn is_connected(&self, node: &NodeId) -> bool {
        *node == self.root || self.ancestors(node).last() == Some(&self.root)
    }

    fn contains(&self, ancestor: &NodeId, node: &NodeId) -> bool {
        node == ancestor || self.ancestors(node).contains(ancestor)
    }

    fn tag_name(&self, node: &NodeId) -> String {
        self.nodes.borrow()[node.0].tag.clone()
    }

    fn attribute(&self, node: &NodeId, name: &str) -> Option<String> {
        self.nodes.borrow()[node.0]
            .attrs
            .iter()
            .find(|(attr, _)| attr == name)
            .map(|(_, value)| value.clone())
    }

    fn text(&self, node: &NodeId) -> String {
        let mut text = self.nodes.borrow()[node.0].text.clone();
        for child in self.children(*node) {
            text.push_str(&self.text(&child));
        }
        text
    }

    fn link_path(&self, node: &NodeId) -> Option<String> {
        if self.tag_name(node) != "a" {
            return None;
        }
        let href = self.attribute(node, "href")?;
        match href.split_once("://") {
            Some((_, rest)) => Some(rest.find('/').map_or("/", |at| &rest[at..]).to_string()),
            None => Some(href),
        }
    }

    fn is_scroll_container(&self, node: &NodeId) -> bool {
        self.nodes.borrow()[node.0].scrollable
    }

    fn create_element(&self, tag: &str) -> Result<NodeId, DomError> {
        self.mutated();
        Ok(self.alloc(tag, &[]))
    }

    fn set_attribute(&self, node: &NodeId, name: &str, value: &str) -> Result<(), DomError> {
        self.mutated();
        let mut nodes = self.nodes.borrow_mut();
        let attrs = &mut nodes[node.0].attrs;
        match attrs.iter().position(|(attr, _)| attr == name) {
            Some(index) => attrs[index].1 = value.to_string(),
            None => attrs.push((name.to_string(), value.to_string())),
        }
        Ok(())
    }

    fn remove_attribute(&self, node: &NodeId, name: &str) -> Result<(), DomError> {
        self.mutated();
        self.nodes.borrow_mut()[node.0]
            .attrs
            .retain(|(attr, _)| attr != name);
        Ok(())
    }

    fn set_text(&self, node: &NodeId, text: &str) -> Result<(), DomError> {
        self.mutated();
        for child in self.children(*node) {
            self.detach(child);
        }
        self.nodes.borrow_mut()[node.0].text = text.to_string();
        Ok(())
    }

    fn set_value(&self, node: &NodeId, value: &str) -> Result<(), DomError> {
        self.mutated();
        self.nodes.borrow_mut()[node.0].value = value.to_string();
        Ok(())
    }

    fn append_child(&self, parent: &NodeId, child: &NodeId) -> Result<(), DomError> {
        self.mutated();
        self.attach(*parent, *child, None);
        Ok(())
    }

    fn insert_before(
        &self,
        parent: &NodeId,
        child: &NodeId,
        reference: Option<&NodeId>,
    ) -> Result<(), DomError> {
        self.mutated();
        let Some(reference) = reference else {
            self.attach(*parent, *child, None);
            return Ok(());
        };
        if self.parent(reference) != Some(*parent) {
            return Err(DomError::operation("insert_before", "reference is not a child"));
        }
        self.detach(*child);
        let index = self
            .children(*parent)
            .iter()
            .position(|node| node == reference)
            .ok_or_else(|| DomError::operation("insert_before", "reference vanished"))?;
        self.attach(*parent, *child, Some(index));
        Ok(())
    }

    fn remove(&self, node: &NodeId) -> Result<(), DomError> {
        self.mutated();
        self.detach(*node);
        Ok(())
    }

    fn replace_children(&self, parent: &NodeId, children: &[NodeId]) -> Result<(), DomError> {
        self.mutated();
        for child in self.children(*parent) {
            self.detach(child);
        }
        for child in children {
            self.attach(*parent, *child, None);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_is_document_order_and_scoped() {
        let dom = FixtureDom::new();
        let nav = dom.el(dom.body_node(), "nav", &[]);
        let first = dom.link(nav, "/a/chat/s/aaaaaa1", "One");
        let group = dom.el(nav, "div", &[]);
        let second = dom.link(group, "/a/chat/s/bbbbbb2", "Two");
        dom.link(dom.body_node(), "/elsewhere", "Out");

        assert_eq!(dom.query(Some(&nav), &Query::tag("a")), vec![first, second]);
        assert_eq!(dom.query(None, &Query::tag("a")).len(), 3);
        assert_eq!(dom.text(&nav), "OneTwo");
    }

    #[test]
    fn test_connection_and_siblings() {
        let dom = FixtureDom::new();
        let nav = dom.el(dom.body_node(), "nav", &[]);
        let a = dom.el(nav, "div", &[]);
        let b = dom.el(nav, "div", &[]);
        assert_eq!(dom.next_sibling(&a), Some(b));
        assert_eq!(dom.previous_sibling(&b), Some(a));
        assert_eq!(dom.previous_sibling(&a), None);

        dom.host_remove(nav);
        assert!(!dom.is_connected(&a));
        assert!(dom.contains(&nav, &b));
        assert_eq!(dom.mutation_count(), 0);
    }

    #[test]
    fn test_link_path_strips_origin() {
        let dom = FixtureDom::new();
        let link = dom.link(dom.body_node(), "https://chat.example.com/a/chat/s/abcdef123", "x");
        assert_eq!(dom.link_path(&link).as_deref(), Some("/a/chat/s/abcdef123"));
    }
}
