//! [`HostDom`] over the live page.

use crate::dom::{DomError, HostDom};
use shared::Query;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, HtmlAnchorElement, HtmlSelectElement, Node, NodeList, Window};

#[derive(Clone, Debug)]
pub struct WebDom {
    window: Window,
    document: Document,
}

impl WebDom {
    pub fn new() -> Option<Self> {
        let window = web_sys::window()?;
        let document = window.document()?;
        Some(Self { window, document })
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn document(&self) -> &Document {
        &self.document
    }
}

fn js_error(operation: &'static str) -> impl Fn(JsValue) -> DomError {
    move |error| DomError::operation(operation, format!("{error:?}"))
}

pub fn elements(list: &NodeList) -> Vec<Element> {
    (0..list.length())
        .filter_map(|index| list.item(index))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

impl HostDom for WebDom {
    type Node = Element;

    fn pathname(&self) -> String {
        self.window.location().pathname().unwrap_or_default()
    }

    fn query(&self, scope: Option<&Element>, query: &Query) -> Vec<Element> {
        let selector = query.to_css();
        let result = match scope {
            Some(scope) => scope.query_selector_all(&selector),
            None => self.document.query_selector_all(&selector),
        };
        match result {
            Ok(list) => elements(&list),
            Err(error) => {
                log::warn!("⚠️ Invalid selector `{selector}`: {error:?}");
                Vec::new()
            }
        }
    }

    fn parent(&self, node: &Element) -> Option<Element> {
        node.parent_element()
    }

    fn previous_sibling(&self, node: &Element) -> Option<Element> {
        node.previous_element_sibling()
    }

    fn next_sibling(&self, node: &Element) -> Option<Element> {
        node.next_element_sibling()
    }

    fn is_connected(&self, node: &Element) -> bool {
        node.is_connected()
    }

    fn contains(&self, ancestor: &Element, node: &Element) -> bool {
        let node: &Node = node.as_ref();
        ancestor.contains(Some(node))
    }

    fn tag_name(&self, node: &Element) -> String {
        node.local_name()
    }

    fn attribute(&self, node: &Element, name: &str) -> Option<String> {
        node.get_attribute(name)
    }

    fn text(&self, node: &Element) -> String {
        node.text_content().unwrap_or_default()
    }

    fn link_path(&self, node: &Element) -> Option<String> {
        let anchor = node.dyn_ref::<HtmlAnchorElement>()?;
        anchor.has_attribute("href").then(|| anchor.pathname())
    }

    fn is_scroll_container(&self, node: &Element) -> bool {
        let Ok(Some(style)) = self.window.get_computed_style(node) else {
            return false;
        };
        let overflow = style.get_property_value("overflow-y").unwrap_or_default();
        matches!(overflow.as_str(), "auto" | "scroll")
            && node.scroll_height() > node.client_height()
    }

    fn create_element(&self, tag: &str) -> Result<Element, DomError> {
        self.document
            .create_element(tag)
            .map_err(|_| DomError::Create(tag.to_string()))
    }

    fn set_attribute(&self, node: &Element, name: &str, value: &str) -> Result<(), DomError> {
        node.set_attribute(name, value).map_err(js_error("set_attribute"))
    }

    fn remove_attribute(&self, node: &Element, name: &str) -> Result<(), DomError> {
        node.remove_attribute(name).map_err(js_error("remove_attribute"))
    }

    fn set_text(&self, node: &Element, text: &str) -> Result<(), DomError> {
        node.set_text_content(Some(text));
        Ok(())
    }

    fn set_value(&self, node: &Element, value: &str) -> Result<(), DomError> {
        let select = node
            .dyn_ref::<HtmlSelectElement>()
            .ok_or_else(|| DomError::operation("set_value", "not a <select>"))?;
        select.set_value(value);
        Ok(())
    }

    fn append_child(&self, parent: &Element, child: &Element) -> Result<(), DomError> {
        parent
            .append_child(child)
            .map(drop)
            .map_err(js_error("append_child"))
    }

    fn insert_before(
        &self,
        parent: &Element,
        child: &Element,
        reference: Option<&Element>,
    ) -> Result<(), DomError> {
        let reference: Option<&Node> = reference.map(|reference| reference.as_ref());
        parent
            .insert_before(child, reference)
            .map(drop)
            .map_err(js_error("insert_before"))
    }

    fn remove(&self, node: &Element) -> Result<(), DomError> {
        node.remove();
        Ok(())
    }

    fn replace_children(&self, parent: &Element, children: &[Element]) -> Result<(), DomError> {
        parent.set_text_content(None);
        for child in children {
            self.append_child(parent, child)?;
        }
        Ok(())
    }
}
