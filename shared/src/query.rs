//! A small typed element query.
//!
//! Host DOM lookups are described with [`Query`] instead of raw selector
//! strings so the same description can be rendered to CSS for the browser
//! and evaluated directly against synthetic test fixtures.

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(default)]
    pub attrs: Vec<AttrFilter>,
}

/// Attribute constraint. With no matcher set only presence is required;
/// otherwise every matcher that is set must hold.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct AttrFilter {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equals: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub starts_with: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contains: Option<String>,
}

impl AttrFilter {
    pub fn present(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn equals(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            equals: Some(value.into()),
            ..Self::default()
        }
    }

    pub fn matches(&self, value: Option<&str>) -> bool {
        let Some(value) = value else {
            return false;
        };
        self.equals.as_deref().is_none_or(|expected| value == expected)
            && self.starts_with.as_deref().is_none_or(|prefix| value.starts_with(prefix))
            && self.contains.as_deref().is_none_or(|needle| value.contains(needle))
    }

    fn to_css(&self) -> String {
        let name = &self.name;
        let mut css = String::new();
        if self.equals.is_none() && self.starts_with.is_none() && self.contains.is_none() {
            css.push_str(&format!("[{name}]"));
        }
        if let Some(value) = &self.equals {
            css.push_str(&format!("[{name}=\"{}\"]", escape_css_string(value)));
        }
        if let Some(value) = &self.starts_with {
            css.push_str(&format!("[{name}^=\"{}\"]", escape_css_string(value)));
        }
        if let Some(value) = &self.contains {
            css.push_str(&format!("[{name}*=\"{}\"]", escape_css_string(value)));
        }
        css
    }
}

impl Query {
    /// Matches every element.
    pub fn any() -> Self {
        Self::default()
    }

    pub fn tag(tag: impl Into<String>) -> Self {
        Self {
            tag: Some(tag.into().to_ascii_lowercase()),
            attrs: Vec::new(),
        }
    }

    pub fn with_attr(mut self, filter: AttrFilter) -> Self {
        self.attrs.push(filter);
        self
    }

    /// Evaluate against an element given its lowercase tag and an attribute
    /// accessor.
    pub fn matches<'a>(&self, tag: &str, attribute: impl Fn(&str) -> Option<&'a str>) -> bool {
        if let Some(expected) = &self.tag {
            if !expected.eq_ignore_ascii_case(tag) {
                return false;
            }
        }
        self.attrs
            .iter()
            .all(|filter| filter.matches(attribute(&filter.name)))
    }

    pub fn to_css(&self) -> String {
        let mut css = self.tag.clone().unwrap_or_default();
        for filter in &self.attrs {
            css.push_str(&filter.to_css());
        }
        if css.is_empty() {
            css.push('*');
        }
        css
    }
}

fn escape_css_string(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
