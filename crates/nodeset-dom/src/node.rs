//! Arena node
//!
//! Links between nodes are `NodeId`s into the owning arena rather than
//! pointers, so a node can be detached and re-attached without any
//! reference counting.

use crate::{Attributes, NodeId};

/// Arena slot: tree links plus the node payload
#[derive(Debug, Clone)]
pub struct Node {
    pub parent: NodeId,
    pub first_child: NodeId,
    pub last_child: NodeId,
    pub prev_sibling: NodeId,
    pub next_sibling: NodeId,
    pub data: NodeData,
}

impl Node {
    /// Unlinked node carrying `data`
    pub(crate) fn with_data(data: NodeData) -> Self {
        Self {
            parent: NodeId::NONE,
            first_child: NodeId::NONE,
            last_child: NodeId::NONE,
            prev_sibling: NodeId::NONE,
            next_sibling: NodeId::NONE,
            data,
        }
    }

    pub fn element(tag_name: &str) -> Self {
        Self::with_data(NodeData::Element(ElementData::new(tag_name)))
    }

    pub fn text(content: impl Into<String>) -> Self {
        Self::with_data(NodeData::Text(content.into()))
    }

    pub fn comment(content: impl Into<String>) -> Self {
        Self::with_data(NodeData::Comment(content.into()))
    }

    pub fn doctype(name: impl Into<String>) -> Self {
        Self::with_data(NodeData::Doctype { name: name.into() })
    }

    pub fn document() -> Self {
        Self::with_data(NodeData::Document)
    }

    pub fn is_element(&self) -> bool {
        self.as_element().is_some()
    }

    pub fn is_text(&self) -> bool {
        self.as_text().is_some()
    }

    pub fn as_element(&self) -> Option<&ElementData> {
        match &self.data {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut ElementData> {
        match &mut self.data {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match &self.data {
            NodeData::Text(t) => Some(t),
            _ => None,
        }
    }
}

/// Node payload
#[derive(Debug, Clone)]
pub enum NodeData {
    Document,
    Doctype { name: String },
    Element(ElementData),
    Text(String),
    Comment(String),
}

/// Element-specific data
#[derive(Debug, Clone)]
pub struct ElementData {
    /// Lowercased tag name
    pub tag_name: String,
    /// Attributes in source order
    pub attrs: Attributes,
    /// Dirty form value; `None` until a script writes it
    pub value: Option<String>,
}

impl ElementData {
    pub fn new(tag_name: &str) -> Self {
        Self {
            tag_name: tag_name.to_ascii_lowercase(),
            attrs: Attributes::new(),
            value: None,
        }
    }

    /// Get an attribute value
    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name)
    }

    /// Set an attribute
    pub fn set_attr(&mut self, name: &str, value: &str) {
        self.attrs.set(name, value);
    }

    /// Remove an attribute, returning whether it existed
    pub fn remove_attr(&mut self, name: &str) -> bool {
        self.attrs.remove(name).is_some()
    }

    /// The `id` attribute
    pub fn id(&self) -> Option<&str> {
        self.get_attr("id")
    }

    /// Iterate over the class tokens
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.get_attr("class").unwrap_or("").split_whitespace()
    }

    /// Check whether the element carries `class`
    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c == class)
    }

    /// Whether this is a form control with a value
    pub fn is_form_control(&self) -> bool {
        matches!(self.tag_name.as_str(), "input" | "textarea" | "select")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_lowercases_tag() {
        let node = Node::element("DIV");
        assert_eq!(node.as_element().unwrap().tag_name, "div");
        assert!(node.is_element());
        assert!(!node.is_text());
    }

    #[test]
    fn test_element_classes() {
        let mut elem = ElementData::new("p");
        elem.set_attr("class", "  intro  lead ");
        let classes: Vec<_> = elem.classes().collect();
        assert_eq!(classes, vec!["intro", "lead"]);
        assert!(elem.has_class("lead"));
        assert!(!elem.has_class("le"));
    }

    #[test]
    fn test_form_control() {
        assert!(ElementData::new("input").is_form_control());
        assert!(ElementData::new("select").is_form_control());
        assert!(!ElementData::new("div").is_form_control());
    }
}
