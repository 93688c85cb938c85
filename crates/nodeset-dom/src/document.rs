//! Document handle: the arena plus the page URL

use crate::{DomTree, NodeId};

/// HTML Document
#[derive(Debug, Clone)]
pub struct Document {
    /// The DOM tree
    pub tree: DomTree,
    /// Document URL
    url: String,
}

impl Document {
    /// Create a document with the basic html/head/body structure
    pub fn new(url: &str) -> Self {
        let mut tree = DomTree::new();
        let root = tree.root();

        let html = tree.create_element("html");
        let head = tree.create_element("head");
        let body = tree.create_element("body");

        // Freshly created nodes under a document root cannot violate hierarchy
        let _ = tree.append_child(root, html);
        let _ = tree.append_child(html, head);
        let _ = tree.append_child(html, body);

        Self { tree, url: url.to_string() }
    }

    /// Create an empty document (no structure)
    pub fn empty(url: &str) -> Self {
        Self { tree: DomTree::new(), url: url.to_string() }
    }

    /// Get document URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Get <html> element
    pub fn document_element(&self) -> Option<NodeId> {
        self.tree.element_children(self.tree.root()).next()
    }

    /// Get <head> element
    pub fn head(&self) -> Option<NodeId> {
        self.child_of_html("head")
    }

    /// Get <body> element
    pub fn body(&self) -> Option<NodeId> {
        self.child_of_html("body")
    }

    fn child_of_html(&self, tag: &str) -> Option<NodeId> {
        let html = self.document_element()?;
        self.tree
            .element_children(html)
            .find(|&child| self.tree.tag_name(child) == Some(tag))
    }

    /// Get document title
    pub fn title(&self) -> String {
        let Some(head) = self.head() else {
            return String::new();
        };
        self.tree
            .element_children(head)
            .find(|&child| self.tree.tag_name(child) == Some("title"))
            .map(|title| self.tree.text_content(title).trim().to_string())
            .unwrap_or_default()
    }

    /// Get connected element by ID
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.tree
            .descendants(self.tree.root())
            .find(|(_, node)| node.as_element().and_then(|e| e.id()) == Some(id))
            .map(|(node_id, _)| node_id)
    }

    /// Access the DOM tree
    pub fn tree(&self) -> &DomTree {
        &self.tree
    }

    /// Access the DOM tree mutably
    pub fn tree_mut(&mut self) -> &mut DomTree {
        &mut self.tree
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new("about:blank")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_structure() {
        let doc = Document::new("about:blank");
        let html = doc.document_element().unwrap();
        assert_eq!(doc.tree().tag_name(html), Some("html"));
        assert!(doc.head().is_some());
        assert!(doc.body().is_some());
        assert_eq!(doc.title(), "");
    }

    #[test]
    fn test_get_element_by_id_ignores_detached() {
        let mut doc = Document::new("about:blank");
        let body = doc.body().unwrap();
        let tree = doc.tree_mut();
        let attached = tree.create_element("div");
        tree.element_mut(attached).unwrap().set_attr("id", "x");
        tree.append_child(body, attached).unwrap();
        let detached = tree.create_element("div");
        tree.element_mut(detached).unwrap().set_attr("id", "y");

        assert_eq!(doc.get_element_by_id("x"), Some(attached));
        assert_eq!(doc.get_element_by_id("y"), None);
    }
}
