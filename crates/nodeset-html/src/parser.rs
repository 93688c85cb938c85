//! HTML5 Parser implementation
//!
//! Uses html5ever's build-in RcDom and converts to our DOM format.
//! Fragments are parsed as their own document and then imported into the
//! caller's tree as detached nodes, so nothing reaches the live document
//! until it is explicitly inserted.

use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData as RcNodeData, RcDom};
use nodeset_dom::{Document, DomTree, Node, NodeId};

use crate::HtmlError;

/// HTML5 parser
#[derive(Debug, Clone, Copy)]
pub struct HtmlParser {
    keep_whitespace_text: bool,
}

impl Default for HtmlParser {
    fn default() -> Self {
        Self { keep_whitespace_text: true }
    }
}

impl HtmlParser {
    /// Create a new HTML parser
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep text nodes that contain only whitespace (kept by default)
    pub fn keep_whitespace_text(mut self, keep: bool) -> Self {
        self.keep_whitespace_text = keep;
        self
    }

    /// Parse HTML string into a Document
    pub fn parse(&self, html: &str) -> Result<Document, HtmlError> {
        self.parse_with_url(html, "about:blank")
    }

    /// Parse HTML with a base URL
    pub fn parse_with_url(&self, html: &str, url: &str) -> Result<Document, HtmlError> {
        tracing::debug!("Parsing HTML document: {}", url);

        let dom = parse_document(RcDom::default(), Default::default())
            .from_utf8()
            .read_from(&mut html.as_bytes())?;

        let mut document = Document::empty(url);
        let root = document.tree().root();
        self.convert_node(&dom.document, document.tree_mut(), root)?;

        tracing::debug!("Parsed {} nodes", document.tree().len());
        Ok(document)
    }

    /// Parse `html` in a separate document and import its top-level nodes
    /// into `tree`. The returned nodes are detached, in source order.
    pub fn parse_fragment_into(&self, html: &str, tree: &mut DomTree) -> Result<Vec<NodeId>, HtmlError> {
        let fragment = self.parse(html)?;
        let mut imported = Vec::new();
        for top in fragment_roots(&fragment) {
            imported.push(tree.import_subtree(fragment.tree(), top)?);
        }
        tracing::trace!("Imported {} fragment nodes", imported.len());
        Ok(imported)
    }

    /// Convert an RcDom node to our DOM format
    fn convert_node(&self, handle: &Handle, tree: &mut DomTree, parent: NodeId) -> Result<(), HtmlError> {
        match &handle.data {
            RcNodeData::Document => {
                for child in handle.children.borrow().iter() {
                    self.convert_node(child, tree, parent)?;
                }
            }
            RcNodeData::Doctype { name, .. } => {
                let id = tree.push_node(Node::doctype(name.to_string()));
                tree.append_child(parent, id)?;
            }
            RcNodeData::Text { contents } => {
                let text = contents.borrow().to_string();
                if self.keep_whitespace_text || !text.trim().is_empty() {
                    let id = tree.create_text(&text);
                    tree.append_child(parent, id)?;
                }
            }
            RcNodeData::Comment { contents } => {
                let id = tree.create_comment(&contents.to_string());
                tree.append_child(parent, id)?;
            }
            RcNodeData::Element { name, attrs, .. } => {
                let id = tree.create_element(&name.local);
                if let Some(elem) = tree.element_mut(id) {
                    for attr in attrs.borrow().iter() {
                        elem.set_attr(&attr.name.local, &attr.value);
                    }
                }
                tree.append_child(parent, id)?;

                for child in handle.children.borrow().iter() {
                    self.convert_node(child, tree, id)?;
                }
            }
            RcNodeData::ProcessingInstruction { .. } => {
                // Not part of HTML content
            }
        }
        Ok(())
    }
}

/// Top-level nodes of a parsed fragment: whatever the parser placed in
/// `<head>` followed by the contents of `<body>`.
fn fragment_roots(fragment: &Document) -> Vec<NodeId> {
    let tree = fragment.tree();
    let mut roots = Vec::new();
    for container in [fragment.head(), fragment.body()].into_iter().flatten() {
        roots.extend(tree.children(container).map(|(id, _)| id));
    }
    roots
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple() {
        let html = "<html><head><title>Test</title></head><body><p>Hello</p></body></html>";
        let doc = HtmlParser::new().parse(html).unwrap();

        assert_eq!(doc.title(), "Test");
        let body = doc.body().unwrap();
        let p = doc.tree().element_children(body).next().unwrap();
        assert_eq!(doc.tree().tag_name(p), Some("p"));
        assert_eq!(doc.tree().text_content(p), "Hello");
    }

    #[test]
    fn test_whitespace_text_kept_by_default() {
        let html = "<ul>\n  <li>A</li>\n  <li>B</li>\n</ul>";
        let doc = HtmlParser::new().parse(html).unwrap();
        let ul = doc.tree().element_children(doc.body().unwrap()).next().unwrap();
        assert_eq!(doc.tree().children(ul).count(), 5);

        let doc = HtmlParser::new().keep_whitespace_text(false).parse(html).unwrap();
        let ul = doc.tree().element_children(doc.body().unwrap()).next().unwrap();
        assert_eq!(doc.tree().children(ul).count(), 2);
    }

    #[test]
    fn test_space_between_inline_elements() {
        let doc = HtmlParser::new().parse("<p><b>a</b> <i>b</i></p>").unwrap();
        let p = doc.tree().element_children(doc.body().unwrap()).next().unwrap();
        assert_eq!(doc.tree().text_content(p), "a b");
    }

    #[test]
    fn test_fragment_import_is_detached() {
        let mut tree = DomTree::new();
        let nodes = HtmlParser::new()
            .parse_fragment_into("<li class=\"a\">One</li><li>Two</li>", &mut tree)
            .unwrap();

        assert_eq!(nodes.len(), 2);
        for &node in &nodes {
            assert_eq!(tree.tag_name(node), Some("li"));
            assert!(!tree.is_connected(node));
        }
        assert_eq!(tree.element(nodes[0]).unwrap().get_attr("class"), Some("a"));
        assert_eq!(tree.text_content(nodes[1]), "Two");
    }

    #[test]
    fn test_fragment_with_text() {
        let mut tree = DomTree::new();
        let nodes = HtmlParser::new()
            .parse_fragment_into("hello <b>world</b>", &mut tree)
            .unwrap();
        assert_eq!(nodes.len(), 2);
        assert_eq!(tree.get(nodes[0]).and_then(Node::as_text), Some("hello "));
        assert_eq!(tree.tag_name(nodes[1]), Some("b"));
    }
}
