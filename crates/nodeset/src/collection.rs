//! Collection core
//!
//! A `Collection` is an ordered list of node handles plus the page they
//! belong to. Its length is the vector's length, so there is never a slot
//! past `len()`. Slots may hold `None` where an operator found nothing
//! (`closest` without a match, `eq` out of range).
//!
//! Operators come in two kinds:
//! - in-place (`find`, `closest`, `siblings`, `eq`, mutations, events,
//!   effects) take `&mut self` and hand back the same collection;
//! - pure (`next`, `prev`, `parent`, `children`, `map`) return a new one.

use std::fmt;

use nodeset_dom::NodeId;
use serde_json::Value;

use crate::{Error, Page, Result};

/// What `Page::wrap` accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WrapInput<'a> {
    /// CSS selector, queried against the whole document
    Selector(&'a str),
    /// Markup, parsed into detached nodes
    Markup(&'a str),
    Node(NodeId),
    Empty,
}

impl<'a> From<&'a str> for WrapInput<'a> {
    fn from(input: &'a str) -> Self {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            WrapInput::Empty
        } else if trimmed.starts_with('<') {
            WrapInput::Markup(trimmed)
        } else {
            WrapInput::Selector(input)
        }
    }
}

impl<'a> From<&'a String> for WrapInput<'a> {
    fn from(input: &'a String) -> Self {
        input.as_str().into()
    }
}

impl From<NodeId> for WrapInput<'_> {
    fn from(node: NodeId) -> Self {
        WrapInput::Node(node)
    }
}

impl From<Option<NodeId>> for WrapInput<'_> {
    fn from(node: Option<NodeId>) -> Self {
        node.map_or(WrapInput::Empty, WrapInput::Node)
    }
}

/// Chainable set of nodes on one page
#[derive(Clone)]
pub struct Collection {
    page: Page,
    nodes: Vec<Option<NodeId>>,
}

impl Collection {
    pub(crate) fn from_nodes(page: Page, nodes: Vec<NodeId>) -> Self {
        Self {
            page,
            nodes: nodes.into_iter().map(Some).collect(),
        }
    }

    /// Replace the contents, keeping this collection's identity
    pub(crate) fn replace(&mut self, nodes: Vec<Option<NodeId>>) {
        self.nodes = nodes;
    }

    /// New collection on the same page
    pub(crate) fn derive(&self, nodes: Vec<NodeId>) -> Collection {
        Collection::from_nodes(self.page.clone(), nodes)
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Node at `index`; `None` past the end or for a placeholder
    pub fn get(&self, index: usize) -> Option<NodeId> {
        self.nodes.get(index).copied().flatten()
    }

    /// The member at index 0
    pub fn first(&self) -> Option<NodeId> {
        self.get(0)
    }

    /// Every slot, placeholders included
    pub fn nodes(&self) -> &[Option<NodeId>] {
        &self.nodes
    }

    /// Live members in order, placeholders skipped
    pub fn iter(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.iter().filter_map(|slot| *slot)
    }

    pub(crate) fn members(&self) -> Vec<NodeId> {
        self.iter().collect()
    }

    /// Members that are elements
    pub(crate) fn element_members(&self) -> Vec<NodeId> {
        self.page
            .with_tree(|tree| self.iter().filter(|&id| tree.is_element(id)).collect())
    }

    /// Call `f(index, node)` for every member. The page is free while `f` runs.
    pub fn each(&mut self, mut f: impl FnMut(usize, NodeId)) -> &mut Self {
        let slots = self.nodes.clone();
        for (index, slot) in slots.into_iter().enumerate() {
            if let Some(node) = slot {
                f(index, node);
            }
        }
        self
    }

    /// New collection of the nodes `f` returns; `None` results are dropped
    pub fn map(&self, mut f: impl FnMut(usize, NodeId) -> Option<NodeId>) -> Collection {
        let mapped = self
            .nodes
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.and_then(|node| f(index, node)))
            .collect();
        self.derive(mapped)
    }

    /// Call the method registered on the page as `name`
    pub fn call(&mut self, name: &str, args: &[Value]) -> Result<Value> {
        let method = self
            .page
            .method(name)
            .ok_or_else(|| Error::UnknownMethod(name.to_string()))?;
        method.call(self, args)
    }
}

impl fmt::Debug for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collection")
            .field("length", &self.nodes.len())
            .field("nodes", &self.nodes)
            .finish()
    }
}

impl<'a> IntoIterator for &'a Collection {
    type Item = NodeId;
    type IntoIter = Box<dyn Iterator<Item = NodeId> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}
