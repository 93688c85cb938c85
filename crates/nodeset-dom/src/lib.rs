//! nodeset DOM - Document Object Model
//!
//! Arena-based DOM tree with the element views (attributes, class list,
//! dataset, inline style), a CSS selector engine and a DOM event registry.

mod node;
mod tree;
mod document;
mod attributes;
mod classlist;
mod dataset;
mod style;
mod error;
pub mod selector;
pub mod events;

pub use node::{Node, NodeData, ElementData};
pub use tree::{DomTree, Children, Descendants};
pub use document::Document;
pub use attributes::{Attr, Attributes};
pub use classlist::ClassList;
pub use dataset::{to_camel_case, to_kebab_case, data_attribute_name};
pub use style::{StyleDeclarations, default_display, css_property_name};
pub use error::{DomError, DomResult};
pub use selector::{SelectorList, SelectorError};
pub use events::{Event, EventRegistry, Listener};

/// Node identifier (index into arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Root node ID
    pub const ROOT: NodeId = NodeId(0);

    /// Sentinel for "no node"
    pub const NONE: NodeId = NodeId(u32::MAX);

    /// Check that this id is not the sentinel
    #[inline]
    pub fn is_valid(self) -> bool {
        self != Self::NONE
    }

    /// Convert the sentinel into `None`
    #[inline]
    pub fn to_option(self) -> Option<NodeId> {
        self.is_valid().then_some(self)
    }

    /// Raw arena index
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_valid() {
            write!(f, "#{}", self.0)
        } else {
            write!(f, "#none")
        }
    }
}
