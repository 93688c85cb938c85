//! Traversal operators

use nodeset_dom::{NodeId, SelectorList};

use crate::{Collection, Result};

impl Collection {
    /// Replace the members with their descendants matching `selector`.
    /// Members are processed in order; matches within a member come in
    /// document order. Duplicates are kept.
    pub fn find(&mut self, selector: &str) -> Result<&mut Self> {
        let members = self.members();
        if members.is_empty() {
            self.replace(Vec::new());
            return Ok(self);
        }

        let list = SelectorList::parse(selector)?;
        let found: Vec<Option<NodeId>> = self.page().with_tree(|tree| {
            members
                .iter()
                .flat_map(|&member| list.query_all(tree, member))
                .map(Some)
                .collect()
        });
        tracing::trace!("find(`{}`) over {} members: {} matches", selector, members.len(), found.len());
        self.replace(found);
        Ok(self)
    }

    /// Replace each member with its nearest ancestor-or-self matching
    /// `selector`, or a placeholder. The length does not change.
    pub fn closest(&mut self, selector: &str) -> Result<&mut Self> {
        if self.members().is_empty() {
            return Ok(self);
        }

        let list = SelectorList::parse(selector)?;
        let slots = self.nodes().to_vec();
        let closest: Vec<Option<NodeId>> = self.page().with_tree(|tree| {
            slots
                .into_iter()
                .map(|slot| slot.and_then(|node| list.closest(tree, node)))
                .collect()
        });
        self.replace(closest);
        Ok(self)
    }

    /// Replace the members with every element sibling of every member,
    /// excluding the member itself. Duplicates are kept.
    pub fn siblings(&mut self) -> &mut Self {
        let members = self.members();
        let siblings = self.page().with_tree(|tree| {
            let mut siblings = Vec::new();
            for member in members {
                let Some(parent) = tree.parent(member) else {
                    continue;
                };
                siblings.extend(
                    tree.element_children(parent)
                        .filter(|&sibling| sibling != member)
                        .map(Some),
                );
            }
            siblings
        });
        self.replace(siblings);
        self
    }

    /// Collapse to the member at `index`; a placeholder if out of range
    pub fn eq(&mut self, index: usize) -> &mut Self {
        let member = self.get(index);
        self.replace(vec![member]);
        self
    }

    /// New collection holding the first member's next sibling node
    pub fn next(&self) -> Collection {
        self.from_first(|tree, node| tree.next_sibling(node).into_iter().collect())
    }

    /// New collection holding the first member's previous sibling node
    pub fn prev(&self) -> Collection {
        self.from_first(|tree, node| tree.prev_sibling(node).into_iter().collect())
    }

    /// New collection holding the first member's parent element
    pub fn parent(&self) -> Collection {
        self.from_first(|tree, node| tree.parent_element(node).into_iter().collect())
    }

    /// New collection of the first member's element children
    pub fn children(&self) -> Collection {
        self.from_first(|tree, node| tree.element_children(node).collect())
    }

    fn from_first(&self, derive: impl FnOnce(&nodeset_dom::DomTree, NodeId) -> Vec<NodeId>) -> Collection {
        let nodes = match self.first() {
            Some(first) => self.page().with_tree(|tree| derive(tree, first)),
            None => Vec::new(),
        };
        self.derive(nodes)
    }
}
