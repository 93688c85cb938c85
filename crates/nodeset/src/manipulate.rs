//! Mutation operators and element views (attributes, classes, data, style,
//! form values)
//!
//! Members that are not elements are skipped by every operator here.

use nodeset_dom::{
    ClassList, DomTree, NodeId, StyleDeclarations, data_attribute_name, default_display,
};
use nodeset_html::get_inner_html;

use crate::{Collection, Result};

/// What `append` inserts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Content<'a> {
    /// Markup, parsed once per target
    Html(&'a str),
    /// A node, cloned once per target; the source stays where it is
    Node(NodeId),
}

impl<'a> From<&'a str> for Content<'a> {
    fn from(html: &'a str) -> Self {
        Content::Html(html)
    }
}

impl<'a> From<&'a String> for Content<'a> {
    fn from(html: &'a String) -> Self {
        Content::Html(html)
    }
}

impl From<NodeId> for Content<'_> {
    fn from(node: NodeId) -> Self {
        Content::Node(node)
    }
}

impl Collection {
    /// Append `content` at the end of every member
    pub fn append<'a>(&mut self, content: impl Into<Content<'a>>) -> Result<&mut Self> {
        let content = content.into();
        let parser = self.page().parser();
        for target in self.element_members() {
            self.page().with_tree_mut(|tree| -> Result<()> {
                match content {
                    Content::Html(html) => {
                        for node in parser.parse_fragment_into(html, tree)? {
                            tree.append_child(target, node)?;
                        }
                    }
                    Content::Node(source) => {
                        let copy = tree.clone_subtree(source)?;
                        tree.append_child(target, copy)?;
                    }
                }
                Ok(())
            })?;
        }
        Ok(self)
    }

    /// Inner markup of the first member
    pub fn get_html(&self) -> Option<String> {
        let first = self.first()?;
        self.page()
            .with_tree(|tree| tree.is_element(first).then(|| get_inner_html(tree, first)))
    }

    /// Replace every member's children with `html`
    pub fn set_html(&mut self, html: &str) -> Result<&mut Self> {
        self.with_elements(|tree, node| tree.remove_children(node));
        self.append(html)
    }

    /// Text content of the first member
    pub fn get_text(&self) -> Option<String> {
        let first = self.first()?;
        Some(self.page().with_tree(|tree| tree.text_content(first)))
    }

    /// Replace every member's children with a single text node
    pub fn set_text(&mut self, text: &str) -> Result<&mut Self> {
        let targets = self.element_members();
        self.page().with_tree_mut(|tree| -> Result<()> {
            for target in targets {
                tree.set_text_content(target, text)?;
            }
            Ok(())
        })?;
        Ok(self)
    }

    /// Remove every member's children
    pub fn empty(&mut self) -> &mut Self {
        self.with_elements(|tree, node| tree.remove_children(node))
    }

    /// Detach every member from its parent. The members stay in the
    /// collection and can be inserted again.
    pub fn remove(&mut self) -> &mut Self {
        let members = self.members();
        self.page().with_tree_mut(|tree| {
            for member in members {
                tree.detach(member);
            }
        });
        self
    }

    // ------------------------------------------------------------------
    // Attributes
    // ------------------------------------------------------------------

    pub fn get_attr(&self, name: &str) -> Option<String> {
        self.first_element(|tree, node| {
            tree.element(node)
                .and_then(|elem| elem.get_attr(name))
                .map(str::to_string)
        })
    }

    pub fn set_attr(&mut self, name: &str, value: &str) -> &mut Self {
        self.with_elements(|tree, node| {
            if let Some(elem) = tree.element_mut(node) {
                elem.set_attr(name, value);
            }
        })
    }

    pub fn remove_attr(&mut self, name: &str) -> &mut Self {
        self.with_elements(|tree, node| {
            if let Some(elem) = tree.element_mut(node) {
                elem.remove_attr(name);
            }
        })
    }

    // ------------------------------------------------------------------
    // Data
    // ------------------------------------------------------------------

    /// Read `data-*` from the first member. `key` may be camelCase or
    /// kebab-case.
    pub fn get_data(&self, key: &str) -> Option<String> {
        self.get_attr(&data_attribute_name(key))
    }

    pub fn set_data(&mut self, key: &str, value: &str) -> &mut Self {
        self.set_attr(&data_attribute_name(key), value)
    }

    // ------------------------------------------------------------------
    // Classes
    // ------------------------------------------------------------------

    /// Add each whitespace-separated class in `classes`
    pub fn add_class(&mut self, classes: &str) -> &mut Self {
        self.edit_classes(|list| {
            for class in classes.split_whitespace() {
                list.add(class);
            }
        })
    }

    pub fn remove_class(&mut self, classes: &str) -> &mut Self {
        self.edit_classes(|list| {
            for class in classes.split_whitespace() {
                list.remove(class);
            }
        })
    }

    pub fn toggle_class(&mut self, classes: &str) -> &mut Self {
        self.edit_classes(|list| {
            for class in classes.split_whitespace() {
                list.toggle(class);
            }
        })
    }

    /// Whether any member has `class`
    pub fn has_class(&self, class: &str) -> bool {
        self.page().with_tree(|tree| {
            self.iter()
                .filter_map(|node| tree.element(node))
                .any(|elem| elem.has_class(class))
        })
    }

    fn edit_classes(&mut self, mut edit: impl FnMut(&mut ClassList)) -> &mut Self {
        self.with_elements(|tree, node| {
            let Some(elem) = tree.element_mut(node) else {
                return;
            };
            let mut list = ClassList::parse(elem.get_attr("class").unwrap_or_default());
            edit(&mut list);
            elem.set_attr("class", &list.to_string());
        })
    }

    // ------------------------------------------------------------------
    // Inline style and display
    // ------------------------------------------------------------------

    /// Inline style value of the first member
    pub fn get_css(&self, property: &str) -> Option<String> {
        self.first_element(|tree, node| inline_style(tree, node).get(property).map(str::to_string))
    }

    /// Set an inline style property on every member; an empty value removes it
    pub fn set_css(&mut self, property: &str, value: &str) -> &mut Self {
        self.with_elements(|tree, node| set_style(tree, node, property, value))
    }

    /// Inline `display` of the first member, else its tag's default
    pub fn computed_display(&self) -> Option<String> {
        self.first_element(|tree, node| Some(computed_display(tree, node)))
    }

    pub fn show(&mut self) -> &mut Self {
        self.with_elements(show_node)
    }

    pub fn hide(&mut self) -> &mut Self {
        self.with_elements(|tree, node| set_style(tree, node, "display", "none"))
    }

    /// Show hidden members and hide visible ones
    pub fn toggle(&mut self) -> &mut Self {
        self.with_elements(|tree, node| {
            if computed_display(tree, node) == "none" {
                show_node(tree, node);
            } else {
                set_style(tree, node, "display", "none");
            }
        })
    }

    // ------------------------------------------------------------------
    // Form values
    // ------------------------------------------------------------------

    /// Value of the first member if it is an `input`, `textarea` or `select`
    pub fn get_val(&self) -> Option<String> {
        let first = self.first()?;
        self.page().with_tree(|tree| form_value(tree, first))
    }

    /// Set the value of every form member
    pub fn set_val(&mut self, value: &str) -> &mut Self {
        self.with_elements(|tree, node| set_form_value(tree, node, value))
    }

    // ------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------

    /// Run `f` on every element member with the tree mutably borrowed
    pub(crate) fn with_elements(&mut self, mut f: impl FnMut(&mut DomTree, NodeId)) -> &mut Self {
        let targets = self.element_members();
        self.page().with_tree_mut(|tree| {
            for target in targets {
                f(tree, target);
            }
        });
        self
    }

    fn first_element<R>(&self, f: impl FnOnce(&DomTree, NodeId) -> Option<R>) -> Option<R> {
        let first = self.first()?;
        self.page()
            .with_tree(|tree| if tree.is_element(first) { f(tree, first) } else { None })
    }
}

pub(crate) fn inline_style(tree: &DomTree, node: NodeId) -> StyleDeclarations {
    tree.element(node)
        .and_then(|elem| elem.get_attr("style"))
        .map(StyleDeclarations::parse)
        .unwrap_or_default()
}

pub(crate) fn set_style(tree: &mut DomTree, node: NodeId, property: &str, value: &str) {
    let mut style = inline_style(tree, node);
    style.set(property, value);
    let Some(elem) = tree.element_mut(node) else {
        return;
    };
    if style.is_empty() {
        elem.remove_attr("style");
    } else {
        elem.set_attr("style", &style.to_string());
    }
}

pub(crate) fn computed_display(tree: &DomTree, node: NodeId) -> String {
    match inline_style(tree, node).get("display") {
        Some(display) => display.to_string(),
        None => default_display(tree.tag_name(node).unwrap_or_default()).to_string(),
    }
}

pub(crate) fn show_node(tree: &mut DomTree, node: NodeId) {
    if inline_style(tree, node).get("display") == Some("none") {
        set_style(tree, node, "display", "");
    }
    if computed_display(tree, node) == "none" {
        let display = visible_display(tree, node);
        set_style(tree, node, "display", display);
    }
}

/// Display value that makes `node` visible: its tag default, or `block`
/// for tags hidden by default
pub(crate) fn visible_display(tree: &DomTree, node: NodeId) -> &'static str {
    match default_display(tree.tag_name(node).unwrap_or_default()) {
        "none" => "block",
        display => display,
    }
}

fn form_value(tree: &DomTree, node: NodeId) -> Option<String> {
    let elem = tree.element(node).filter(|elem| elem.is_form_control())?;
    match elem.tag_name.as_str() {
        "input" => Some(
            elem.value
                .clone()
                .or_else(|| elem.get_attr("value").map(str::to_string))
                .unwrap_or_default(),
        ),
        "textarea" => Some(elem.value.clone().unwrap_or_else(|| tree.text_content(node))),
        "select" => Some(elem.value.clone().unwrap_or_else(|| {
            let options = options_of(tree, node);
            options
                .iter()
                .copied()
                .find(|&option| tree.element(option).is_some_and(|o| o.attrs.contains("selected")))
                .or_else(|| options.first().copied())
                .map(|option| option_value(tree, option))
                .unwrap_or_default()
        })),
        _ => None,
    }
}

fn set_form_value(tree: &mut DomTree, node: NodeId, value: &str) {
    let Some(tag) = tree
        .element(node)
        .filter(|elem| elem.is_form_control())
        .map(|elem| elem.tag_name.clone())
    else {
        return;
    };
    match tag.as_str() {
        "input" | "textarea" => {
            if let Some(elem) = tree.element_mut(node) {
                elem.value = Some(value.to_string());
            }
        }
        "select" => {
            let mut matched = false;
            for option in options_of(tree, node) {
                let selected = !matched && option_value(tree, option) == value;
                matched |= selected;
                if let Some(elem) = tree.element_mut(option) {
                    if selected {
                        elem.set_attr("selected", "");
                    } else {
                        elem.remove_attr("selected");
                    }
                }
            }
            if let Some(elem) = tree.element_mut(node) {
                elem.value = (!matched).then(String::new);
            }
        }
        _ => {}
    }
}

fn options_of(tree: &DomTree, select: NodeId) -> Vec<NodeId> {
    tree.descendants(select)
        .filter(|(_, node)| node.as_element().is_some_and(|e| e.tag_name == "option"))
        .map(|(id, _)| id)
        .collect()
}

fn option_value(tree: &DomTree, option: NodeId) -> String {
    match tree.element(option).and_then(|e| e.get_attr("value")) {
        Some(value) => value.to_string(),
        None => tree.text_content(option).trim().to_string(),
    }
}
