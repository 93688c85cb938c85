//! Comprehensive tests for nodeset-dom
//!
//! Tree mutation, stale handles and selector queries working together.

use nodeset_dom::{ClassList, DomTree, NodeId, SelectorList, StyleDeclarations};

fn build_list(tree: &mut DomTree, items: &[&str]) -> (NodeId, Vec<NodeId>) {
    let ul = tree.create_element("ul");
    let root = tree.root();
    tree.append_child(root, ul).unwrap();
    let mut lis = Vec::new();
    for item in items {
        let li = tree.create_element("li");
        let text = tree.create_text(item);
        tree.append_child(li, text).unwrap();
        tree.append_child(ul, li).unwrap();
        lis.push(li);
    }
    (ul, lis)
}

#[test]
fn test_move_node_between_parents() {
    let mut tree = DomTree::new();
    let (ul, lis) = build_list(&mut tree, &["A", "B", "C"]);
    let ol = tree.create_element("ol");
    let root = tree.root();
    tree.append_child(root, ol).unwrap();

    tree.append_child(ol, lis[1]).unwrap();

    assert_eq!(tree.element_children(ul).collect::<Vec<_>>(), vec![lis[0], lis[2]]);
    assert_eq!(tree.element_children(ol).collect::<Vec<_>>(), vec![lis[1]]);
    assert_eq!(tree.next_sibling(lis[0]), Some(lis[2]));
}

#[test]
fn test_removed_nodes_stay_queryable() {
    let mut tree = DomTree::new();
    let (ul, lis) = build_list(&mut tree, &["A", "B"]);
    tree.remove_child(ul, lis[0]).unwrap();

    assert!(!tree.is_connected(lis[0]));
    assert_eq!(tree.text_content(lis[0]), "A");

    let all_li = SelectorList::parse("li").unwrap().query_all(&tree, tree.root());
    assert_eq!(all_li, vec![lis[1]]);
}

#[test]
fn test_selectors_inside_detached_subtree() {
    let mut tree = DomTree::new();
    let div = tree.create_element("div");
    let span = tree.create_element("span");
    tree.append_child(div, span).unwrap();

    let list = SelectorList::parse("div > span").unwrap();
    assert_eq!(list.query_all(&tree, div), vec![span]);
    assert_eq!(SelectorList::parse("div").unwrap().closest(&tree, span), Some(div));
}

#[test]
fn test_import_subtree_across_trees() {
    let mut source = DomTree::new();
    let (ul, _) = build_list(&mut source, &["x", "y"]);

    let mut target = DomTree::new();
    let copy = target.import_subtree(&source, ul).unwrap();

    assert_eq!(target.tag_name(copy), Some("ul"));
    assert_eq!(target.element_children(copy).count(), 2);
    assert_eq!(target.text_content(copy), "xy");
    assert!(!target.is_connected(copy));
}

#[test]
fn test_class_and_style_views_round_trip() {
    let mut classes = ClassList::parse("a b");
    classes.toggle("c");
    classes.remove("a");
    assert_eq!(classes.to_string(), "b c");

    let mut style = StyleDeclarations::parse("display: none; opacity: 0");
    style.set("display", "block");
    assert_eq!(style.to_string(), "display: block; opacity: 0;");
}
