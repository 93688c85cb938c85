//! Fragment import and serialization working together

use nodeset_dom::{DomTree, SelectorList};
use nodeset_html::{HtmlParser, get_inner_html, get_outer_html, parse};

#[test]
fn test_fragment_appended_serializes_back() {
    let mut doc = parse("<div id=\"host\"></div>").unwrap();
    let host = doc.get_element_by_id("host").unwrap();

    let nodes = HtmlParser::new()
        .parse_fragment_into("<span>a</span><em>b</em>", doc.tree_mut())
        .unwrap();
    for node in nodes {
        doc.tree_mut().append_child(host, node).unwrap();
    }

    assert_eq!(get_inner_html(doc.tree(), host), "<span>a</span><em>b</em>");
    assert_eq!(
        get_outer_html(doc.tree(), host),
        "<div id=\"host\"><span>a</span><em>b</em></div>"
    );
}

#[test]
fn test_fragment_nodes_invisible_to_document_queries() {
    let mut doc = parse("<p class=\"x\">live</p>").unwrap();
    HtmlParser::new()
        .parse_fragment_into("<p class=\"x\">detached</p>", doc.tree_mut())
        .unwrap();

    let tree = doc.tree();
    let found = SelectorList::parse("p.x").unwrap().query_all(tree, tree.root());
    assert_eq!(found.len(), 1);
    assert_eq!(tree.text_content(found[0]), "live");
}

#[test]
fn test_table_fragment_keeps_rows() {
    let mut tree = DomTree::new();
    let nodes = HtmlParser::new()
        .parse_fragment_into("<table><tr><td>1</td></tr></table>", &mut tree)
        .unwrap();
    assert_eq!(nodes.len(), 1);
    assert_eq!(
        get_outer_html(&tree, nodes[0]),
        "<table><tbody><tr><td>1</td></tr></tbody></table>"
    );
}

#[test]
fn test_doctype_and_comments_round_trip() {
    let doc = parse("<!DOCTYPE html><html><head></head><body><!-- note --><p>x</p></body></html>").unwrap();
    let out = get_inner_html(doc.tree(), doc.tree().root());
    assert!(out.starts_with("<!DOCTYPE html><html>"));
    assert!(out.contains("<!-- note --><p>x</p>"));
}
