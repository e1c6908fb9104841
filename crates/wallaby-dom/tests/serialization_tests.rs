//! Tests for cached serialization: inner/outer HTML, text extraction, and
//! cache invalidation through the parent chain.

use wallaby_dom::{DomTree, NodeId, Tag};

/// Build `<div class="all"><p>Hey</p></div>` under the root and return
/// (div, p, text) ids.
fn sample_tree(tree: &mut DomTree) -> (NodeId, NodeId, NodeId) {
    let mut div_tag = Tag::new("div");
    div_tag.set_attribute("class", Some("all"));
    let div = tree.new_element(div_tag);
    let p = tree.new_element(Tag::new("p"));
    let text = tree.new_text("Hey");
    tree.append_child(NodeId::ROOT, div).unwrap();
    tree.append_child(div, p).unwrap();
    tree.append_child(p, text).unwrap();
    (div, p, text)
}

#[test]
fn test_outer_html_renders_subtree() {
    let mut tree = DomTree::new();
    let (div, p, _) = sample_tree(&mut tree);

    assert_eq!(tree.outer_html(p).unwrap(), "<p>Hey</p>");
    assert_eq!(
        tree.outer_html(div).unwrap(),
        "<div class=\"all\"><p>Hey</p></div>"
    );
    assert_eq!(tree.inner_html(div).unwrap(), "<p>Hey</p>");
}

#[test]
fn test_root_serializes_as_inner_html_alone() {
    let mut tree = DomTree::new();
    let _ = sample_tree(&mut tree);

    // no synthetic <root> wrapper in the output
    assert_eq!(
        tree.outer_html(NodeId::ROOT).unwrap(),
        "<div class=\"all\"><p>Hey</p></div>"
    );
}

#[test]
fn test_self_closing_renders_opening_tag_only() {
    let mut tree = DomTree::new();
    let mut tag = Tag::new("br");
    tag.set_self_closing(true);
    let br = tree.new_element(tag);
    tree.append_child(NodeId::ROOT, br).unwrap();

    assert_eq!(tree.outer_html(br).unwrap(), "<br />");
}

#[test]
fn test_repeated_reads_are_stable() {
    let mut tree = DomTree::new();
    let (div, _, _) = sample_tree(&mut tree);

    let first = tree.outer_html(div).unwrap();
    let second = tree.outer_html(div).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_attribute_write_invalidates_ancestors() {
    let mut tree = DomTree::new();
    let (div, p, _) = sample_tree(&mut tree);

    // warm every cache up to the root
    let before_root = tree.outer_html(NodeId::ROOT).unwrap();
    let _ = tree.outer_html(div).unwrap();

    assert!(tree.set_attribute(p, "id", Some("x")));

    let after_root = tree.outer_html(NodeId::ROOT).unwrap();
    assert_ne!(before_root, after_root);
    assert_eq!(
        tree.outer_html(div).unwrap(),
        "<div class=\"all\"><p id=\"x\">Hey</p></div>"
    );
}

#[test]
fn test_child_mutation_invalidates_ancestors() {
    let mut tree = DomTree::new();
    let (div, p, _) = sample_tree(&mut tree);

    let _ = tree.outer_html(div).unwrap();
    let extra = tree.new_text(" there");
    tree.append_child(p, extra).unwrap();

    assert_eq!(
        tree.outer_html(div).unwrap(),
        "<div class=\"all\"><p>Hey there</p></div>"
    );
}

#[test]
fn test_set_text_invalidates() {
    let mut tree = DomTree::new();
    let (div, _, text) = sample_tree(&mut tree);

    let _ = tree.outer_html(div).unwrap();
    assert!(tree.set_text(text, "Bye"));
    assert_eq!(
        tree.outer_html(div).unwrap(),
        "<div class=\"all\"><p>Bye</p></div>"
    );
}

#[test]
fn test_text_with_and_without_recursion() {
    let mut tree = DomTree::new();
    let div = tree.new_element(Tag::new("div"));
    let direct = tree.new_text("direct ");
    let p = tree.new_element(Tag::new("p"));
    let nested = tree.new_text("nested");
    tree.append_child(NodeId::ROOT, div).unwrap();
    tree.append_child(div, direct).unwrap();
    tree.append_child(div, p).unwrap();
    tree.append_child(p, nested).unwrap();

    assert_eq!(tree.text(div, false), "direct ");
    assert_eq!(tree.text(div, true), "direct nested");

    // the two memo slots are independent
    assert_eq!(tree.text(div, false), "direct ");
}

#[test]
fn test_remove_attribute_only_invalidates_when_removed() {
    let mut tree = DomTree::new();
    let (div, p, _) = sample_tree(&mut tree);

    assert!(!tree.remove_attribute(p, "missing"));
    assert!(tree.remove_attribute(div, "class"));
    assert_eq!(tree.outer_html(div).unwrap(), "<div><p>Hey</p></div>");
}
