//! Integration tests for the lenient tree builder.

use std::collections::HashSet;

use wallaby_dom::{DomTree, NodeId};
use wallaby_html::{ParseConfig, ParseError, clean, default_self_closing_tags, parse};

/// Helper to clean + parse with a given config and an empty no-slash set.
fn parse_with(html: &str, config: &ParseConfig) -> DomTree {
    let cleaned = clean(html.as_bytes(), config).unwrap();
    parse(&cleaned, config, &default_self_closing_tags(), &HashSet::new()).unwrap()
}

/// Helper to clean + parse with default options.
fn parse_default(html: &str) -> DomTree {
    parse_with(html, &ParseConfig::default())
}

/// Helper to get the first element with a tag name, depth-first.
fn find_element(tree: &DomTree, from: NodeId, tag: &str) -> Option<NodeId> {
    tree.descendants(from)
        .find(|&id| tree.as_element(id).is_some_and(|t| t.name() == tag))
}

/// Helper counting elements with a tag name in the whole tree.
fn count_elements(tree: &DomTree, tag: &str) -> usize {
    tree.descendants(NodeId::ROOT)
        .filter(|&id| tree.as_element(id).is_some_and(|t| t.name() == tag))
        .count()
}

// ========== round-tripping ==========

#[test]
fn test_well_formed_round_trip() {
    let input = "<div class=\"all\"><p>Hey bro, <a href=\"google.com\">click here</a></p></div>";
    let tree = parse_default(input);
    assert_eq!(tree.outer_html(NodeId::ROOT).unwrap(), input);
}

#[test]
fn test_tag_names_and_keys_lowercased() {
    let tree = parse_default("<DIV CLASS=\"x\">a</DIV>");
    assert_eq!(tree.outer_html(NodeId::ROOT).unwrap(), "<div class=\"x\">a</div>");
}

#[test]
fn test_single_quoted_attribute_round_trips() {
    let input = "<p id='main'>x</p>";
    let tree = parse_default(input);
    assert_eq!(tree.outer_html(NodeId::ROOT).unwrap(), input);
}

#[test]
fn test_unquoted_attribute_gains_quotes() {
    let tree = parse_default("<a href=x.html>y</a>");
    assert_eq!(tree.outer_html(NodeId::ROOT).unwrap(), "<a href=\"x.html\">y</a>");
}

// ========== self-closing handling ==========

#[test]
fn test_void_element_normalizes_to_slash() {
    let tree = parse_default("a<br>b");
    assert_eq!(tree.outer_html(NodeId::ROOT).unwrap(), "a<br />b");
}

#[test]
fn test_no_trailing_slash_set_suppresses_slash() {
    let config = ParseConfig::default();
    let cleaned = clean(b"a<br>b", &config).unwrap();
    let no_slash: HashSet<String> = ["br".to_string()].into_iter().collect();
    let tree = parse(&cleaned, &config, &default_self_closing_tags(), &no_slash).unwrap();
    assert_eq!(tree.outer_html(NodeId::ROOT).unwrap(), "a<br>b");
}

#[test]
fn test_redundant_closing_of_void_element_is_inert() {
    let tree = parse_default("a<br></br>b");
    assert_eq!(tree.outer_html(NodeId::ROOT).unwrap(), "a<br />b");
}

#[test]
fn test_explicit_self_closing_tag_does_not_descend() {
    let tree = parse_default("<img src=\"x\" /><p>after</p>");
    let p = find_element(&tree, NodeId::ROOT, "p").unwrap();
    assert_eq!(tree.parent(p), Some(NodeId::ROOT));
}

// ========== error recovery ==========

#[test]
fn test_missing_closing_tag_auto_closes() {
    let tree = parse_default("<div><p>text</div>");
    let div = find_element(&tree, NodeId::ROOT, "div").unwrap();
    assert_eq!(tree.inner_html(div).unwrap(), "<p>text</p>");
}

#[test]
fn test_stray_closing_tag_is_ignored() {
    let tree = parse_default("<div></span><p>ok</p></div>");
    assert_eq!(count_elements(&tree, "div"), 1);
    assert_eq!(count_elements(&tree, "p"), 1);
    assert_eq!(count_elements(&tree, "span"), 0);

    let p = find_element(&tree, NodeId::ROOT, "p").unwrap();
    assert_eq!(tree.text(p, true), "ok");
    // the stray closer did not move the active node out of the div
    let div = find_element(&tree, NodeId::ROOT, "div").unwrap();
    assert_eq!(tree.parent(p), Some(div));
}

#[test]
fn test_closing_an_outer_tag_closes_everything_inside() {
    let tree = parse_default("<section><div><p>deep</section><b>out</b>");
    let b = find_element(&tree, NodeId::ROOT, "b").unwrap();
    assert_eq!(tree.parent(b), Some(NodeId::ROOT));
}

#[test]
fn test_bare_less_than_ends_parsing() {
    // a '<' that starts no identifier is not a tag; parsing stops there
    let tree = parse_default("a < b");
    assert_eq!(tree.text(NodeId::ROOT, true), "a ");
}

// ========== attributes ==========

#[test]
fn test_duplicate_attribute_keeps_position_last_value_wins() {
    let tree = parse_default("<div class=\"a\" id=\"i\" CLASS=\"b\">x</div>");
    let div = find_element(&tree, NodeId::ROOT, "div").unwrap();
    assert_eq!(
        tree.outer_html(div).unwrap(),
        "<div class=\"b\" id=\"i\">x</div>"
    );
}

#[test]
fn test_quotes_within_quotes_heuristic() {
    let tree = parse_default("<a title=\"say \"hello\" world\">x</a>");
    let a = find_element(&tree, NodeId::ROOT, "a").unwrap();
    assert_eq!(
        tree.as_element(a).unwrap().attribute_value("title"),
        Some("say \"hello\" world")
    );
}

#[test]
fn test_quote_followed_by_next_attribute_terminates_value() {
    let tree = parse_default("<a title=\"x\" href=\"y\">z</a>");
    let a = find_element(&tree, NodeId::ROOT, "a").unwrap();
    let tag = tree.as_element(a).unwrap();
    assert_eq!(tag.attribute_value("title"), Some("x"));
    assert_eq!(tag.attribute_value("href"), Some("y"));
}

#[test]
fn test_escaped_quote_does_not_terminate_value() {
    let tree = parse_default("<a onclick=\"alert(\\\"hi\\\")\">x</a>");
    let a = find_element(&tree, NodeId::ROOT, "a").unwrap();
    assert_eq!(
        tree.as_element(a).unwrap().attribute_value("onclick"),
        Some("alert(\\\"hi\\\")")
    );
}

#[test]
fn test_spaces_around_equals_are_tolerated() {
    let tree = parse_default("<a href = \"x\">y</a>");
    let a = find_element(&tree, NodeId::ROOT, "a").unwrap();
    assert_eq!(tree.as_element(a).unwrap().attribute_value("href"), Some("x"));
}

// ========== strict mode ==========

#[test]
fn test_strict_rejects_valueless_attribute() {
    let config = ParseConfig {
        strict: true,
        ..ParseConfig::default()
    };
    let cleaned = clean(b"<p block>text</p>", &config).unwrap();
    let err = parse(&cleaned, &config, &default_self_closing_tags(), &HashSet::new()).unwrap_err();
    match err {
        ParseError::StrictBareAttribute { tag, attribute, offset } => {
            assert_eq!(tag, "p");
            assert_eq!(attribute, "block");
            assert_eq!(offset, 3);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_lenient_records_valueless_attribute() {
    let tree = parse_default("<p block>text</p>");
    let p = find_element(&tree, NodeId::ROOT, "p").unwrap();
    let attr = tree.as_element(p).unwrap().attribute("block").unwrap();
    assert!(attr.value.is_none());
    assert_eq!(tree.outer_html(p).unwrap(), "<p block>text</p>");
}

#[test]
fn test_strict_rejects_missing_self_closing_slash() {
    let config = ParseConfig {
        strict: true,
        ..ParseConfig::default()
    };
    let cleaned = clean(b"a<hr>b", &config).unwrap();
    let err = parse(&cleaned, &config, &default_self_closing_tags(), &HashSet::new()).unwrap_err();
    match err {
        ParseError::StrictMissingSlash { tag, offset } => {
            assert_eq!(tag, "hr");
            assert_eq!(offset, 1);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_lenient_forces_self_closing_silently() {
    let tree = parse_default("a<hr>b");
    assert_eq!(tree.outer_html(NodeId::ROOT).unwrap(), "a<hr />b");
}

#[test]
fn test_strict_accepts_written_slash() {
    let config = ParseConfig {
        strict: true,
        ..ParseConfig::default()
    };
    let cleaned = clean(b"a<hr />b", &config).unwrap();
    let tree = parse(&cleaned, &config, &default_self_closing_tags(), &HashSet::new()).unwrap();
    assert_eq!(tree.outer_html(NodeId::ROOT).unwrap(), "a<hr />b");
}

// ========== text handling ==========

#[test]
fn test_whitespace_text_nodes_kept_by_default() {
    let tree = parse_default("<div> <p>x</p> </div>");
    let div = find_element(&tree, NodeId::ROOT, "div").unwrap();
    assert_eq!(tree.children(div).len(), 3);
}

#[test]
fn test_whitespace_text_nodes_dropped_when_disabled() {
    let config = ParseConfig {
        whitespace_text_node: false,
        ..ParseConfig::default()
    };
    let tree = parse_with("<div> <p>x</p> </div>", &config);
    let div = find_element(&tree, NodeId::ROOT, "div").unwrap();
    assert_eq!(tree.children(div).len(), 1);
}

#[test]
fn test_line_breaks_fold_to_spaces_by_default() {
    let tree = parse_default("<p>a\nb</p>");
    let p = find_element(&tree, NodeId::ROOT, "p").unwrap();
    assert_eq!(tree.text(p, false), "a b");
}

#[test]
fn test_preserved_line_breaks_restore_to_newlines() {
    let config = ParseConfig {
        preserve_line_breaks: true,
        ..ParseConfig::default()
    };
    let tree = parse_with("<p>a\r\nb</p>", &config);
    let p = find_element(&tree, NodeId::ROOT, "p").unwrap();
    assert_eq!(tree.text(p, false), "a\nb");
}

#[test]
fn test_double_spaces_collapse() {
    let tree = parse_default("<p>a   b</p>");
    let p = find_element(&tree, NodeId::ROOT, "p").unwrap();
    assert_eq!(tree.text(p, false), "a b");
}

#[test]
fn test_double_spaces_kept_when_disabled() {
    let config = ParseConfig {
        remove_double_space: false,
        ..ParseConfig::default()
    };
    let tree = parse_with("<p>a   b</p>", &config);
    let p = find_element(&tree, NodeId::ROOT, "p").unwrap();
    assert_eq!(tree.text(p, false), "a   b");
}

#[test]
fn test_special_chars_decoded_on_request() {
    let config = ParseConfig {
        html_special_chars_decode: true,
        ..ParseConfig::default()
    };
    let tree = parse_with("<p>1 &lt; 2 &amp;&amp; x</p>", &config);
    let p = find_element(&tree, NodeId::ROOT, "p").unwrap();
    assert_eq!(tree.text(p, false), "1 < 2 && x");
}

// ========== raw-text elements ==========

#[test]
fn test_script_content_is_raw_when_kept() {
    let config = ParseConfig {
        remove_scripts: false,
        remove_smarty_scripts: false,
        ..ParseConfig::default()
    };
    let tree = parse_with("<div><script>var a = 1 < 2;</script><p>x</p></div>", &config);
    let script = find_element(&tree, NodeId::ROOT, "script").unwrap();
    assert_eq!(tree.text(script, false), "var a = 1 < 2;");
    // the '<' inside the script spawned no elements
    assert_eq!(count_elements(&tree, "p"), 1);
    assert_eq!(tree.children(script).len(), 1);
}

#[test]
fn test_script_closing_tag_case_insensitive() {
    let config = ParseConfig {
        remove_scripts: false,
        ..ParseConfig::default()
    };
    let tree = parse_with("<script>var a;</SCRIPT><p>x</p>", &config);
    let p = find_element(&tree, NodeId::ROOT, "p").unwrap();
    assert_eq!(tree.parent(p), Some(NodeId::ROOT));
}
