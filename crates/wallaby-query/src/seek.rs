//! Rule evaluation over the tree.
//!
//! Each rule is evaluated against the children of the current node set, in
//! sibling order. Children that fail but have children of their own are
//! deferred and re-seeked as a batch after the sibling scan (breadth-ish),
//! or recursed into immediately in depth-first mode. A `>`-modified rule
//! never looks past immediate children.

use regex::Regex;

use wallaby_common::warning::warn_once;
use wallaby_dom::{DomTree, NodeId};

use crate::parse::{Operator, Pattern, Rule, parse_selector};

/// The pseudo-key that tests a node's text content rather than any
/// attribute; its presence check always passes.
const PLAINTEXT_KEY: &str = "plaintext";

/// Run a full selector against the tree, starting below `from`.
///
/// Results of comma-separated chains are concatenated in chain order;
/// duplicates are possible and deliberately not removed.
#[must_use]
pub fn query(tree: &DomTree, from: NodeId, selector: &str, depth_first: bool) -> Vec<NodeId> {
    let mut results = Vec::new();
    for chain in parse_selector(selector) {
        let mut nodes = vec![from];
        for rule in &chain {
            if nodes.is_empty() {
                break;
            }
            nodes = seek(tree, &nodes, rule, depth_first);
        }
        results.extend(nodes);
    }
    results
}

/// Run a selector and pick the 0-indexed `nth` result; out of range is
/// `None`, never an error.
#[must_use]
pub fn query_nth(
    tree: &DomTree,
    from: NodeId,
    selector: &str,
    nth: usize,
    depth_first: bool,
) -> Option<NodeId> {
    query(tree, from, selector, depth_first).get(nth).copied()
}

/// Evaluate one rule against a node set.
#[must_use]
pub fn seek(tree: &DomTree, nodes: &[NodeId], rule: &Rule, depth_first: bool) -> Vec<NodeId> {
    // `tag[N]`: absolute 1-indexed pick among matching siblings at this
    // level, no descent.
    if let Some(n) = rule.index {
        let mut matched = Vec::new();
        for &node in nodes {
            for &child in tree.children(node) {
                if tag_matches(tree, child, &rule.tag) {
                    matched.push(child);
                }
            }
        }
        return match n.checked_sub(1).and_then(|i| matched.get(i)) {
            Some(&id) => vec![id],
            None => Vec::new(),
        };
    }

    let mut results = Vec::new();
    let mut deferred = Vec::new();
    let descend = !rule.direct_child;

    for &node in nodes {
        for &child in tree.children(node) {
            if matches_rule(tree, child, rule) {
                results.push(child);
            } else if descend && !tree.children(child).is_empty() {
                if depth_first {
                    results.extend(seek(tree, &[child], rule, depth_first));
                } else {
                    deferred.push(child);
                }
            }
        }
    }
    if !deferred.is_empty() {
        results.extend(seek(tree, &deferred, rule, depth_first));
    }
    results
}

/// Whether a single node satisfies a rule's tag, key, and value tests.
fn matches_rule(tree: &DomTree, id: NodeId, rule: &Rule) -> bool {
    // a bare wildcard collects every child unconditionally
    if rule.tag == "*" && rule.key.is_none() {
        return true;
    }
    if !tag_matches(tree, id, &rule.tag) {
        return false;
    }

    let Some(key) = &rule.key else {
        return true;
    };
    let is_plaintext = key == PLAINTEXT_KEY;
    let present = is_plaintext || has_attribute(tree, id, key);

    if rule.no_key {
        return !present;
    }
    if !present {
        return false;
    }

    let Some(pattern) = &rule.pattern else {
        return true;
    };
    let candidate = if is_plaintext {
        tree.text(id, true)
    } else {
        attribute_value(tree, id, key)
    };

    let per_token = key == "class";
    let patterns: Vec<&str> = match pattern {
        Pattern::Single(p) => vec![p.as_str()],
        Pattern::Classes(classes) => classes.iter().map(String::as_str).collect(),
    };
    patterns
        .iter()
        .all(|p| match_with_retry(rule.operator, p, &candidate, per_token))
}

fn tag_matches(tree: &DomTree, id: NodeId, tag: &str) -> bool {
    if tag == "*" {
        return true;
    }
    tree.as_element(id)
        .is_some_and(|t| t.name().eq_ignore_ascii_case(tag))
}

fn has_attribute(tree: &DomTree, id: NodeId, key: &str) -> bool {
    tree.as_element(id).is_some_and(|t| t.attribute(key).is_some())
}

/// The candidate value for comparison; a present-but-bare attribute
/// compares as the empty string.
fn attribute_value(tree: &DomTree, id: NodeId, key: &str) -> String {
    tree.as_element(id)
        .and_then(|t| t.attribute_value(key))
        .unwrap_or_default()
        .to_string()
}

/// Compare the whole value first; for class-valued keys, retry against
/// each space-split token, short-circuiting on the first match.
fn match_with_retry(op: Operator, pattern: &str, value: &str, per_token: bool) -> bool {
    if match_value(op, pattern, value) {
        return true;
    }
    per_token
        && value
            .split_whitespace()
            .any(|token| match_value(op, pattern, token))
}

/// Case-insensitive operator comparison. `^=`/`$=` anchor an
/// escaped-literal regex; `*=` is a contains test, or a raw regex when the
/// pattern leads with `/`.
fn match_value(op: Operator, pattern: &str, value: &str) -> bool {
    match op {
        Operator::Equals => value.eq_ignore_ascii_case(pattern),
        Operator::NotEquals => !value.eq_ignore_ascii_case(pattern),
        Operator::StartsWith => {
            regex_match(&format!("(?i)^{}", regex::escape(pattern)), value)
        }
        Operator::EndsWith => regex_match(&format!("(?i){}$", regex::escape(pattern)), value),
        Operator::Contains => {
            if let Some(raw) = pattern.strip_prefix('/') {
                let raw = raw.strip_suffix('/').unwrap_or(raw);
                regex_match(raw, value)
            } else {
                regex_match(&format!("(?i){}", regex::escape(pattern)), value)
            }
        }
    }
}

fn regex_match(expr: &str, value: &str) -> bool {
    match Regex::new(expr) {
        Ok(re) => re.is_match(value),
        Err(_) => {
            warn_once("selector", &format!("unparseable pattern '{expr}' matches nothing"));
            false
        }
    }
}
