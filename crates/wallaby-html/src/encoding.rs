//! Post-parse encoding propagation.
//!
//! After the tree is built, decide the document's source charset - an
//! enforced override wins unconditionally, otherwise a `meta` content-type
//! scan, otherwise the UTF-8 baseline - and recode every text node in
//! place. Rust strings are always UTF-8, so the conversion runs as one
//! eager walk; re-running the pass after text edits reconverts.

use wallaby_common::recode::{BASELINE_CHARSET, RecodeError, recode};
use wallaby_dom::{DomTree, NodeId};

use crate::config::ParseConfig;

/// Detect the document charset and recode all text content to the UTF-8
/// baseline.
///
/// # Errors
///
/// [`RecodeError`] when the detected or enforced charset label is unknown.
pub fn propagate_encoding(tree: &mut DomTree, config: &ParseConfig) -> Result<(), RecodeError> {
    let source = match &config.enforce_encoding {
        Some(label) => label.clone(),
        None => detect_meta_charset(tree).unwrap_or_else(|| BASELINE_CHARSET.to_string()),
    };

    if source.eq_ignore_ascii_case(BASELINE_CHARSET) {
        return Ok(());
    }

    let text_nodes: Vec<NodeId> = tree
        .descendants(tree.root())
        .filter(|&id| tree.as_text(id).is_some())
        .collect();

    for id in text_nodes {
        let Some(original) = tree.as_text(id).map(str::to_string) else {
            continue;
        };
        let converted = recode(&original, &source, BASELINE_CHARSET)?;
        if converted != original {
            let _ = tree.set_text(id, converted);
        }
    }

    Ok(())
}

/// Find the first `meta` element declaring a content-type charset and
/// extract the charset label from its `content` attribute.
#[must_use]
pub fn detect_meta_charset(tree: &DomTree) -> Option<String> {
    for id in tree.descendants(tree.root()) {
        let Some(tag) = tree.as_element(id) else {
            continue;
        };
        if tag.name() != "meta" {
            continue;
        }
        let is_content_type = tag
            .attribute_value("http-equiv")
            .is_some_and(|v| v.eq_ignore_ascii_case("content-type"));
        if !is_content_type {
            continue;
        }
        if let Some(content) = tag.attribute_value("content")
            && let Some(charset) = parse_charset_token(content)
        {
            return Some(charset);
        }
    }
    None
}

/// Pull the label out of a `text/html; charset=...` value: everything
/// after `charset=` up to a `;` or the end, with whitespace and quotes
/// trimmed.
fn parse_charset_token(content: &str) -> Option<String> {
    let lower = content.to_ascii_lowercase();
    let start = lower.find("charset=")? + "charset=".len();
    let rest = &content[start..];
    let end = rest.find(';').unwrap_or(rest.len());
    let label = rest[..end].trim().trim_matches(['"', '\'']).trim();
    if label.is_empty() {
        None
    } else {
        Some(label.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_charset_token() {
        assert_eq!(
            parse_charset_token("text/html; charset=utf-8").as_deref(),
            Some("utf-8")
        );
        assert_eq!(
            parse_charset_token("text/html; charset=\"ISO-8859-1\"; x=y").as_deref(),
            Some("ISO-8859-1")
        );
        assert_eq!(parse_charset_token("text/html"), None);
        assert_eq!(parse_charset_token("charset="), None);
    }
}
