//! Parser configuration.

use serde::{Deserialize, Serialize};

/// The closed set of parse options, immutable once parsing starts.
///
/// Per-call configuration overrides process-wide defaults by passing a
/// different value into the load pipeline; there is no global mutable
/// state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseConfig {
    /// Keep whitespace-only text nodes.
    pub whitespace_text_node: bool,
    /// Raise [`crate::ParseError`] on grammar irregularities (valueless
    /// attributes, missing self-closing slashes) instead of recovering.
    pub strict: bool,
    /// Treat the whole document as this charset, overriding detection.
    pub enforce_encoding: Option<String>,
    /// Run the cleanup pre-pass at all.
    pub cleanup_input: bool,
    /// Strip `<script>` blocks during cleanup.
    pub remove_scripts: bool,
    /// Strip `<style>` blocks during cleanup.
    pub remove_styles: bool,
    /// Keep line breaks as literal newlines in text nodes instead of
    /// folding them into spaces.
    pub preserve_line_breaks: bool,
    /// Collapse runs of whitespace in text nodes to a single space.
    pub remove_double_space: bool,
    /// Strip `{...}` template directives during cleanup.
    pub remove_smarty_scripts: bool,
    /// Selector evaluation recurses into failing nodes immediately rather
    /// than deferring them to a batched second pass.
    pub depth_first_search: bool,
    /// Decode `&amp;`-style special-character entities in text nodes.
    pub html_special_chars_decode: bool,
}

impl Default for ParseConfig {
    fn default() -> Self {
        ParseConfig {
            whitespace_text_node: true,
            strict: false,
            enforce_encoding: None,
            cleanup_input: true,
            remove_scripts: true,
            remove_styles: true,
            preserve_line_breaks: false,
            remove_double_space: true,
            remove_smarty_scripts: true,
            depth_first_search: false,
            html_special_chars_decode: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ParseConfig::default();
        assert!(config.whitespace_text_node);
        assert!(!config.strict);
        assert!(config.cleanup_input);
        assert!(config.remove_scripts);
        assert!(!config.depth_first_search);
        assert!(config.enforce_encoding.is_none());
    }

    #[test]
    fn test_partial_json_round_trip() {
        let config: ParseConfig = serde_json::from_str(r#"{"strict": true}"#).unwrap();
        assert!(config.strict);
        assert!(config.cleanup_input);
    }
}
