//! The lenient tree builder.
//!
//! A single active-node cursor walks the cleaned input and grows the tree
//! as tags open and close. There is no backtracking across emitted nodes:
//! every recovery from bad markup is forward-only. A closing tag searches
//! the ancestor chain and closes everything nested inside the match; a
//! closing tag with no matching ancestor is dropped. The result is that
//! malformed input always produces *some* tree.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use wallaby_common::warning::warn_once;
use wallaby_dom::{DomTree, NodeId, QuoteStyle, Tag};

use crate::cleaner::LINE_BREAK_TOKEN;
use crate::config::ParseConfig;
use crate::cursor::{BLANK_BYTES, Cursor};
use crate::error::ParseError;

/// Characters ending a tag or attribute name scan.
const NAME_DELIMITERS: &[u8] = b" \t\r\n/>";
/// Characters ending an attribute key scan (name delimiters plus `=`).
const KEY_DELIMITERS: &[u8] = b"= \t\r\n/>";
/// Characters ending an unquoted attribute value scan.
const UNQUOTED_DELIMITERS: &[u8] = b" \t\r\n>";
/// Elements whose content is captured verbatim, with no tag parsing,
/// until their own closing tag.
const RAW_TEXT_TAGS: &[&str] = &["script", "style"];

static SPACE_RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s{2,}").expect("SPACE_RUN_RE: hardcoded regex is valid"));

/// The standard void-element list, used as the default self-closing set.
#[must_use]
pub fn default_self_closing_tags() -> HashSet<String> {
    [
        "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
        "source", "track", "wbr",
    ]
    .iter()
    .map(|s| (*s).to_string())
    .collect()
}

/// What one `<` turned out to be.
enum TagOutcome {
    /// Not a tag at all; the input is exhausted as far as parsing goes.
    NotATag,
    /// A redundant closing tag for a self-closing name (`</br>`).
    Inert,
    /// A closing tag with the given lowercased name.
    Closing(String),
    /// An opening tag, already allocated in the tree.
    Open(NodeId),
}

/// Parse cleaned input into a tree rooted at a synthetic `root` element.
///
/// # Errors
///
/// Strict-mode grammar violations and internal faults only; see
/// [`ParseError`]. Malformed markup is recovered, never an error.
pub fn parse(
    input: &str,
    config: &ParseConfig,
    self_closing: &HashSet<String>,
    no_trailing_slash: &HashSet<String>,
) -> Result<DomTree, ParseError> {
    TreeBuilder::new(input, config, self_closing, no_trailing_slash).build()
}

/// The tree construction state: a cursor over the input, the growing
/// arena, and the configured tag sets.
pub struct TreeBuilder<'a> {
    cursor: Cursor<'a>,
    tree: DomTree,
    config: &'a ParseConfig,
    self_closing: &'a HashSet<String>,
    no_trailing_slash: &'a HashSet<String>,
}

impl<'a> TreeBuilder<'a> {
    /// Set up a builder over cleaned input.
    #[must_use]
    pub fn new(
        input: &'a str,
        config: &'a ParseConfig,
        self_closing: &'a HashSet<String>,
        no_trailing_slash: &'a HashSet<String>,
    ) -> Self {
        TreeBuilder {
            cursor: Cursor::new(input),
            tree: DomTree::new(),
            config,
            self_closing,
            no_trailing_slash,
        }
    }

    /// Run the build loop to completion and hand back the tree.
    ///
    /// # Errors
    ///
    /// See [`parse`].
    pub fn build(mut self) -> Result<DomTree, ParseError> {
        let mut active = Some(self.tree.root());

        while let Some(current) = active {
            let text = self.cursor.copy_until(b"<", false)?;
            if !text.is_empty() && (self.config.whitespace_text_node || !text.trim().is_empty()) {
                let content = self.process_text(text);
                let node = self.tree.new_text(content);
                self.append(current, node)?;
            }
            if self.cursor.is_at_end() {
                break;
            }

            match self.parse_tag()? {
                TagOutcome::NotATag => active = None,
                TagOutcome::Inert => {}
                TagOutcome::Closing(name) => {
                    // Closing an ancestor implicitly closes everything
                    // improperly nested inside it; a closer with no match
                    // is dropped without moving.
                    if let Ok(ancestor) = self.tree.ancestor_by_tag(current, &name) {
                        active = self.tree.parent(ancestor);
                    } else {
                        warn_once("parser", &format!("ignoring stray closing tag </{name}>"));
                    }
                }
                TagOutcome::Open(node) => {
                    self.append(current, node)?;
                    let self_closing = self
                        .tree
                        .as_element(node)
                        .is_some_and(Tag::is_self_closing);
                    if !self_closing {
                        active = Some(node);
                        let name = self
                            .tree
                            .as_element(node)
                            .map(|t| t.name().to_string())
                            .unwrap_or_default();
                        if RAW_TEXT_TAGS.contains(&name.as_str()) {
                            self.capture_raw_text(node, &name)?;
                        }
                    }
                }
            }
        }

        Ok(self.tree)
    }

    /// Append into the arena; insertion of a freshly allocated node cannot
    /// cycle, so a failure here is an internal fault.
    fn append(&mut self, parent: NodeId, child: NodeId) -> Result<(), ParseError> {
        let _ = self
            .tree
            .append_child(parent, child)
            .map_err(|e| ParseError::Fatal(e.to_string()))?;
        Ok(())
    }

    /// Parse the construct at the current `<`.
    fn parse_tag(&mut self) -> Result<TagOutcome, ParseError> {
        let tag_offset = self.cursor.position();
        self.cursor.advance(1);

        if self.cursor.current_char() == Some('/') {
            self.cursor.advance(1);
            let name = self
                .cursor
                .copy_until(NAME_DELIMITERS, false)?
                .to_ascii_lowercase();
            let _ = self.cursor.copy_until(b">", false)?;
            self.cursor.advance(1);
            if self.self_closing.contains(&name) {
                return Ok(TagOutcome::Inert);
            }
            return Ok(TagOutcome::Closing(name));
        }

        let name = self
            .cursor
            .copy_until(NAME_DELIMITERS, false)?
            .to_ascii_lowercase();
        if name.is_empty() {
            self.cursor.rewind(1);
            return Ok(TagOutcome::NotATag);
        }

        let mut tag = Tag::new(&name);

        loop {
            let _ = self.skip_blanks();
            match self.cursor.current_char() {
                None | Some('>') | Some('/') => break,
                _ => {}
            }

            let attr_offset = self.cursor.position();
            let key = self
                .cursor
                .copy_until(KEY_DELIMITERS, false)?
                .to_ascii_lowercase();
            if key.is_empty() {
                if self.skip_blanks() == 0 {
                    self.cursor.advance(1);
                }
                continue;
            }

            let _ = self.skip_blanks();
            if self.cursor.current_byte() == Some(b'=') {
                self.cursor.advance(1);
                let _ = self.skip_blanks();
                let (value, quote) = self.parse_attribute_value()?;
                tag.set_attribute_quoted(&key, Some(&value), Some(quote));
            } else if self.config.strict {
                return Err(ParseError::StrictBareAttribute {
                    tag: name,
                    attribute: key,
                    offset: attr_offset,
                });
            } else {
                tag.set_attribute_quoted(&key, None, None);
            }
        }

        if self.cursor.current_char() == Some('/') {
            tag.set_self_closing(true);
            self.cursor.advance(1);
        } else if self.self_closing.contains(&name) {
            if self.config.strict {
                return Err(ParseError::StrictMissingSlash {
                    tag: name,
                    offset: tag_offset,
                });
            }
            tag.set_self_closing(true);
        }
        if tag.is_self_closing() && self.no_trailing_slash.contains(&name) {
            tag.set_trailing_slash(false);
        }

        let _ = self.cursor.copy_until(b">", false)?;
        self.cursor.advance(1);

        Ok(TagOutcome::Open(self.tree.new_element(tag)))
    }

    /// Parse one attribute value, returning it with its quote style.
    /// Unquoted values are recorded with double-quote style so they
    /// re-serialize well-quoted.
    fn parse_attribute_value(&mut self) -> Result<(String, QuoteStyle), ParseError> {
        match self.cursor.current_char() {
            Some('"') => Ok((self.parse_quoted_value(b'"')?, QuoteStyle::Double)),
            Some('\'') => Ok((self.parse_quoted_value(b'\'')?, QuoteStyle::Single)),
            _ => {
                let value = self.cursor.copy_until(UNQUOTED_DELIMITERS, false)?;
                Ok((value.to_string(), QuoteStyle::Double))
            }
        }
    }

    /// Scan a quoted value to its matching unescaped quote, re-extending
    /// the capture through stray same-type quotes while the speculated
    /// segment up to the next quote stays free of `=` and `>`.
    fn parse_quoted_value(&mut self, quote: u8) -> Result<String, ParseError> {
        self.cursor.advance(1);
        let mut value = self.cursor.copy_until(&[quote], true)?.to_string();
        while let Some(extension) = self.cursor.copy_until_unless(quote, b"=>")? {
            value.push_str(&extension);
        }
        self.cursor.advance(1);
        Ok(value)
    }

    /// Capture the content of a raw-text element (script/style that
    /// survived cleanup) verbatim, up to its case-insensitive closing tag.
    /// The closing tag itself is left for the main loop to consume.
    fn capture_raw_text(&mut self, node: NodeId, name: &str) -> Result<(), ParseError> {
        let closing = format!("</{name}");
        let raw = self.cursor.copy_until_nocase(&closing)?;
        if !raw.is_empty() {
            let text = self.tree.new_text(raw);
            self.append(node, text)?;
        }
        Ok(())
    }

    /// Skip blanks, treating a preserved line-break token as blank when it
    /// shows up inside a tag.
    fn skip_blanks(&mut self) -> usize {
        let mut total = 0;
        loop {
            total += self.cursor.skip(BLANK_BYTES);
            if self.cursor.current_char() == Some(LINE_BREAK_TOKEN) {
                self.cursor.advance(LINE_BREAK_TOKEN.len_utf8());
                total += 1;
            } else {
                return total;
            }
        }
    }

    /// Apply the configured text transforms to a captured run.
    fn process_text(&self, raw: &str) -> String {
        let mut text = raw.to_string();
        if self.config.html_special_chars_decode {
            text = decode_special_chars(&text);
        }
        if self.config.remove_double_space {
            text = SPACE_RUN_RE.replace_all(&text, " ").into_owned();
        }
        if self.config.preserve_line_breaks {
            text = text.replace(LINE_BREAK_TOKEN, "\n");
        }
        text
    }
}

/// Decode the special-character entity set (`&amp;` last, so entity names
/// escaped through it stay escaped).
fn decode_special_chars(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#039;", "'")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
