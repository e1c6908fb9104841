//! Document loading and querying for the Wallaby toolkit.
//!
//! [`Document`] is the main entry point: point it at markup, a file path,
//! or a URL; it cleans, parses, and encodes the input into a
//! [`DomTree`]; then query with CSS-style selectors via [`Document::find`].
//!
//! ```no_run
//! use wallaby_core::Document;
//!
//! let mut doc = Document::new();
//! doc.load("<div class=\"all\"><p>Hey</p></div>")?;
//! for id in doc.find("div p")? {
//!     println!("{}", doc.tree()?.text(id, true));
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use wallaby_common::fetch::{FetchError, fetch_bytes};
use wallaby_common::recode::RecodeError;
use wallaby_common::warning::clear_warnings;
use wallaby_dom::{DomError, DomTree, NodeId};
use wallaby_html::{ParseConfig, ParseError, clean, default_self_closing_tags, parse, propagate_encoding};
use wallaby_query::{query, query_nth};

/// Error type for document loading.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// A local file could not be read.
    #[error("failed to read '{path}': {source}")]
    File {
        /// The path that failed.
        path: String,
        /// The underlying I/O error.
        source: std::io::Error,
    },
    /// Transport failure while fetching a URL.
    #[error(transparent)]
    Fetch(#[from] FetchError),
    /// The cleanup pre-pass or the parser failed.
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// The detected or enforced charset could not be applied.
    #[error(transparent)]
    Recode(#[from] RecodeError),
}

/// Error type for queries and serialization against a document.
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    /// No load operation has succeeded yet.
    #[error("no document loaded; call a load operation before querying")]
    NotLoaded,
    /// The underlying tree reported a structural fault.
    #[error(transparent)]
    Dom(#[from] DomError),
}

/// A loadable, queryable HTML document.
///
/// Holds the parse configuration and the self-closing / no-trailing-slash
/// tag sets; both sets feed the next load, so mutate them before parsing.
/// Exactly one tree is owned at a time and every operation runs to
/// completion on the calling thread.
#[derive(Debug)]
pub struct Document {
    config: ParseConfig,
    self_closing: HashSet<String>,
    no_trailing_slash: HashSet<String>,
    tree: Option<DomTree>,
}

impl Document {
    /// An empty document with default configuration: the standard
    /// void-element list as the self-closing set, an empty
    /// no-trailing-slash set, and no tree until a load succeeds.
    #[must_use]
    pub fn new() -> Self {
        Document {
            config: ParseConfig::default(),
            self_closing: default_self_closing_tags(),
            no_trailing_slash: HashSet::new(),
            tree: None,
        }
    }

    /// An empty document with the given configuration.
    #[must_use]
    pub fn with_config(config: ParseConfig) -> Self {
        Document {
            config,
            ..Document::new()
        }
    }

    /// The configuration used by subsequent loads.
    #[must_use]
    pub fn config(&self) -> &ParseConfig {
        &self.config
    }

    /// Replace the configuration used by subsequent loads.
    pub fn set_config(&mut self, config: ParseConfig) {
        self.config = config;
    }

    /// Whether any load has succeeded.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.tree.is_some()
    }

    /// Load a document, disambiguating the input: a newline-free string
    /// naming an existing file is read from disk; an `http(s)://` or
    /// `data:` string is fetched; anything else is parsed as literal
    /// markup.
    ///
    /// # Errors
    ///
    /// [`LoadError`] on I/O, transport, strict-mode, cleanup, or recoding
    /// failure. Malformed markup is never an error.
    pub fn load(&mut self, input: &str) -> Result<(), LoadError> {
        if !input.contains('\n') && Path::new(input).is_file() {
            self.load_file(input)
        } else if input.starts_with("http://")
            || input.starts_with("https://")
            || input.starts_with("data:")
        {
            self.load_url(input)
        } else {
            self.load_markup(input)
        }
    }

    /// Load with a one-off configuration, leaving the document's own
    /// defaults untouched.
    ///
    /// # Errors
    ///
    /// Same as [`Document::load`].
    pub fn load_with(&mut self, input: &str, config: &ParseConfig) -> Result<(), LoadError> {
        let saved = std::mem::replace(&mut self.config, config.clone());
        let result = self.load(input);
        self.config = saved;
        result
    }

    /// Parse the given string as literal markup.
    ///
    /// # Errors
    ///
    /// Same as [`Document::load`], minus I/O.
    pub fn load_markup(&mut self, markup: &str) -> Result<(), LoadError> {
        self.load_bytes(markup.as_bytes())
    }

    /// Read and parse a local file.
    ///
    /// # Errors
    ///
    /// Same as [`Document::load`].
    pub fn load_file(&mut self, path: &str) -> Result<(), LoadError> {
        let raw = std::fs::read(path).map_err(|source| LoadError::File {
            path: path.to_string(),
            source,
        })?;
        self.load_bytes(&raw)
    }

    /// Fetch and parse a URL (`http://`, `https://`, or `data:`).
    ///
    /// # Errors
    ///
    /// Same as [`Document::load`].
    pub fn load_url(&mut self, url: &str) -> Result<(), LoadError> {
        let raw = fetch_bytes(url)?;
        self.load_bytes(&raw)
    }

    /// The shared pipeline: clean, build, propagate encoding.
    fn load_bytes(&mut self, raw: &[u8]) -> Result<(), LoadError> {
        clear_warnings();
        let cleaned = clean(raw, &self.config).map_err(ParseError::from)?;
        let mut tree = parse(
            &cleaned,
            &self.config,
            &self.self_closing,
            &self.no_trailing_slash,
        )?;
        propagate_encoding(&mut tree, &self.config)?;
        self.tree = Some(tree);
        Ok(())
    }

    /// The parsed tree.
    ///
    /// # Errors
    ///
    /// [`QueryError::NotLoaded`] before any successful load.
    pub fn tree(&self) -> Result<&DomTree, QueryError> {
        self.tree.as_ref().ok_or(QueryError::NotLoaded)
    }

    /// Mutable access to the parsed tree, for programmatic edits between
    /// queries.
    ///
    /// # Errors
    ///
    /// [`QueryError::NotLoaded`] before any successful load.
    pub fn tree_mut(&mut self) -> Result<&mut DomTree, QueryError> {
        self.tree.as_mut().ok_or(QueryError::NotLoaded)
    }

    /// Run a selector and return every match in document-ish order
    /// (per-chain, concatenated). Traversal mode follows
    /// `depth_first_search` in the configuration.
    ///
    /// # Errors
    ///
    /// [`QueryError::NotLoaded`] before any successful load.
    pub fn find(&self, selector: &str) -> Result<Vec<NodeId>, QueryError> {
        let tree = self.tree()?;
        Ok(query(
            tree,
            tree.root(),
            selector,
            self.config.depth_first_search,
        ))
    }

    /// Run a selector and pick the 0-indexed `nth` match; out of range is
    /// `Ok(None)`, never an error.
    ///
    /// # Errors
    ///
    /// [`QueryError::NotLoaded`] before any successful load.
    pub fn find_nth(&self, selector: &str, nth: usize) -> Result<Option<NodeId>, QueryError> {
        let tree = self.tree()?;
        Ok(query_nth(
            tree,
            tree.root(),
            selector,
            nth,
            self.config.depth_first_search,
        ))
    }

    /// The first match of a selector, if any.
    ///
    /// # Errors
    ///
    /// [`QueryError::NotLoaded`] before any successful load.
    pub fn find_first(&self, selector: &str) -> Result<Option<NodeId>, QueryError> {
        self.find_nth(selector, 0)
    }

    /// Serialized content of the whole document.
    ///
    /// # Errors
    ///
    /// [`QueryError::NotLoaded`] before any successful load.
    pub fn inner_html(&self) -> Result<String, QueryError> {
        let tree = self.tree()?;
        Ok(tree.inner_html(tree.root())?)
    }

    /// Serialized form of the whole document (identical to
    /// [`Document::inner_html`] at the root, which has no tag of its own).
    ///
    /// # Errors
    ///
    /// [`QueryError::NotLoaded`] before any successful load.
    pub fn outer_html(&self) -> Result<String, QueryError> {
        let tree = self.tree()?;
        Ok(tree.outer_html(tree.root())?)
    }

    /// Recursive text content of the whole document.
    ///
    /// # Errors
    ///
    /// [`QueryError::NotLoaded`] before any successful load.
    pub fn text(&self) -> Result<String, QueryError> {
        let tree = self.tree()?;
        Ok(tree.text(tree.root(), true))
    }

    /// Add a tag name to the self-closing set (affects subsequent loads).
    pub fn add_self_closing_tag(&mut self, name: &str) {
        let _ = self.self_closing.insert(name.to_ascii_lowercase());
    }

    /// Remove a tag name from the self-closing set.
    pub fn remove_self_closing_tag(&mut self, name: &str) {
        let _ = self.self_closing.remove(&name.to_ascii_lowercase());
    }

    /// Empty the self-closing set.
    pub fn clear_self_closing_tags(&mut self) {
        self.self_closing.clear();
    }

    /// Add a tag name to the no-trailing-slash set (affects subsequent
    /// loads).
    pub fn add_no_trailing_slash_tag(&mut self, name: &str) {
        let _ = self.no_trailing_slash.insert(name.to_ascii_lowercase());
    }

    /// Remove a tag name from the no-trailing-slash set.
    pub fn remove_no_trailing_slash_tag(&mut self, name: &str) {
        let _ = self.no_trailing_slash.remove(&name.to_ascii_lowercase());
    }

    /// Empty the no-trailing-slash set.
    pub fn clear_no_trailing_slash_tags(&mut self) {
        self.no_trailing_slash.clear();
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Document {
    /// A loaded document displays as its serialized tree; an unloaded one
    /// displays as nothing.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.tree {
            Some(tree) => f.write_str(&tree.outer_html(tree.root()).unwrap_or_default()),
            None => Ok(()),
        }
    }
}
