//! Lenient HTML parsing for the Wallaby toolkit.
//!
//! # Scope
//!
//! This crate implements:
//! - **Cleanup pre-pass** - gzip sniffing, whitespace/line-break
//!   normalization, doctype/comment/CDATA/script/style/template stripping
//! - **Tree builder** - a single-pass, forward-only tokenizer and tree
//!   constructor that tolerates unclosed tags, stray closing tags,
//!   unquoted and duplicate attributes, and quotes-within-quotes
//! - **Encoding propagation** - post-parse charset detection and in-place
//!   text recoding
//!
//! This is deliberately *not* a standards-compliant HTML5 parser: there is
//! no insertion-mode state machine, no foster parenting, and no encoding
//! sniffing beyond a meta-tag scan. The contract is narrower and blunter -
//! any input produces a tree.

/// Tree construction from cleaned input.
pub mod builder;
/// Input cleanup pre-pass.
pub mod cleaner;
/// Parser configuration.
pub mod config;
/// Position-tracking input scanner.
pub mod cursor;
/// Post-parse encoding propagation.
pub mod encoding;
/// Parse-time errors.
pub mod error;

pub use builder::{TreeBuilder, default_self_closing_tags, parse};
pub use cleaner::{LINE_BREAK_TOKEN, clean};
pub use config::ParseConfig;
pub use cursor::Cursor;
pub use encoding::{detect_meta_charset, propagate_encoding};
pub use error::{CleanupError, ParseError};
