//! Parse-time errors.
//!
//! The parser's policy is "best effort, always produce a tree": unbalanced
//! tags, stray closers, and missing quotes are recovered locally and never
//! reach this enum. What does surface is strict-mode contract violations
//! and true internal faults.

/// Error type for the cleanup pre-pass.
///
/// Pattern substitution itself cannot fail in Rust; cleanup errors come
/// from the byte-level steps that precede it.
#[derive(Debug, thiserror::Error)]
pub enum CleanupError {
    /// The input carried the gzip magic bytes but did not decompress.
    #[error("gzip decompression failed: {0}")]
    Decompress(String),
}

/// Error type for parsing.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// Strict mode: an attribute was written without a value.
    #[error("strict mode: attribute '{attribute}' on <{tag}> has no value (byte {offset})")]
    StrictBareAttribute {
        /// Tag the attribute appeared on.
        tag: String,
        /// The valueless attribute name.
        attribute: String,
        /// Byte offset of the attribute in the cleaned input.
        offset: usize,
    },

    /// Strict mode: a configured self-closing tag was written without its
    /// trailing slash.
    #[error("strict mode: self-closing tag <{tag}> written without a trailing slash (byte {offset})")]
    StrictMissingSlash {
        /// The offending tag name.
        tag: String,
        /// Byte offset of the tag in the cleaned input.
        offset: usize,
    },

    /// An internal invariant broke, e.g. substring extraction on a corrupt
    /// range. Never raised for exhausted input.
    #[error("internal parse fault: {0}")]
    Fatal(String),

    /// The cleanup pre-pass failed.
    #[error(transparent)]
    Cleanup(#[from] CleanupError),
}
