//! DOM tree implementation for the Wallaby HTML toolkit.
//!
//! # Design
//!
//! The tree uses arena allocation with [`NodeId`] indices for all
//! relationships, providing O(1) access and traversal without borrow
//! checker issues. Two node kinds exist: element nodes owning a [`Tag`]
//! and an ordered, doubly-linked child sequence, and text leaves owning a
//! string payload.
//!
//! Serialization (`inner_html`, `outer_html`, `text`) is memoized per node
//! and invalidated up the parent chain on every mutation, so repeated reads
//! of an unchanged subtree are cheap.
//!
//! The tree is a single-owner, single-threaded structure: memoization uses
//! interior mutability, so a tree is intentionally not `Sync`. One tree per
//! worker, or an external lock, is the expected concurrency story.

mod error;
mod tag;
mod tree;

pub use error::DomError;
pub use tag::{Attribute, QuoteStyle, Tag};
pub use tree::{AncestorIterator, DescendantIterator, DomTree, Node, NodeId, NodeKind};
