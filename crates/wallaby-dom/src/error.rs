//! Structural errors for tree mutation and navigation.

use crate::NodeId;

/// Error type for DOM tree operations.
///
/// Recoverable markup irregularities never reach this enum; it covers
/// structural-integrity violations and navigation past the tree bounds.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    /// An insertion would have made a node its own ancestor or descendant.
    #[error("inserting node {child:?} under {parent:?} would create a cycle")]
    Circularity {
        /// The node that would have received the child.
        parent: NodeId,
        /// The node whose insertion was refused.
        child: NodeId,
    },

    /// A child lookup found nothing: the id is absent from the parent's
    /// child list, or there is no neighbor in the requested direction.
    #[error("no such child relative to node {0:?}")]
    ChildNotFound(NodeId),

    /// An ancestor walk reached the root without a match.
    #[error("no matching ancestor for node {0:?}")]
    ParentNotFound(NodeId),

    /// A serialization walk met a node kind it does not know how to
    /// render. Unreachable with the current closed node set; retained so
    /// callers can match on the full taxonomy.
    #[error("unrecognized child node kind during serialization")]
    UnknownChildType,
}
