//! Arena-based node tree with O(1) traversal and memoized serialization.
//!
//! All nodes live in one contiguous vector and refer to each other through
//! [`NodeId`] indices, so parent/child/sibling navigation never fights the
//! borrow checker. Ids are handed out monotonically per tree; a fresh tree
//! per parse run keeps ids session-scoped.
//!
//! Serialized forms (inner/outer HTML, text) are memoized per node in a
//! `RefCell` so reads stay `&self`; any mutation clears the node's slots and
//! every ancestor's, and the next read recomputes. The `RefCell` caches make
//! the tree deliberately single-threaded - wrap it externally if you must
//! share it.

use std::cell::RefCell;

use crate::error::DomError;
use crate::tag::Tag;

/// A type-safe index into the node arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub usize);

impl NodeId {
    /// The synthetic root node is always at index 0.
    pub const ROOT: NodeId = NodeId(0);
}

/// The two node kinds the tree knows about.
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// An inner node owning a [`Tag`] and an ordered child sequence.
    Element(Tag),
    /// A leaf node owning a text payload; never has children.
    Text(String),
}

/// Memoized serialization slots. Each is either unset or cached; mutation
/// resets all four on the node and its ancestors.
#[derive(Debug, Clone, Default)]
struct RenderCache {
    inner: Option<String>,
    outer: Option<String>,
    text: Option<String>,
    text_deep: Option<String>,
}

/// One node: its kind, tree links, and serialization cache.
#[derive(Debug, Clone)]
pub struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    next_sibling: Option<NodeId>,
    prev_sibling: Option<NodeId>,
    cache: RefCell<RenderCache>,
}

impl Node {
    fn new(kind: NodeKind) -> Self {
        Node {
            kind,
            parent: None,
            children: Vec::new(),
            next_sibling: None,
            prev_sibling: None,
            cache: RefCell::new(RenderCache::default()),
        }
    }

    /// The node's kind.
    #[must_use]
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// The owning parent, if attached.
    #[must_use]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Child ids in sibling order.
    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// Arena-based DOM tree with O(1) node access and traversal.
///
/// The tree always starts with a synthetic root element (tag name `root`)
/// at [`NodeId::ROOT`]. Detached subtrees stay allocated in the arena until
/// the tree itself drops; they are simply unreachable from the root.
#[derive(Debug, Clone)]
pub struct DomTree {
    nodes: Vec<Node>,
}

impl DomTree {
    /// Create a new tree containing only the synthetic root element.
    #[must_use]
    pub fn new() -> Self {
        DomTree {
            nodes: vec![Node::new(NodeKind::Element(Tag::new("root")))],
        }
    }

    /// Get the root node id.
    #[must_use]
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a node by its id.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// The number of nodes ever allocated in this tree, root included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the arena is empty (never true for a constructed tree).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Allocate a detached element node and return its id.
    pub fn new_element(&mut self, tag: Tag) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(NodeKind::Element(tag)));
        id
    }

    /// Allocate a detached text node and return its id.
    pub fn new_text(&mut self, text: impl Into<String>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(NodeKind::Text(text.into())));
        id
    }

    /// Get element tag data if this node is an element.
    #[must_use]
    pub fn as_element(&self, id: NodeId) -> Option<&Tag> {
        self.get(id).and_then(|n| match &n.kind {
            NodeKind::Element(tag) => Some(tag),
            NodeKind::Text(_) => None,
        })
    }

    /// Get text content if this node is a text node.
    #[must_use]
    pub fn as_text(&self, id: NodeId) -> Option<&str> {
        self.get(id).and_then(|n| match &n.kind {
            NodeKind::Text(s) => Some(s.as_str()),
            NodeKind::Element(_) => None,
        })
    }

    /// Get the parent of a node.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    /// Get all children of a node in sibling order.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Get the next sibling of a node.
    #[must_use]
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.next_sibling)
    }

    /// Get the previous sibling of a node.
    #[must_use]
    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.prev_sibling)
    }

    /// First child of `parent`.
    ///
    /// # Errors
    ///
    /// [`DomError::ChildNotFound`] when `parent` has no children.
    pub fn first_child(&self, parent: NodeId) -> Result<NodeId, DomError> {
        self.children(parent)
            .first()
            .copied()
            .ok_or(DomError::ChildNotFound(parent))
    }

    /// Last child of `parent`.
    ///
    /// # Errors
    ///
    /// [`DomError::ChildNotFound`] when `parent` has no children.
    pub fn last_child(&self, parent: NodeId) -> Result<NodeId, DomError> {
        self.children(parent)
            .last()
            .copied()
            .ok_or(DomError::ChildNotFound(parent))
    }

    /// The child following `id` under `parent`, via the stored sibling link.
    ///
    /// # Errors
    ///
    /// [`DomError::ChildNotFound`] when `id` is not a child of `parent` or
    /// is the last child.
    pub fn next_child(&self, parent: NodeId, id: NodeId) -> Result<NodeId, DomError> {
        if self.parent(id) != Some(parent) {
            return Err(DomError::ChildNotFound(id));
        }
        self.next_sibling(id).ok_or(DomError::ChildNotFound(id))
    }

    /// The child preceding `id` under `parent`, via the stored sibling link.
    ///
    /// # Errors
    ///
    /// [`DomError::ChildNotFound`] when `id` is not a child of `parent` or
    /// is the first child.
    pub fn previous_child(&self, parent: NodeId, id: NodeId) -> Result<NodeId, DomError> {
        if self.parent(id) != Some(parent) {
            return Err(DomError::ChildNotFound(id));
        }
        self.prev_sibling(id).ok_or(DomError::ChildNotFound(id))
    }

    /// Check whether `candidate` appears in `id`'s parent chain.
    #[must_use]
    pub fn is_ancestor(&self, id: NodeId, candidate: NodeId) -> bool {
        self.ancestors(id).any(|a| a == candidate)
    }

    /// Check whether `candidate` lives in `id`'s subtree.
    #[must_use]
    pub fn is_descendant(&self, id: NodeId, candidate: NodeId) -> bool {
        self.is_ancestor(candidate, id)
    }

    /// Iterate over all ancestors of a node, from parent to root.
    pub fn ancestors(&self, id: NodeId) -> AncestorIterator<'_> {
        AncestorIterator {
            tree: self,
            current: self.parent(id),
        }
    }

    /// Iterate over `id`'s subtree in pre-order, `id` included.
    pub fn descendants(&self, id: NodeId) -> DescendantIterator<'_> {
        DescendantIterator {
            tree: self,
            stack: vec![id],
        }
    }

    /// Walk the parent chain, `id` included, for an element with the given
    /// tag name (case-insensitive).
    ///
    /// # Errors
    ///
    /// [`DomError::ParentNotFound`] when no ancestor matches.
    pub fn ancestor_by_tag(&self, id: NodeId, name: &str) -> Result<NodeId, DomError> {
        let mut current = Some(id);
        while let Some(c) = current {
            if let Some(tag) = self.as_element(c)
                && tag.name().eq_ignore_ascii_case(name)
            {
                return Ok(c);
            }
            current = self.parent(c);
        }
        Err(DomError::ParentNotFound(id))
    }

    /// Refuse insertions that would make a node its own ancestor.
    fn guard_insertion(&self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        if parent == child || self.is_ancestor(parent, child) {
            return Err(DomError::Circularity { parent, child });
        }
        Ok(())
    }

    /// Append `child` as the last child of `parent`.
    ///
    /// Re-parents `child` (detaching it from any prior owner first) and
    /// re-links sibling pointers. Returns `false` without touching anything
    /// when `child` is already a child of `parent`.
    ///
    /// # Errors
    ///
    /// [`DomError::Circularity`] when `child` is `parent` itself or one of
    /// its ancestors.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<bool, DomError> {
        self.guard_insertion(parent, child)?;
        if self.parent(child) == Some(parent) {
            return Ok(false);
        }
        let _ = self.detach(child);

        let prev_last = self.nodes[parent.0].children.last().copied();
        self.nodes[parent.0].children.push(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[child.0].prev_sibling = prev_last;
        self.nodes[child.0].next_sibling = None;
        if let Some(prev) = prev_last {
            self.nodes[prev.0].next_sibling = Some(child);
        }

        self.invalidate(parent);
        Ok(true)
    }

    /// Splice `child` into `parent`'s child sequence immediately before
    /// `before`.
    ///
    /// Same re-parenting and no-op rules as [`DomTree::append_child`].
    ///
    /// # Errors
    ///
    /// [`DomError::Circularity`] on a would-be cycle;
    /// [`DomError::ChildNotFound`] when `before` is not a child of `parent`.
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        before: NodeId,
    ) -> Result<bool, DomError> {
        self.guard_insertion(parent, child)?;
        if self.parent(child) == Some(parent) {
            return Ok(false);
        }
        let idx = self.nodes[parent.0]
            .children
            .iter()
            .position(|&c| c == before)
            .ok_or(DomError::ChildNotFound(before))?;
        let _ = self.detach(child);

        let prev = self.nodes[before.0].prev_sibling;

        self.nodes[parent.0].children.insert(idx, child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[child.0].prev_sibling = prev;
        self.nodes[child.0].next_sibling = Some(before);
        self.nodes[before.0].prev_sibling = Some(child);
        if let Some(p) = prev {
            self.nodes[p.0].next_sibling = Some(child);
        }

        self.invalidate(parent);
        Ok(true)
    }

    /// Splice a child out of `parent`, re-linking its former neighbors.
    ///
    /// Returns `false` (a no-op) when `id` is not a child of `parent`.
    pub fn remove_child(&mut self, parent: NodeId, id: NodeId) -> bool {
        let Some(idx) = self.nodes[parent.0].children.iter().position(|&c| c == id) else {
            return false;
        };
        let _ = self.nodes[parent.0].children.remove(idx);

        let prev = self.nodes[id.0].prev_sibling;
        let next = self.nodes[id.0].next_sibling;
        if let Some(p) = prev {
            self.nodes[p.0].next_sibling = next;
        }
        if let Some(n) = next {
            self.nodes[n.0].prev_sibling = prev;
        }
        self.nodes[id.0].parent = None;
        self.nodes[id.0].prev_sibling = None;
        self.nodes[id.0].next_sibling = None;

        self.invalidate(parent);
        true
    }

    /// Substitute `new` for `old` in place, preserving `old`'s position and
    /// sibling links.
    ///
    /// # Errors
    ///
    /// [`DomError::Circularity`] on a would-be cycle;
    /// [`DomError::ChildNotFound`] when `old` is not a child of `parent`.
    pub fn replace_child(
        &mut self,
        parent: NodeId,
        old: NodeId,
        new: NodeId,
    ) -> Result<(), DomError> {
        if old == new {
            return Ok(());
        }
        self.guard_insertion(parent, new)?;
        if !self.nodes[parent.0].children.contains(&old) {
            return Err(DomError::ChildNotFound(old));
        }
        // detach before locating `old`: when `new` is a sibling under the
        // same parent, its removal shifts positions
        let _ = self.detach(new);

        let idx = self.nodes[parent.0]
            .children
            .iter()
            .position(|&c| c == old)
            .ok_or(DomError::ChildNotFound(old))?;
        let prev = self.nodes[old.0].prev_sibling;
        let next = self.nodes[old.0].next_sibling;

        self.nodes[parent.0].children[idx] = new;
        self.nodes[new.0].parent = Some(parent);
        self.nodes[new.0].prev_sibling = prev;
        self.nodes[new.0].next_sibling = next;
        if let Some(p) = prev {
            self.nodes[p.0].next_sibling = Some(new);
        }
        if let Some(n) = next {
            self.nodes[n.0].prev_sibling = Some(new);
        }

        self.nodes[old.0].parent = None;
        self.nodes[old.0].prev_sibling = None;
        self.nodes[old.0].next_sibling = None;

        self.invalidate(parent);
        Ok(())
    }

    /// Detach a node from its parent. The subtree stays allocated in the
    /// arena but becomes unreachable from the root; callers must not keep
    /// using the detached ids as if they were part of the document.
    ///
    /// Returns `false` when the node had no parent (the root, or an already
    /// detached node).
    pub fn detach(&mut self, id: NodeId) -> bool {
        match self.parent(id) {
            Some(parent) => self.remove_child(parent, id),
            None => false,
        }
    }

    /// Concatenated serialized form of a node's children, in sibling order.
    /// Text children contribute their payload, element children their own
    /// `outer_html`. Memoized until the next mutation.
    ///
    /// For a text node this is its payload.
    ///
    /// # Errors
    ///
    /// [`DomError::UnknownChildType`] if a serialization walk ever meets a
    /// node kind it cannot render (unreachable with the current node set).
    pub fn inner_html(&self, id: NodeId) -> Result<String, DomError> {
        {
            let cache = self.nodes[id.0].cache.borrow();
            if let Some(cached) = &cache.inner {
                return Ok(cached.clone());
            }
        }

        let html = match &self.nodes[id.0].kind {
            NodeKind::Text(t) => t.clone(),
            NodeKind::Element(_) => {
                let mut out = String::new();
                for &child in &self.nodes[id.0].children {
                    match &self.nodes[child.0].kind {
                        NodeKind::Text(t) => out.push_str(t),
                        NodeKind::Element(_) => out.push_str(&self.outer_html(child)?),
                    }
                }
                out
            }
        };

        self.nodes[id.0].cache.borrow_mut().inner = Some(html.clone());
        Ok(html)
    }

    /// Full serialized form of a node: opening tag, inner HTML, closing tag.
    ///
    /// The synthetic root renders as its inner HTML alone; self-closing
    /// elements render only their opening tag. Memoized until the next
    /// mutation.
    ///
    /// # Errors
    ///
    /// Same as [`DomTree::inner_html`].
    pub fn outer_html(&self, id: NodeId) -> Result<String, DomError> {
        {
            let cache = self.nodes[id.0].cache.borrow();
            if let Some(cached) = &cache.outer {
                return Ok(cached.clone());
            }
        }

        let html = match &self.nodes[id.0].kind {
            NodeKind::Text(t) => t.clone(),
            NodeKind::Element(tag) => {
                if id == NodeId::ROOT {
                    self.inner_html(id)?
                } else if tag.is_self_closing() {
                    tag.opening_text()
                } else {
                    format!(
                        "{}{}{}",
                        tag.opening_text(),
                        self.inner_html(id)?,
                        tag.closing_text()
                    )
                }
            }
        };

        self.nodes[id.0].cache.borrow_mut().outer = Some(html.clone());
        Ok(html)
    }

    /// Concatenated text of a node's direct text children; with
    /// `look_in_children`, element children are recursed into as well.
    /// The two variants memoize independently because their results differ.
    #[must_use]
    pub fn text(&self, id: NodeId, look_in_children: bool) -> String {
        {
            let cache = self.nodes[id.0].cache.borrow();
            let slot = if look_in_children {
                &cache.text_deep
            } else {
                &cache.text
            };
            if let Some(cached) = slot {
                return cached.clone();
            }
        }

        let text = match &self.nodes[id.0].kind {
            NodeKind::Text(t) => t.clone(),
            NodeKind::Element(_) => {
                let mut out = String::new();
                for &child in &self.nodes[id.0].children {
                    match &self.nodes[child.0].kind {
                        NodeKind::Text(t) => out.push_str(t),
                        NodeKind::Element(_) => {
                            if look_in_children {
                                out.push_str(&self.text(child, true));
                            }
                        }
                    }
                }
                out
            }
        };

        let mut cache = self.nodes[id.0].cache.borrow_mut();
        if look_in_children {
            cache.text_deep = Some(text.clone());
        } else {
            cache.text = Some(text.clone());
        }
        text
    }

    /// Set an attribute on an element node, invalidating cached
    /// serialization up to the root. Returns `false` for text nodes.
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: Option<&str>) -> bool {
        let applied = match &mut self.nodes[id.0].kind {
            NodeKind::Element(tag) => {
                tag.set_attribute(name, value);
                true
            }
            NodeKind::Text(_) => false,
        };
        if applied {
            self.invalidate(id);
        }
        applied
    }

    /// Remove an attribute from an element node. Returns whether anything
    /// was removed; the cache is only invalidated when something was.
    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> bool {
        let removed = match &mut self.nodes[id.0].kind {
            NodeKind::Element(tag) => tag.remove_attribute(name),
            NodeKind::Text(_) => false,
        };
        if removed {
            self.invalidate(id);
        }
        removed
    }

    /// Drop every attribute of an element node. Returns `false` for text
    /// nodes.
    pub fn clear_attributes(&mut self, id: NodeId) -> bool {
        let applied = match &mut self.nodes[id.0].kind {
            NodeKind::Element(tag) => {
                tag.clear_attributes();
                true
            }
            NodeKind::Text(_) => false,
        };
        if applied {
            self.invalidate(id);
        }
        applied
    }

    /// Mark an element self-closing (or not). Returns `false` for text
    /// nodes.
    pub fn set_self_closing(&mut self, id: NodeId, self_closing: bool) -> bool {
        let applied = match &mut self.nodes[id.0].kind {
            NodeKind::Element(tag) => {
                tag.set_self_closing(self_closing);
                true
            }
            NodeKind::Text(_) => false,
        };
        if applied {
            self.invalidate(id);
        }
        applied
    }

    /// Control the ` /` in an element's self-closing render. Returns
    /// `false` for text nodes.
    pub fn set_trailing_slash(&mut self, id: NodeId, trailing_slash: bool) -> bool {
        let applied = match &mut self.nodes[id.0].kind {
            NodeKind::Element(tag) => {
                tag.set_trailing_slash(trailing_slash);
                true
            }
            NodeKind::Text(_) => false,
        };
        if applied {
            self.invalidate(id);
        }
        applied
    }

    /// Replace a text node's payload, invalidating cached serialization up
    /// to the root. Returns `false` for element nodes.
    pub fn set_text(&mut self, id: NodeId, content: impl Into<String>) -> bool {
        let applied = match &mut self.nodes[id.0].kind {
            NodeKind::Text(t) => {
                *t = content.into();
                true
            }
            NodeKind::Element(_) => false,
        };
        if applied {
            self.invalidate(id);
        }
        applied
    }

    /// Clear the serialization cache of `id` and every ancestor. Lazy
    /// recompute happens on the next read.
    fn invalidate(&self, id: NodeId) {
        let mut current = Some(id);
        while let Some(c) = current {
            *self.nodes[c.0].cache.borrow_mut() = RenderCache::default();
            current = self.nodes[c.0].parent;
        }
    }
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over ancestors of a node.
pub struct AncestorIterator<'a> {
    tree: &'a DomTree,
    current: Option<NodeId>,
}

impl Iterator for AncestorIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        self.current = self.tree.parent(id);
        Some(id)
    }
}

/// Pre-order iterator over a node's subtree, the start node included.
pub struct DescendantIterator<'a> {
    tree: &'a DomTree,
    stack: Vec<NodeId>,
}

impl Iterator for DescendantIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        for &child in self.tree.children(id).iter().rev() {
            self.stack.push(child);
        }
        Some(id)
    }
}
