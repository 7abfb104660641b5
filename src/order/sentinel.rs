//! Boundary markers bounding the real node chain.
//!
//! Sentinels exist only in memory. They have no subject and no target and are
//! never serialized; their single link is exactly the persisted head or tail subject
//! of the list, so an empty list is `head.next == tail` and `tail.prev == head`.

use crate::types::Term;

use super::cache::NodeKey;

/// Which end of the chain a boundary marks.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Boundary {
    /// Before the first real node.
    Head,
    /// After the last real node.
    Tail,
}

/// A position in the chain: a cached real node or one of the sentinels.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum NodeRef {
    /// A real, persisted proxy node.
    Real(NodeKey),
    /// A sentinel.
    Boundary(Boundary),
}

impl NodeRef {
    /// The head sentinel.
    pub const HEAD: NodeRef = NodeRef::Boundary(Boundary::Head);
    /// The tail sentinel.
    pub const TAIL: NodeRef = NodeRef::Boundary(Boundary::Tail);

    /// True for sentinels.
    pub fn is_boundary(&self) -> bool {
        matches!(self, NodeRef::Boundary(_))
    }

    /// The real node handle, if this is not a sentinel.
    pub fn real(self) -> Option<NodeKey> {
        match self {
            NodeRef::Real(key) => Some(key),
            NodeRef::Boundary(_) => None,
        }
    }
}

/// Sentinel before the first node; `next` of `None` is the tail sentinel.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct HeadSentinel {
    next: Option<Term>,
}

impl HeadSentinel {
    pub(crate) fn new(next: Option<Term>) -> Self {
        Self { next }
    }

    /// Subject of the first real node.
    pub fn next_subject(&self) -> Option<&Term> {
        self.next.as_ref()
    }

    /// Always true.
    pub fn is_boundary(&self) -> bool {
        true
    }

    pub(crate) fn set_next(&mut self, next: Option<Term>) {
        self.next = next;
    }
}

/// Sentinel after the last node; `prev` of `None` is the head sentinel.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct TailSentinel {
    prev: Option<Term>,
}

impl TailSentinel {
    pub(crate) fn new(prev: Option<Term>) -> Self {
        Self { prev }
    }

    /// Subject of the last real node.
    pub fn prev_subject(&self) -> Option<&Term> {
        self.prev.as_ref()
    }

    /// Always true.
    pub fn is_boundary(&self) -> bool {
        true
    }

    pub(crate) fn set_prev(&mut self, prev: Option<Term>) {
        self.prev = prev;
    }
}
