use std::sync::atomic::{AtomicU32, Ordering};

use rustc_hash::FxHashMap;

use crate::types::{Result, Term};

use super::node::ProxyNode;

static NEXT_CACHE_ID: AtomicU32 = AtomicU32::new(1);

/// Handle to a node owned by one list's [`NodeCache`].
///
/// Handles carry the identity of the cache that issued them, so a handle from one
/// list is never mistaken for a node of another.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct NodeKey {
    cache: u32,
    slot: u32,
}

/// Arena of proxy nodes keyed by subject.
///
/// One live node per subject; nodes are never evicted and live as long as the
/// owning list.
pub struct NodeCache<E> {
    id: u32,
    index: FxHashMap<Term, NodeKey>,
    nodes: Vec<ProxyNode<E>>,
}

impl<E> Default for NodeCache<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> NodeCache<E> {
    /// Creates an empty cache with a process-unique identity.
    pub fn new() -> Self {
        Self {
            id: NEXT_CACHE_ID.fetch_add(1, Ordering::Relaxed),
            index: FxHashMap::default(),
            nodes: Vec::new(),
        }
    }

    /// True when a node for `subject` is cached.
    pub fn contains_key(&self, subject: &Term) -> bool {
        self.index.contains_key(subject)
    }

    /// Returns the handle cached for `subject`, if any.
    pub fn key_of(&self, subject: &Term) -> Option<NodeKey> {
        self.index.get(subject).copied()
    }

    /// Returns the node for `subject`, building it with `load` on first access.
    pub fn fetch<F>(&mut self, subject: &Term, load: F) -> Result<NodeKey>
    where
        F: FnOnce(&Term) -> Result<ProxyNode<E>>,
    {
        if let Some(key) = self.key_of(subject) {
            return Ok(key);
        }
        let node = load(subject)?;
        Ok(self.insert(node))
    }

    /// Stores a node built in memory. The subject must not be cached yet.
    pub(crate) fn insert(&mut self, node: ProxyNode<E>) -> NodeKey {
        debug_assert!(!self.index.contains_key(node.subject()));
        let key = NodeKey {
            cache: self.id,
            slot: self.nodes.len() as u32,
        };
        self.index.insert(node.subject().clone(), key);
        self.nodes.push(node);
        key
    }

    /// Borrows a node; `None` for handles issued by another cache.
    pub fn get(&self, key: NodeKey) -> Option<&ProxyNode<E>> {
        if key.cache != self.id {
            return None;
        }
        self.nodes.get(key.slot as usize)
    }

    /// Mutably borrows a node; `None` for handles issued by another cache.
    pub fn get_mut(&mut self, key: NodeKey) -> Option<&mut ProxyNode<E>> {
        if key.cache != self.id {
            return None;
        }
        self.nodes.get_mut(key.slot as usize)
    }

    /// Number of cached nodes, including nodes no longer linked into the chain.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when nothing has been cached.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
