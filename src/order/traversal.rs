use rustc_hash::FxHashSet;

use crate::members::Member;
use crate::types::{OrderError, Result};

use super::cache::NodeKey;
use super::list::OrderedList;
use super::sentinel::NodeRef;

/// Lazy walk over the real nodes of a list, from `head.next` to the tail sentinel.
///
/// Each walk owns its cursor, so independent walks over one list never interfere.
/// A walk that revisits a node or exceeds its step budget yields one error and then
/// ends.
pub struct Nodes<'a, E> {
    list: &'a OrderedList<E>,
    cursor: NodeRef,
    seen: FxHashSet<NodeKey>,
    limit: usize,
    done: bool,
}

impl<'a, E: Member> Nodes<'a, E> {
    pub(crate) fn new(list: &'a OrderedList<E>, limit: usize) -> Self {
        Self {
            list,
            cursor: NodeRef::HEAD,
            seen: FxHashSet::default(),
            limit,
            done: false,
        }
    }

    fn step(&mut self) -> Result<Option<NodeKey>> {
        let key = match self.list.next_of(self.cursor)? {
            NodeRef::Boundary(_) => return Ok(None),
            NodeRef::Real(key) => key,
        };
        if !self.seen.insert(key) {
            return Err(OrderError::Cycle {
                subject: self.list.subject_of(key)?,
            });
        }
        if self.seen.len() > self.limit {
            return Err(OrderError::TraversalLimit { limit: self.limit });
        }
        self.cursor = NodeRef::Real(key);
        Ok(Some(key))
    }
}

impl<E: Member> Iterator for Nodes<'_, E> {
    type Item = Result<NodeKey>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.step() {
            Ok(Some(key)) => Some(Ok(key)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

impl<E: Member> std::iter::FusedIterator for Nodes<'_, E> {}
