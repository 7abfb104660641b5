use crate::members::Member;
use crate::types::{MemberId, OrderError, Result, Term};

use super::list::OrderedList;

/// Plain-value view over an [`OrderedList`].
///
/// Every call forwards to the node-level operation and converts nodes to their
/// targets at the boundary. Nodes created through the view proxy within the list's
/// anchor, if it has one.
pub struct TargetSequence<'a, E> {
    list: &'a mut OrderedList<E>,
    owner: Option<Term>,
}

impl<'a, E: Member> TargetSequence<'a, E> {
    pub(crate) fn new(list: &'a mut OrderedList<E>) -> Self {
        let owner = list.anchor().cloned();
        Self { list, owner }
    }

    /// Appends one value.
    pub fn push(&mut self, value: E) -> Result<&mut Self> {
        self.list.append_target(value, self.owner.clone())?;
        Ok(self)
    }

    /// Appends every value in order.
    pub fn concat<I: IntoIterator<Item = E>>(&mut self, values: I) -> Result<&mut Self> {
        for value in values {
            self.push(value)?;
        }
        Ok(self)
    }

    /// Inserts `value` at `index`; past-the-end appends.
    pub fn insert_at(&mut self, index: usize, value: E) -> Result<()> {
        self.list.insert_at(index, value, self.owner.clone())?;
        Ok(())
    }

    /// Inserts an existing member by identifier without resolving it.
    pub fn insert_target_id_at(&mut self, index: usize, id: Option<&MemberId>) -> Result<()> {
        let id = id.ok_or_else(|| OrderError::InvalidArgument("ID can not be nil".into()))?;
        let target_ref = self.list.members().resolver.ref_of(id)?;
        self.list
            .insert_proxy_for_at(index, Some(target_ref), self.owner.clone())?;
        Ok(())
    }

    /// Removes and returns the value at `index`; `None` when out of range.
    ///
    /// The value is resolved first; a resolver failure removes nothing.
    pub fn delete_at(&mut self, index: impl Into<Option<usize>>) -> Result<Option<E>> {
        let Some(index) = index.into() else {
            return Ok(None);
        };
        let Some(key) = self.list.get(index)? else {
            return Ok(None);
        };
        let value = self.list.target(key)?;
        self.list.delete_node(key)?;
        Ok(value)
    }

    /// Removes every occurrence of `value`.
    pub fn delete(&mut self, value: &E) -> Result<Option<E>> {
        self.list.delete_target(value)
    }

    /// Removes values from the front until empty.
    pub fn clear(&mut self) -> Result<()> {
        while !self.list.is_empty() {
            if self.list.delete_at(0)?.is_none() {
                return Err(OrderError::Corruption(
                    "head points at a node outside the chain".into(),
                ));
            }
        }
        Ok(())
    }

    /// Values in order.
    pub fn to_vec(&self) -> Result<Vec<E>> {
        self.list.targets()
    }

    /// Value identifiers in order, without resolving.
    pub fn ids(&self) -> Result<Vec<MemberId>> {
        self.list.target_ids()
    }

    /// Number of values.
    pub fn len(&self) -> Result<usize> {
        self.list.len()
    }

    /// True when there are no values.
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// First value.
    pub fn first(&self) -> Result<Option<E>> {
        match self.list.first()? {
            Some(key) => self.list.target(key),
            None => Ok(None),
        }
    }

    /// Last value.
    pub fn last(&self) -> Result<Option<E>> {
        match self.list.last()? {
            Some(key) => self.list.target(key),
            None => Ok(None),
        }
    }
}

impl<E: Member + PartialEq> TargetSequence<'_, E> {
    /// Compares against plain values, surfacing traversal errors.
    pub fn eq_values(&self, values: &[E]) -> Result<bool> {
        Ok(self.to_vec()? == values)
    }
}

/// Traversal or resolution errors compare unequal; use
/// [`TargetSequence::eq_values`] to see them.
impl<E: Member + PartialEq> PartialEq<[E]> for TargetSequence<'_, E> {
    fn eq(&self, other: &[E]) -> bool {
        self.eq_values(other).unwrap_or(false)
    }
}

/// Traversal or resolution errors compare unequal; use
/// [`TargetSequence::eq_values`] to see them.
impl<E: Member + PartialEq> PartialEq<Vec<E>> for TargetSequence<'_, E> {
    fn eq(&self, other: &Vec<E>) -> bool {
        self.eq_values(other).unwrap_or(false)
    }
}
