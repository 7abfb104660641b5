use smallvec::SmallVec;

use crate::graph::{vocab, GraphStore, Statement};
use crate::members::{Member, MemberResolver};
use crate::types::{Iri, MemberId, OrderError, Result, Term};

/// Statements describing one proxy node; at most four.
pub type NodeStatements = SmallVec<[Statement; 4]>;

/// One element of a persisted chain.
///
/// Links are stored as neighbor subjects. An absent `next`/`prev` means the node sits
/// at that end of the chain and the neighbor is the corresponding sentinel. Setters
/// change memory only; nothing is written until the owning list commits.
#[derive(Clone, Debug)]
pub struct ProxyNode<E> {
    subject: Term,
    target_ref: Option<Term>,
    target: Option<E>,
    owner_ref: Option<Term>,
    next_ref: Option<Term>,
    prev_ref: Option<Term>,
}

impl<E> ProxyNode<E> {
    /// A node with no target, owner or links.
    pub fn new(subject: Term) -> Self {
        Self {
            subject,
            target_ref: None,
            target: None,
            owner_ref: None,
            next_ref: None,
            prev_ref: None,
        }
    }

    /// Reads the node's statements from `store`.
    pub fn load(subject: &Term, store: &dyn GraphStore) -> Result<Self> {
        let target_ref = single_object(store, subject, &vocab::proxy_for())?;
        let owner_ref = single_object(store, subject, &vocab::proxy_in())?;
        let next_ref = single_object(store, subject, &vocab::next())?;
        let prev_ref = single_object(store, subject, &vocab::prev())?;
        if target_ref.is_none() && owner_ref.is_none() && next_ref.is_none() && prev_ref.is_none()
        {
            return Err(OrderError::Corruption(format!(
                "dangling proxy reference {subject}"
            )));
        }
        Ok(Self {
            subject: subject.clone(),
            target_ref,
            target: None,
            owner_ref,
            next_ref,
            prev_ref,
        })
    }

    /// Subject naming this node in the graph.
    pub fn subject(&self) -> &Term {
        &self.subject
    }

    /// Reference to the member entity.
    pub fn target_ref(&self) -> Option<&Term> {
        self.target_ref.as_ref()
    }

    /// The member entity, if already materialized.
    pub fn cached_target(&self) -> Option<&E> {
        self.target.as_ref()
    }

    /// Aggregation this node proxies within.
    pub fn proxy_in(&self) -> Option<&Term> {
        self.owner_ref.as_ref()
    }

    /// Subject of the following node; `None` at the end.
    pub fn next_ref(&self) -> Option<&Term> {
        self.next_ref.as_ref()
    }

    /// Subject of the preceding node; `None` at the start.
    pub fn prev_ref(&self) -> Option<&Term> {
        self.prev_ref.as_ref()
    }

    /// Points the node at a bare reference and drops any materialized entity.
    pub fn set_target_ref(&mut self, target_ref: Term) {
        self.target_ref = Some(target_ref);
        self.target = None;
    }

    /// Sets the owning aggregation.
    pub fn set_proxy_in(&mut self, owner: Option<Term>) {
        self.owner_ref = owner;
    }

    pub(crate) fn set_next_ref(&mut self, next: Option<Term>) {
        self.next_ref = next;
    }

    pub(crate) fn set_prev_ref(&mut self, prev: Option<Term>) {
        self.prev_ref = prev;
    }

    pub(crate) fn cache_target(&mut self, target: E) {
        self.target = Some(target);
    }

    /// The node's assertions. Links to sentinels are never emitted.
    pub fn to_statements(&self) -> NodeStatements {
        let mut out = NodeStatements::new();
        let mut push = |predicate: Iri, object: &Option<Term>| {
            if let Some(object) = object {
                out.push(Statement::new(self.subject.clone(), predicate, object.clone()));
            }
        };
        push(vocab::proxy_for(), &self.target_ref);
        push(vocab::proxy_in(), &self.owner_ref);
        push(vocab::next(), &self.next_ref);
        push(vocab::prev(), &self.prev_ref);
        out
    }
}

impl<E: Member> ProxyNode<E> {
    /// Sets the member entity and its reference.
    pub fn set_target(&mut self, target: E) {
        self.target_ref = Some(target.member_ref());
        self.target = Some(target);
    }

    /// Identifier of the target without materializing it.
    pub fn target_id(&self, resolver: &dyn MemberResolver<E>) -> Result<Option<MemberId>> {
        if let Some(target) = &self.target {
            return Ok(Some(target.member_id()));
        }
        self.target_ref
            .as_ref()
            .map(|target_ref| resolver.id_of(target_ref))
            .transpose()
    }
}

impl<E> PartialEq for ProxyNode<E> {
    fn eq(&self, other: &Self) -> bool {
        self.subject == other.subject
    }
}

impl<E> Eq for ProxyNode<E> {}

pub(crate) fn single_object(
    store: &dyn GraphStore,
    subject: &Term,
    predicate: &Iri,
) -> Result<Option<Term>> {
    let mut found = store.query(subject, predicate)?;
    match found.len() {
        0 => Ok(None),
        1 => Ok(found.pop().map(|st| st.object)),
        n => Err(OrderError::Corruption(format!(
            "{subject} has {n} values for {predicate}"
        ))),
    }
}

/// True when `store` holds any proxy statement about `subject`.
pub(crate) fn is_persisted(store: &dyn GraphStore, subject: &Term) -> Result<bool> {
    for predicate in [
        vocab::proxy_for(),
        vocab::proxy_in(),
        vocab::next(),
        vocab::prev(),
    ] {
        if !store.query(subject, &predicate)?.is_empty() {
            return Ok(true);
        }
    }
    Ok(false)
}
