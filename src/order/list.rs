use std::cell::{Ref, RefCell};
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rustc_hash::FxHashSet;
use tracing::{debug, trace, warn};

use crate::graph::{vocab, Graph, GraphDelta, GraphStore, Persister, Statement};
use crate::members::{Member, MemberContext};
use crate::metrics::{default_metrics, OrderMetrics};
use crate::options::OrderOptions;
use crate::types::{MemberId, OrderError, Result, Term};

use super::cache::{NodeCache, NodeKey};
use super::node::{is_persisted, single_object, ProxyNode};
use super::sentinel::{Boundary, HeadSentinel, NodeRef, TailSentinel};
use super::sequence::TargetSequence;
use super::traversal::Nodes;

/// An ordered sequence persisted as a doubly linked chain of proxy nodes.
///
/// The list is addressed by the subjects of its first and last node. Everything
/// else is discovered lazily by following `next`/`prev` links through the backing
/// store; nodes are materialized into a per-list [`NodeCache`] on first access.
/// Mutations happen in memory and reach storage only through [`Self::commit`].
pub struct OrderedList<E> {
    store: Arc<dyn GraphStore>,
    members: MemberContext<E>,
    cache: RefCell<NodeCache<E>>,
    head: HeadSentinel,
    tail: TailSentinel,
    anchor: Option<Term>,
    baseline: RefCell<Graph>,
    changed: bool,
    rng: StdRng,
    subject_base: Option<String>,
    max_steps: usize,
    metrics: Arc<dyn OrderMetrics>,
}

impl<E: Member> OrderedList<E> {
    /// Opens a list whose first and last nodes are `head_subject` and `tail_subject`.
    ///
    /// Both absent means empty. When only one end is known the other is found by
    /// walking the chain.
    pub fn open(
        store: Arc<dyn GraphStore>,
        head_subject: Option<Term>,
        tail_subject: Option<Term>,
        members: MemberContext<E>,
        options: OrderOptions,
    ) -> Result<Self> {
        let rng = match options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut list = Self {
            store,
            members,
            cache: RefCell::new(NodeCache::new()),
            head: HeadSentinel::new(head_subject),
            tail: TailSentinel::new(tail_subject),
            anchor: None,
            baseline: RefCell::new(Graph::new()),
            changed: false,
            rng,
            subject_base: options.subject_base,
            max_steps: options.max_traversal_steps,
            metrics: options.metrics.unwrap_or_else(default_metrics),
        };
        match (list.head.next_subject().cloned(), list.tail.prev_subject().cloned()) {
            (Some(first), None) => {
                let last = list.walk_to_end(&first, Boundary::Tail)?;
                warn!(%first, %last, "ordered_list.open derived missing tail");
                list.tail.set_prev(Some(last));
            }
            (None, Some(last)) => {
                let first = list.walk_to_end(&last, Boundary::Head)?;
                warn!(%first, %last, "ordered_list.open derived missing head");
                list.head.set_next(Some(first));
            }
            _ => {}
        }
        Ok(list)
    }

    /// Opens the list anchored at `anchor`, whose `iana:first`/`iana:last` name the ends.
    ///
    /// Commits of an anchored list also rewrite the anchor's `first`/`last` statements.
    pub fn load(
        store: Arc<dyn GraphStore>,
        anchor: Term,
        members: MemberContext<E>,
        options: OrderOptions,
    ) -> Result<Self> {
        let first = single_object(store.as_ref(), &anchor, &vocab::first())?;
        let last = single_object(store.as_ref(), &anchor, &vocab::last())?;
        let stored = anchor_statements(&anchor, first.as_ref(), last.as_ref());
        let mut list = Self::open(store, first, last, members, options)?;
        list.baseline.get_mut().extend(stored);
        list.anchor = Some(anchor);
        Ok(list)
    }

    /// The head sentinel.
    pub fn head(&self) -> &HeadSentinel {
        &self.head
    }

    /// The tail sentinel.
    pub fn tail(&self) -> &TailSentinel {
        &self.tail
    }

    /// Subject of the first real node.
    pub fn head_subject(&self) -> Option<&Term> {
        self.head.next_subject()
    }

    /// Subject of the last real node.
    pub fn tail_subject(&self) -> Option<&Term> {
        self.tail.prev_subject()
    }

    /// Aggregation subject carrying `first`/`last`, for lists opened with [`Self::load`].
    pub fn anchor(&self) -> Option<&Term> {
        self.anchor.as_ref()
    }

    /// Member collaborators.
    pub fn members(&self) -> &MemberContext<E> {
        &self.members
    }

    /// Returns the node for `subject`, reading it from the store on first access.
    ///
    /// Repeated lookups of one subject yield the same handle.
    pub fn fetch(&self, subject: &Term) -> Result<NodeKey> {
        let mut cache = self.cache.borrow_mut();
        cache.fetch(subject, |subject| {
            let node = ProxyNode::load(subject, self.store.as_ref())?;
            trace!(%subject, "ordered_list.node_loaded");
            self.metrics.node_loaded();
            self.baseline.borrow_mut().extend(node.to_statements());
            Ok(node)
        })
    }

    /// True when a node for `subject` is already cached.
    pub fn is_cached(&self, subject: &Term) -> bool {
        self.cache.borrow().contains_key(subject)
    }

    /// Borrows a cached node.
    pub fn node(&self, key: NodeKey) -> Result<Ref<'_, ProxyNode<E>>> {
        Ref::filter_map(self.cache.borrow(), |cache| cache.get(key))
            .map_err(|_| unknown_node(key))
    }

    /// Subject of a cached node.
    pub fn subject_of(&self, key: NodeKey) -> Result<Term> {
        Ok(self.node(key)?.subject().clone())
    }

    /// The position after `at`. The tail sentinel is its own successor.
    pub fn next_of(&self, at: NodeRef) -> Result<NodeRef> {
        let next = match at {
            NodeRef::Boundary(Boundary::Head) => self.head.next_subject().cloned(),
            NodeRef::Boundary(Boundary::Tail) => return Ok(NodeRef::TAIL),
            NodeRef::Real(key) => self.node(key)?.next_ref().cloned(),
        };
        match next {
            Some(subject) => Ok(NodeRef::Real(self.fetch(&subject)?)),
            None => Ok(NodeRef::TAIL),
        }
    }

    /// The position before `at`. The head sentinel is its own predecessor.
    pub fn prev_of(&self, at: NodeRef) -> Result<NodeRef> {
        let prev = match at {
            NodeRef::Boundary(Boundary::Tail) => self.tail.prev_subject().cloned(),
            NodeRef::Boundary(Boundary::Head) => return Ok(NodeRef::HEAD),
            NodeRef::Real(key) => self.node(key)?.prev_ref().cloned(),
        };
        match prev {
            Some(subject) => Ok(NodeRef::Real(self.fetch(&subject)?)),
            None => Ok(NodeRef::HEAD),
        }
    }

    /// The member entity of a node, resolving it on first access.
    ///
    /// Resolution failures are returned as-is and leave the node untouched, so a
    /// later call retries.
    pub fn target(&self, key: NodeKey) -> Result<Option<E>> {
        let target_ref = {
            let node = self.node(key)?;
            if let Some(target) = node.cached_target() {
                return Ok(Some(target.clone()));
            }
            match node.target_ref() {
                Some(target_ref) => target_ref.clone(),
                None => return Ok(None),
            }
        };
        let entity = self.members.resolver.resolve(&target_ref)?;
        self.metrics.target_resolved();
        if let Some(node) = self.cache.borrow_mut().get_mut(key) {
            node.cache_target(entity.clone());
        }
        Ok(Some(entity))
    }

    /// Identifier of a node's target, without resolving the entity.
    pub fn target_id(&self, key: NodeKey) -> Result<Option<MemberId>> {
        self.node(key)?.target_id(self.members.resolver.as_ref())
    }

    /// Replaces a node's target in memory. Pair with [`Self::order_will_change`].
    pub fn set_target(&mut self, key: NodeKey, target: E) -> Result<()> {
        let cache = self.cache.get_mut();
        let node = cache.get_mut(key).ok_or_else(|| unknown_node(key))?;
        node.set_target(target);
        Ok(())
    }

    /// Replaces a node's owner in memory. Pair with [`Self::order_will_change`].
    pub fn set_proxy_in(&mut self, key: NodeKey, owner: Option<Term>) -> Result<()> {
        let cache = self.cache.get_mut();
        let node = cache.get_mut(key).ok_or_else(|| unknown_node(key))?;
        node.set_proxy_in(owner);
        Ok(())
    }

    /// Appends a node for `target` after the last node.
    pub fn append_target(&mut self, target: E, proxy_in: Option<Term>) -> Result<NodeKey> {
        let last = self.prev_of(NodeRef::TAIL)?;
        let key = self.build_node()?;
        self.ensure_member(&target)?;
        self.init_node(key, |node| {
            node.set_target(target);
            node.set_proxy_in(proxy_in);
        });
        self.append_to(key, last)?;
        Ok(key)
    }

    /// Inserts a node for `target` so that it ends up at `index`.
    ///
    /// Indexes past the end append.
    pub fn insert_at(&mut self, index: usize, target: E, proxy_in: Option<Term>) -> Result<NodeKey> {
        let after = self.position_before(index)?;
        let key = self.build_node()?;
        self.ensure_member(&target)?;
        self.init_node(key, |node| {
            node.set_target(target);
            node.set_proxy_in(proxy_in);
        });
        self.append_to(key, after)?;
        Ok(key)
    }

    /// Inserts a node referencing `target_ref` at `index` without resolving the member.
    ///
    /// The member must already belong to the membership set when one is configured.
    pub fn insert_proxy_for_at(
        &mut self,
        index: usize,
        target_ref: Option<Term>,
        proxy_in: Option<Term>,
    ) -> Result<NodeKey> {
        let target_ref = target_ref.ok_or_else(|| {
            OrderError::InvalidArgument("target reference can not be nil".into())
        })?;
        let id = self.members.resolver.id_of(&target_ref)?;
        if let Some(membership) = &self.members.membership {
            if !membership.contains(&id) {
                return Err(OrderError::NotMember { id });
            }
        }
        let after = self.position_before(index)?;
        let key = self.build_node()?;
        self.init_node(key, |node| {
            node.set_target_ref(target_ref);
            node.set_proxy_in(proxy_in);
        });
        self.append_to(key, after)?;
        Ok(key)
    }

    /// Unlinks `key` if it is part of the chain, returning it.
    pub fn delete_node(&mut self, key: NodeKey) -> Result<Option<NodeKey>> {
        let mut found = false;
        for item in self.iter() {
            if item? == key {
                found = true;
                break;
            }
        }
        if !found {
            debug!(?key, "ordered_list.delete_node not in chain");
            return Ok(None);
        }
        self.unsplice(key)?;
        Ok(Some(key))
    }

    /// Unlinks the node at `index`. Out-of-range or absent indexes are a no-op.
    pub fn delete_at(&mut self, index: impl Into<Option<usize>>) -> Result<Option<NodeKey>> {
        let Some(index) = index.into() else {
            return Ok(None);
        };
        match self.get(index)? {
            Some(key) => self.delete_node(key),
            None => Ok(None),
        }
    }

    /// Unlinks every node whose target has `target`'s identifier.
    ///
    /// Returns the target of the last removed node. The target is resolved before
    /// anything is unlinked, so a resolver failure leaves the chain untouched.
    pub fn delete_target(&mut self, target: &E) -> Result<Option<E>> {
        let id = target.member_id();
        let mut doomed = Vec::new();
        for item in self.iter() {
            let key = item?;
            if self.target_id(key)?.as_ref() == Some(&id) {
                doomed.push(key);
            }
        }
        let Some(&last) = doomed.last() else {
            return Ok(None);
        };
        let removed = self.target(last)?;
        for key in doomed {
            self.unsplice(key)?;
        }
        Ok(removed)
    }

    /// Unlinks every node in `nodes` that is part of the chain.
    pub fn remove_nodes(&mut self, nodes: &[NodeKey]) -> Result<&mut Self> {
        for &key in nodes {
            self.delete_node(key)?;
        }
        Ok(self)
    }

    /// A fresh traversal of the real nodes from first to last.
    pub fn iter(&self) -> Nodes<'_, E> {
        Nodes::new(self, self.max_steps)
    }

    /// The node at `index`.
    pub fn get(&self, index: usize) -> Result<Option<NodeKey>> {
        self.iter().nth(index).transpose()
    }

    /// The first node.
    pub fn first(&self) -> Result<Option<NodeKey>> {
        Ok(self.next_of(NodeRef::HEAD)?.real())
    }

    /// The last node.
    pub fn last(&self) -> Result<Option<NodeKey>> {
        Ok(self.prev_of(NodeRef::TAIL)?.real())
    }

    /// Number of real nodes; walks the chain.
    pub fn len(&self) -> Result<usize> {
        let mut count = 0;
        for item in self.iter() {
            item?;
            count += 1;
        }
        Ok(count)
    }

    /// True when `head.next` is the tail sentinel.
    pub fn is_empty(&self) -> bool {
        self.head.next_subject().is_none()
    }

    /// Node handles in order.
    pub fn to_vec(&self) -> Result<Vec<NodeKey>> {
        self.iter().collect()
    }

    /// Every member entity in order, resolving as needed.
    pub fn targets(&self) -> Result<Vec<E>> {
        let mut out = Vec::new();
        for item in self.iter() {
            if let Some(target) = self.target(item?)? {
                out.push(target);
            }
        }
        Ok(out)
    }

    /// Target identifiers in order; never resolves a member entity.
    ///
    /// Nodes without a target reference are skipped.
    pub fn target_ids(&self) -> Result<Vec<MemberId>> {
        let mut out = Vec::new();
        for item in self.iter() {
            if let Some(id) = self.target_id(item?)? {
                out.push(id);
            }
        }
        Ok(out)
    }

    /// The aggregation the nodes proxy within.
    ///
    /// Nodes are expected to agree; when they do not, the first owner wins and the
    /// disagreement is logged.
    pub fn proxy_in(&self) -> Result<Option<Term>> {
        let mut owners: Vec<Term> = Vec::new();
        for item in self.iter() {
            let key = item?;
            let node = self.node(key)?;
            if let Some(owner) = node.proxy_in() {
                if !owners.contains(owner) {
                    owners.push(owner.clone());
                }
            }
        }
        if owners.len() > 1 {
            warn!(owners = ?owners, "ordered_list.proxy_in nodes disagree on owner");
        }
        Ok(owners.into_iter().next())
    }

    /// Statements of every real node in the chain.
    pub fn to_graph(&self) -> Result<Graph> {
        let mut graph = Graph::new();
        for item in self.iter() {
            let node = self.node(item?)?;
            graph.extend(node.to_statements());
        }
        Ok(graph)
    }

    /// True once the chain diverged from the last committed state.
    pub fn is_changed(&self) -> bool {
        self.changed
    }

    /// Marks the list changed after editing node contents directly.
    pub fn order_will_change(&mut self) {
        self.changed = true;
    }

    /// Clears the changed flag after a confirmed commit.
    pub fn changes_committed(&mut self) {
        self.changed = false;
    }

    /// Statements that a commit would retract and assert.
    pub fn delta(&self) -> Result<GraphDelta> {
        let current = self.current_graph()?;
        Ok(GraphDelta::between(&self.baseline.borrow(), &current))
    }

    /// Hands the pending delta to `persister`.
    ///
    /// On failure the chain, the baseline and the changed flag stay as they were.
    pub fn commit(&mut self, persister: &dyn Persister) -> Result<GraphDelta> {
        let current = self.current_graph()?;
        let delta = GraphDelta::between(&self.baseline.borrow(), &current);
        if !delta.is_empty() {
            persister.commit(&delta)?;
            self.metrics
                .commit_flushed(delta.removed.len() + delta.added.len());
        }
        debug!(
            removed = delta.removed.len(),
            added = delta.added.len(),
            "ordered_list.commit"
        );
        *self.baseline.get_mut() = current;
        self.changes_committed();
        Ok(delta)
    }

    /// Value-oriented view of the list.
    pub fn sequence(&mut self) -> TargetSequence<'_, E> {
        TargetSequence::new(self)
    }

    fn current_graph(&self) -> Result<Graph> {
        let mut graph = self.to_graph()?;
        if let Some(anchor) = &self.anchor {
            graph.extend(anchor_statements(
                anchor,
                self.head.next_subject(),
                self.tail.prev_subject(),
            ));
        }
        Ok(graph)
    }

    fn ensure_member(&self, target: &E) -> Result<()> {
        if let Some(membership) = &self.members.membership {
            if !membership.contains(&target.member_id()) {
                membership.add(target)?;
            }
        }
        Ok(())
    }

    fn position_before(&self, index: usize) -> Result<NodeRef> {
        if index == 0 {
            return Ok(NodeRef::HEAD);
        }
        match self.iter().take(index).last() {
            Some(item) => Ok(NodeRef::Real(item?)),
            None => Ok(NodeRef::HEAD),
        }
    }

    /// Mints a subject unused by both the cache and the store.
    fn build_node(&mut self) -> Result<NodeKey> {
        let cache = self.cache.get_mut();
        loop {
            let token: u64 = self.rng.gen();
            let subject = match &self.subject_base {
                Some(base) => Term::iri(format!("{base}#{token:016x}")),
                None => Term::blank(format!("{token:016x}")),
            };
            if cache.contains_key(&subject) || is_persisted(self.store.as_ref(), &subject)? {
                trace!(%subject, "ordered_list.mint collision");
                continue;
            }
            return Ok(cache.insert(ProxyNode::new(subject)));
        }
    }

    fn init_node<F: FnOnce(&mut ProxyNode<E>)>(&mut self, key: NodeKey, init: F) {
        if let Some(node) = self.cache.get_mut().get_mut(key) {
            init(node);
        }
    }

    /// Links `key` directly after `after`.
    fn append_to(&mut self, key: NodeKey, after: NodeRef) -> Result<()> {
        if after == NodeRef::TAIL {
            return Err(OrderError::InvalidArgument(
                "cannot link after the tail sentinel".into(),
            ));
        }
        let subject = self.subject_of(key)?;
        let after_subject = match after {
            NodeRef::Real(after_key) => Some(self.subject_of(after_key)?),
            NodeRef::Boundary(_) => None,
        };
        let following = self.next_of(after)?;
        let following_subject = match following {
            NodeRef::Real(next_key) => Some(self.subject_of(next_key)?),
            NodeRef::Boundary(_) => None,
        };

        let cache = self.cache.get_mut();
        if let Some(node) = cache.get_mut(key) {
            node.set_prev_ref(after_subject.clone());
            node.set_next_ref(following_subject);
        }
        match following {
            NodeRef::Real(next_key) => {
                if let Some(next) = cache.get_mut(next_key) {
                    next.set_prev_ref(Some(subject.clone()));
                }
            }
            NodeRef::Boundary(_) => self.tail.set_prev(Some(subject.clone())),
        }
        match after {
            NodeRef::Real(after_key) => {
                if let Some(prev) = cache.get_mut(after_key) {
                    prev.set_next_ref(Some(subject.clone()));
                }
            }
            NodeRef::Boundary(_) => self.head.set_next(Some(subject.clone())),
        }
        self.changed = true;
        self.metrics.structural_change("insert");
        debug!(%subject, after = ?after_subject, "ordered_list.splice");
        Ok(())
    }

    /// Links the neighbors of `key` to each other. `key` keeps its own links.
    fn unsplice(&mut self, key: NodeKey) -> Result<()> {
        let subject = self.subject_of(key)?;
        let prev = self.prev_of(NodeRef::Real(key))?;
        let next = self.next_of(NodeRef::Real(key))?;
        let prev_subject = match prev {
            NodeRef::Real(prev_key) => Some(self.subject_of(prev_key)?),
            NodeRef::Boundary(_) => None,
        };
        let next_subject = match next {
            NodeRef::Real(next_key) => Some(self.subject_of(next_key)?),
            NodeRef::Boundary(_) => None,
        };

        let cache = self.cache.get_mut();
        match prev {
            NodeRef::Real(prev_key) => {
                if let Some(node) = cache.get_mut(prev_key) {
                    node.set_next_ref(next_subject);
                }
            }
            NodeRef::Boundary(_) => self.head.set_next(next_subject),
        }
        match next {
            NodeRef::Real(next_key) => {
                if let Some(node) = cache.get_mut(next_key) {
                    node.set_prev_ref(prev_subject);
                }
            }
            NodeRef::Boundary(_) => self.tail.set_prev(prev_subject),
        }
        self.changed = true;
        self.metrics.structural_change("delete");
        debug!(%subject, "ordered_list.unsplice");
        Ok(())
    }

    fn walk_to_end(&self, from: &Term, toward: Boundary) -> Result<Term> {
        let mut seen = FxHashSet::default();
        let mut current = from.clone();
        loop {
            if !seen.insert(current.clone()) {
                return Err(OrderError::Cycle { subject: current });
            }
            if seen.len() > self.max_steps {
                return Err(OrderError::TraversalLimit {
                    limit: self.max_steps,
                });
            }
            let key = self.fetch(&current)?;
            let node = self.node(key)?;
            let step = match toward {
                Boundary::Tail => node.next_ref(),
                Boundary::Head => node.prev_ref(),
            };
            match step {
                Some(subject) => {
                    let subject = subject.clone();
                    drop(node);
                    current = subject;
                }
                None => return Ok(current),
            }
        }
    }
}

fn anchor_statements(anchor: &Term, first: Option<&Term>, last: Option<&Term>) -> Vec<Statement> {
    let mut out = Vec::with_capacity(2);
    if let Some(first) = first {
        out.push(Statement::new(anchor.clone(), vocab::first(), first.clone()));
    }
    if let Some(last) = last {
        out.push(Statement::new(anchor.clone(), vocab::last(), last.clone()));
    }
    out
}

fn unknown_node(key: NodeKey) -> OrderError {
    OrderError::InvalidArgument(format!("{key:?} does not belong to this list"))
}
