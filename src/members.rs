//! Member-side collaborators of an ordered list.
//!
//! The list itself only ever stores member *references*. Turning a reference into an
//! entity, translating between references and identifiers, and tracking unordered
//! membership all happen behind the traits in this module.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::types::{MemberId, OrderError, Result, Term};

/// An entity that can be referenced from a proxy node.
pub trait Member: Clone + fmt::Debug {
    /// Canonical identifier.
    fn member_id(&self) -> MemberId;
    /// Reference persisted as the node's `proxyFor` object.
    fn member_ref(&self) -> Term;
}

/// Resolves member references.
pub trait MemberResolver<E>: Send + Sync {
    /// Materializes the entity behind `target_ref`. May perform I/O.
    fn resolve(&self, target_ref: &Term) -> Result<E>;

    /// Translates a reference to an identifier without materializing the entity.
    fn id_of(&self, target_ref: &Term) -> Result<MemberId>;

    /// Translates an identifier to the reference stored in the graph.
    fn ref_of(&self, id: &MemberId) -> Result<Term>;
}

/// Unordered membership of the aggregation.
pub trait MembershipSet<E>: Send + Sync {
    /// True when `id` is already a member.
    fn contains(&self, id: &MemberId) -> bool;
    /// Records `entity` as a member.
    fn add(&self, entity: &E) -> Result<()>;
}

/// Collaborators an ordered list needs to deal with members.
pub struct MemberContext<E> {
    /// Reference/identifier translation and entity resolution.
    pub resolver: Arc<dyn MemberResolver<E>>,
    /// Unordered membership kept in step with insertions, when present.
    pub membership: Option<Arc<dyn MembershipSet<E>>>,
}

impl<E> MemberContext<E> {
    /// Context without a membership collaborator.
    pub fn new(resolver: Arc<dyn MemberResolver<E>>) -> Self {
        Self {
            resolver,
            membership: None,
        }
    }

    /// Attaches a membership collaborator.
    pub fn with_membership(mut self, membership: Arc<dyn MembershipSet<E>>) -> Self {
        self.membership = Some(membership);
        self
    }
}

impl<E> Clone for MemberContext<E> {
    fn clone(&self) -> Self {
        Self {
            resolver: Arc::clone(&self.resolver),
            membership: self.membership.clone(),
        }
    }
}

/// Translates between `<base>/<id>` IRIs and identifiers.
#[derive(Clone, Debug)]
pub struct UriTranslator {
    base: String,
}

impl UriTranslator {
    /// Creates a translator rooted at `base`; a trailing slash is ignored.
    pub fn new(base: impl Into<String>) -> Self {
        let mut base = base.into();
        while base.ends_with('/') {
            base.pop();
        }
        Self { base }
    }

    /// The configured base without trailing slash.
    pub fn base(&self) -> &str {
        &self.base
    }

    /// `<base>/<id>` → `id`.
    pub fn id_of(&self, target_ref: &Term) -> Result<MemberId> {
        let iri = target_ref.as_iri().ok_or_else(|| {
            OrderError::InvalidArgument(format!("{target_ref} is not an addressable member"))
        })?;
        let id = iri
            .as_str()
            .strip_prefix(self.base.as_str())
            .and_then(|rest| rest.strip_prefix('/'))
            .filter(|rest| !rest.is_empty())
            .ok_or_else(|| {
                OrderError::InvalidArgument(format!("{target_ref} is outside {}", self.base))
            })?;
        Ok(MemberId::new(id))
    }

    /// `id` → `<base>/<id>`.
    pub fn ref_of(&self, id: &MemberId) -> Term {
        Term::iri(format!("{}/{}", self.base, id))
    }
}

/// A member known only by its identifier and reference.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct BareMember {
    /// Identifier.
    pub id: MemberId,
    /// Reference.
    pub uri: Term,
}

impl BareMember {
    /// Builds a bare member under `translator`'s base.
    pub fn new(translator: &UriTranslator, id: impl Into<MemberId>) -> Self {
        let id = id.into();
        let uri = translator.ref_of(&id);
        Self { id, uri }
    }
}

impl Member for BareMember {
    fn member_id(&self) -> MemberId {
        self.id.clone()
    }

    fn member_ref(&self) -> Term {
        self.uri.clone()
    }
}

/// Resolver that builds [`BareMember`]s from references without any lookups.
#[derive(Clone, Debug)]
pub struct BareResolver {
    translator: UriTranslator,
}

impl BareResolver {
    /// Creates a resolver over `translator`.
    pub fn new(translator: UriTranslator) -> Self {
        Self { translator }
    }
}

impl MemberResolver<BareMember> for BareResolver {
    fn resolve(&self, target_ref: &Term) -> Result<BareMember> {
        Ok(BareMember {
            id: self.translator.id_of(target_ref)?,
            uri: target_ref.clone(),
        })
    }

    fn id_of(&self, target_ref: &Term) -> Result<MemberId> {
        self.translator.id_of(target_ref)
    }

    fn ref_of(&self, id: &MemberId) -> Result<Term> {
        Ok(self.translator.ref_of(id))
    }
}

/// In-memory entity repository; resolution fails for unregistered identifiers.
pub struct MemoryRepository<E> {
    translator: UriTranslator,
    entities: RwLock<FxHashMap<MemberId, E>>,
    resolutions: AtomicU64,
}

impl<E: Member> MemoryRepository<E> {
    /// Creates an empty repository under `translator`.
    pub fn new(translator: UriTranslator) -> Self {
        Self {
            translator,
            entities: RwLock::new(FxHashMap::default()),
            resolutions: AtomicU64::new(0),
        }
    }

    /// Registers or replaces an entity.
    pub fn register(&self, entity: E) {
        self.entities.write().insert(entity.member_id(), entity);
    }

    /// Drops an entity so later resolutions fail.
    pub fn forget(&self, id: &MemberId) -> Option<E> {
        self.entities.write().remove(id)
    }

    /// Number of successful or failed `resolve` calls.
    pub fn resolution_count(&self) -> u64 {
        self.resolutions.load(Ordering::Relaxed)
    }
}

impl<E: Member + Send + Sync> MemberResolver<E> for MemoryRepository<E> {
    fn resolve(&self, target_ref: &Term) -> Result<E> {
        self.resolutions.fetch_add(1, Ordering::Relaxed);
        let id = self.translator.id_of(target_ref)?;
        self.entities
            .read()
            .get(&id)
            .cloned()
            .ok_or_else(|| OrderError::NotFound(format!("member {id}")))
    }

    fn id_of(&self, target_ref: &Term) -> Result<MemberId> {
        self.translator.id_of(target_ref)
    }

    fn ref_of(&self, id: &MemberId) -> Result<Term> {
        Ok(self.translator.ref_of(id))
    }
}

/// Membership set kept in memory.
#[derive(Default)]
pub struct MemoryMembership {
    ids: RwLock<FxHashSet<MemberId>>,
}

impl MemoryMembership {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the set with identifiers.
    pub fn with_ids<I: IntoIterator<Item = MemberId>>(ids: I) -> Self {
        Self {
            ids: RwLock::new(ids.into_iter().collect()),
        }
    }

    /// Sorted snapshot of member identifiers.
    pub fn ids(&self) -> Vec<MemberId> {
        let mut ids: Vec<_> = self.ids.read().iter().cloned().collect();
        ids.sort();
        ids
    }
}

impl<E: Member> MembershipSet<E> for MemoryMembership {
    fn contains(&self, id: &MemberId) -> bool {
        self.ids.read().contains(id)
    }

    fn add(&self, entity: &E) -> Result<()> {
        self.ids.write().insert(entity.member_id());
        Ok(())
    }
}
