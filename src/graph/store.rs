use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use tracing::debug;

use crate::types::{Iri, Result, Term};

use super::{Graph, GraphDelta, Statement};

/// Narrow read/write interface to the backing statement store.
///
/// Ordered lists never touch store state except through these calls.
pub trait GraphStore: Send + Sync {
    /// Returns every statement with the given subject and predicate.
    fn query(&self, subject: &Term, predicate: &Iri) -> Result<Vec<Statement>>;

    /// Asserts statements.
    fn insert(&self, statements: &Graph) -> Result<()>;

    /// Retracts statements. Absent statements are ignored.
    fn delete(&self, statements: &Graph) -> Result<()>;
}

/// Persistence boundary that receives serialized list deltas.
///
/// Transport, retries and conflict detection belong to the implementation.
pub trait Persister {
    /// Applies `delta` durably or returns an error leaving the caller's state untouched.
    fn commit(&self, delta: &GraphDelta) -> Result<()>;
}

/// Statement store kept entirely in memory.
#[derive(Default)]
pub struct MemoryStore {
    graph: RwLock<Graph>,
    queries: AtomicU64,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store seeded with `graph`.
    pub fn from_graph(graph: Graph) -> Self {
        Self {
            graph: RwLock::new(graph),
            queries: AtomicU64::new(0),
        }
    }

    /// Copies the current contents.
    pub fn snapshot(&self) -> Graph {
        self.graph.read().clone()
    }

    /// Number of `query` calls served since creation.
    pub fn query_count(&self) -> u64 {
        self.queries.load(Ordering::Relaxed)
    }
}

impl GraphStore for MemoryStore {
    fn query(&self, subject: &Term, predicate: &Iri) -> Result<Vec<Statement>> {
        self.queries.fetch_add(1, Ordering::Relaxed);
        let graph = self.graph.read();
        Ok(graph.matching(subject, predicate).cloned().collect())
    }

    fn insert(&self, statements: &Graph) -> Result<()> {
        self.graph.write().extend(statements.iter().cloned());
        Ok(())
    }

    fn delete(&self, statements: &Graph) -> Result<()> {
        let mut graph = self.graph.write();
        for st in statements {
            graph.remove(st);
        }
        Ok(())
    }
}

impl Persister for MemoryStore {
    fn commit(&self, delta: &GraphDelta) -> Result<()> {
        let mut graph = self.graph.write();
        delta.apply_to(&mut graph);
        debug!(
            removed = delta.removed.len(),
            added = delta.added.len(),
            total = graph.len(),
            "memory_store.commit"
        );
        Ok(())
    }
}
