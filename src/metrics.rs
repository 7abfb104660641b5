use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Trait for tracking ordered-list activity.
///
/// Implementations receive a callback whenever a list reads a node from the
/// backing graph, materializes a member entity, mutates its chain, or flushes a
/// delta through the persistence boundary.
pub trait OrderMetrics: Send + Sync {
    /// Records a proxy node read from the backing graph.
    fn node_loaded(&self);

    /// Records a member entity materialized through the resolver.
    fn target_resolved(&self);

    /// Records a splice or unsplice of the chain.
    ///
    /// # Parameters
    /// * `kind` - `"insert"` or `"delete"`.
    fn structural_change(&self, kind: &'static str);

    /// Records a successful commit carrying `statements` retracted plus asserted.
    fn commit_flushed(&self, statements: usize);
}

/// A no-op implementation of [`OrderMetrics`].
#[derive(Default)]
pub struct NoopMetrics;

impl OrderMetrics for NoopMetrics {
    fn node_loaded(&self) {}
    fn target_resolved(&self) {}
    fn structural_change(&self, _kind: &'static str) {}
    fn commit_flushed(&self, _statements: usize) {}
}

/// Atomic counter implementation of [`OrderMetrics`].
#[derive(Default)]
pub struct CounterMetrics {
    /// Nodes read from the backing graph.
    pub nodes_loaded: AtomicU64,

    /// Member entities materialized.
    pub targets_resolved: AtomicU64,

    /// Nodes spliced into a chain.
    pub inserts: AtomicU64,

    /// Nodes unspliced from a chain.
    pub deletes: AtomicU64,

    /// Successful commits.
    pub commits: AtomicU64,

    /// Statements carried by successful commits.
    pub statements_flushed: AtomicU64,
}

impl CounterMetrics {
    /// Current node-load count.
    pub fn nodes_loaded(&self) -> u64 {
        self.nodes_loaded.load(Ordering::Relaxed)
    }

    /// Current entity-resolution count.
    pub fn targets_resolved(&self) -> u64 {
        self.targets_resolved.load(Ordering::Relaxed)
    }
}

impl OrderMetrics for CounterMetrics {
    fn node_loaded(&self) {
        self.nodes_loaded.fetch_add(1, Ordering::Relaxed);
    }

    fn target_resolved(&self) {
        self.targets_resolved.fetch_add(1, Ordering::Relaxed);
    }

    fn structural_change(&self, kind: &'static str) {
        match kind {
            "insert" => {
                self.inserts.fetch_add(1, Ordering::Relaxed);
            }
            "delete" => {
                self.deletes.fetch_add(1, Ordering::Relaxed);
            }
            _ => {}
        }
    }

    fn commit_flushed(&self, statements: usize) {
        self.commits.fetch_add(1, Ordering::Relaxed);
        self.statements_flushed
            .fetch_add(statements as u64, Ordering::Relaxed);
    }
}

/// Returns the default metrics implementation, [`NoopMetrics`].
pub fn default_metrics() -> Arc<dyn OrderMetrics> {
    Arc::new(NoopMetrics)
}
