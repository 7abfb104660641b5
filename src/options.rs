use std::sync::Arc;

use crate::metrics::OrderMetrics;

/// Default upper bound on nodes visited by a single traversal.
pub const DEFAULT_MAX_TRAVERSAL_STEPS: usize = 1_000_000;

/// Configuration options supplied when opening an [`crate::order::OrderedList`].
#[derive(Clone)]
pub struct OrderOptions {
    /// Maximum number of real nodes a traversal may visit before failing.
    pub max_traversal_steps: usize,
    /// IRI new node subjects are minted under as `<base>#<hex>`; blank nodes when `None`.
    pub subject_base: Option<String>,
    /// Seed for subject minting. Entropy-seeded when `None`.
    pub seed: Option<u64>,
    /// Optional metrics collection implementation
    pub metrics: Option<Arc<dyn OrderMetrics>>,
}

impl Default for OrderOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderOptions {
    /// Creates options with default settings.
    pub fn new() -> Self {
        Self {
            max_traversal_steps: DEFAULT_MAX_TRAVERSAL_STEPS,
            subject_base: None,
            seed: None,
            metrics: None,
        }
    }

    /// Sets the traversal step budget.
    pub fn max_traversal_steps(mut self, steps: usize) -> Self {
        self.max_traversal_steps = steps;
        self
    }

    /// Mints node subjects as hash IRIs under `base`.
    pub fn subject_base(mut self, base: impl Into<String>) -> Self {
        self.subject_base = Some(base.into());
        self
    }

    /// Makes subject minting deterministic.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets the metrics collection implementation.
    pub fn metrics(mut self, metrics: Arc<dyn OrderMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }
}
