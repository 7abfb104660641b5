//! Ordered aggregation membership persisted as linked proxy nodes in a statement graph.
//!
//! An aggregation's member order is stored as a chain of small proxy records, each
//! pointing at one member and at its neighbors. The chain is addressed only by its
//! first and last node; [`order::OrderedList`] walks it lazily, edits it in memory
//! and writes back a statement delta on commit.

#![warn(missing_docs)]

pub mod config;
pub mod graph;
pub mod logging;
pub mod members;
pub mod metrics;
pub mod options;
pub mod order;
pub mod types;

pub use graph::{Graph, GraphDelta, GraphStore, MemoryStore, Persister, Statement};
pub use members::{
    BareMember, BareResolver, Member, MemberContext, MemberResolver, MembershipSet,
    MemoryMembership, MemoryRepository, UriTranslator,
};
pub use metrics::{default_metrics, CounterMetrics, NoopMetrics, OrderMetrics};
pub use options::OrderOptions;
pub use order::{NodeKey, NodeRef, OrderedList, TargetSequence};
pub use types::{Iri, MemberId, OrderError, Result, Term};
