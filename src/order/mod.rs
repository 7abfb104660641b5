//! Ordered sequences persisted as linked proxy nodes.
//!
//! A list is bounded by two in-memory sentinels. Real nodes live in a per-list
//! arena ([`NodeCache`]) keyed by subject and refer to their neighbors by subject,
//! so the chain never forms ownership cycles. Positions are expressed as
//! [`NodeRef`], which is either a real node handle or a boundary.

mod cache;
mod list;
mod node;
mod sentinel;
mod sequence;
mod traversal;

pub use cache::{NodeCache, NodeKey};
pub use list::OrderedList;
pub use node::{NodeStatements, ProxyNode};
pub use sentinel::{Boundary, HeadSentinel, NodeRef, TailSentinel};
pub use sequence::TargetSequence;
pub use traversal::Nodes;
