//! Statement graph primitives.
//!
//! A [`Graph`] is an ordered set of `(subject, predicate, object)` statements. It is
//! both the unit handed to the persistence boundary and the in-memory backing of
//! [`MemoryStore`]. Ordering is total, so serialized graphs are deterministic.

use std::collections::btree_set;
use std::collections::BTreeSet;
use std::ops::Bound;

use serde::{Deserialize, Serialize};

use crate::types::{Iri, Term};

mod store;
pub mod vocab;

pub use store::{GraphStore, MemoryStore, Persister};

/// A single `(subject, predicate, object)` assertion.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Serialize, Deserialize)]
pub struct Statement {
    /// Resource the statement is about.
    pub subject: Term,
    /// Relation.
    pub predicate: Iri,
    /// Value or related resource.
    pub object: Term,
}

impl Statement {
    /// Builds a statement.
    pub fn new(subject: Term, predicate: Iri, object: Term) -> Self {
        Self {
            subject,
            predicate,
            object,
        }
    }
}

/// An ordered, duplicate-free statement set.
#[derive(Clone, Default, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Graph {
    statements: BTreeSet<Statement>,
}

impl Graph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a statement, returning `false` if it was already present.
    pub fn insert(&mut self, statement: Statement) -> bool {
        self.statements.insert(statement)
    }

    /// Removes a statement, returning `true` if it was present.
    pub fn remove(&mut self, statement: &Statement) -> bool {
        self.statements.remove(statement)
    }

    /// Returns true when the statement is present.
    pub fn contains(&self, statement: &Statement) -> bool {
        self.statements.contains(statement)
    }

    /// Number of statements.
    pub fn len(&self) -> usize {
        self.statements.len()
    }

    /// Returns true if the graph holds no statements.
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// Iterates statements in order.
    pub fn iter(&self) -> btree_set::Iter<'_, Statement> {
        self.statements.iter()
    }

    /// Statements matching `subject` and `predicate`.
    ///
    /// Uses a range scan: statements sort by subject, then predicate, then object.
    pub fn matching<'a>(
        &'a self,
        subject: &'a Term,
        predicate: &'a Iri,
    ) -> impl Iterator<Item = &'a Statement> + 'a {
        let lower = Statement::new(subject.clone(), predicate.clone(), min_term());
        self.statements
            .range((Bound::Included(lower), Bound::Unbounded))
            .take_while(move |st| &st.subject == subject && &st.predicate == predicate)
    }

    /// Objects of statements matching `subject` and `predicate`.
    pub fn objects<'a>(
        &'a self,
        subject: &'a Term,
        predicate: &'a Iri,
    ) -> impl Iterator<Item = &'a Term> + 'a {
        self.matching(subject, predicate).map(|st| &st.object)
    }

    /// Distinct subjects, in order.
    pub fn subjects(&self) -> Vec<&Term> {
        let mut out: Vec<&Term> = Vec::new();
        for st in &self.statements {
            if out.last() != Some(&&st.subject) {
                out.push(&st.subject);
            }
        }
        out
    }

    /// Statements present in `self` but not in `other`.
    pub fn difference(&self, other: &Graph) -> Graph {
        self.statements
            .difference(&other.statements)
            .cloned()
            .collect()
    }
}

fn min_term() -> Term {
    Term::Iri(Iri(String::new()))
}

impl Extend<Statement> for Graph {
    fn extend<I: IntoIterator<Item = Statement>>(&mut self, iter: I) {
        self.statements.extend(iter);
    }
}

impl FromIterator<Statement> for Graph {
    fn from_iter<I: IntoIterator<Item = Statement>>(iter: I) -> Self {
        Self {
            statements: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Graph {
    type Item = Statement;
    type IntoIter = btree_set::IntoIter<Statement>;

    fn into_iter(self) -> Self::IntoIter {
        self.statements.into_iter()
    }
}

impl<'a> IntoIterator for &'a Graph {
    type Item = &'a Statement;
    type IntoIter = btree_set::Iter<'a, Statement>;

    fn into_iter(self) -> Self::IntoIter {
        self.statements.iter()
    }
}

/// Statements to retract and assert, in that order.
#[derive(Clone, Default, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct GraphDelta {
    /// Statements present in the last committed state but no longer asserted.
    pub removed: Graph,
    /// Statements asserted now but absent from the last committed state.
    pub added: Graph,
}

impl GraphDelta {
    /// Computes the delta that turns `before` into `after`.
    pub fn between(before: &Graph, after: &Graph) -> Self {
        Self {
            removed: before.difference(after),
            added: after.difference(before),
        }
    }

    /// True when applying the delta would change nothing.
    pub fn is_empty(&self) -> bool {
        self.removed.is_empty() && self.added.is_empty()
    }

    /// Applies the delta to an in-memory graph.
    pub fn apply_to(&self, graph: &mut Graph) {
        for st in &self.removed {
            graph.remove(st);
        }
        graph.extend(self.added.iter().cloned());
    }
}
