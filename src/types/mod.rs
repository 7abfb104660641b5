//! Identifiers and the crate-wide error type.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An absolute IRI used for addressable subjects and for predicates.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Serialize, Deserialize)]
pub struct Iri(pub String);

impl Iri {
    /// Wraps an IRI string.
    pub fn new(value: impl Into<String>) -> Self {
        Iri(value.into())
    }

    /// Returns the IRI text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Iri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", self.0)
    }
}

/// A node of the statement graph: subject or object position.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Term {
    /// Addressable resource.
    Iri(Iri),
    /// Graph-local resource, stored without the `_:` prefix.
    Blank(String),
    /// Plain literal value.
    Literal(String),
}

impl Term {
    /// Builds an IRI term.
    pub fn iri(value: impl Into<String>) -> Self {
        Term::Iri(Iri::new(value))
    }

    /// Builds a blank-node term.
    pub fn blank(label: impl Into<String>) -> Self {
        Term::Blank(label.into())
    }

    /// Builds a literal term.
    pub fn literal(value: impl Into<String>) -> Self {
        Term::Literal(value.into())
    }

    /// Returns the IRI when this term is addressable.
    pub fn as_iri(&self) -> Option<&Iri> {
        match self {
            Term::Iri(iri) => Some(iri),
            _ => None,
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Iri(iri) => write!(f, "{iri}"),
            Term::Blank(label) => write!(f, "_:{label}"),
            Term::Literal(value) => write!(f, "{value:?}"),
        }
    }
}

impl From<Iri> for Term {
    fn from(value: Iri) -> Self {
        Term::Iri(value)
    }
}

/// Canonical identifier of a member entity, independent of its IRI.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Serialize, Deserialize)]
pub struct MemberId(pub String);

impl MemberId {
    /// Wraps an identifier string.
    pub fn new(value: impl Into<String>) -> Self {
        MemberId(value.into())
    }

    /// Returns the identifier text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for MemberId {
    fn from(value: String) -> Self {
        MemberId(value)
    }
}

impl From<&str> for MemberId {
    fn from(value: &str) -> Self {
        MemberId(value.to_string())
    }
}

/// Errors raised by ordered-list operations and their collaborators.
#[derive(thiserror::Error, Debug)]
pub enum OrderError {
    /// IO failure from the file-backed tooling.
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),
    /// Statement file could not be encoded or decoded.
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    /// A caller passed an argument the operation cannot accept.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// The referenced member is not part of the aggregation's membership set.
    #[error("{id} is not a member of the aggregation")]
    NotMember {
        /// The rejected identifier.
        id: MemberId,
    },
    /// A member reference could not be resolved.
    #[error("{0} not found")]
    NotFound(String),
    /// Traversal revisited a node before reaching the tail.
    #[error("cycle detected in proxy chain at {subject}")]
    Cycle {
        /// First subject seen twice.
        subject: Term,
    },
    /// Traversal exceeded the configured step budget.
    #[error("proxy chain exceeds traversal limit of {limit} nodes")]
    TraversalLimit {
        /// The configured limit.
        limit: usize,
    },
    /// Stored chain data is malformed.
    #[error("corruption: {0}")]
    Corruption(String),
    /// The persistence boundary rejected a delta.
    #[error("commit failed: {0}")]
    Commit(String),
    /// Configuration file problem.
    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, OrderError>;
