//! Predicates used to persist a proxy chain.

use crate::types::Iri;

/// ORE namespace.
pub const ORE: &str = "http://www.openarchives.org/ore/terms/";
/// IANA link-relation namespace.
pub const IANA: &str = "http://www.iana.org/assignments/relation/";

/// `ore:proxyFor`: node → member reference.
pub const PROXY_FOR: &str = "http://www.openarchives.org/ore/terms/proxyFor";
/// `ore:proxyIn`: node → aggregation reference.
pub const PROXY_IN: &str = "http://www.openarchives.org/ore/terms/proxyIn";
/// `iana:next`: node → following node.
pub const NEXT: &str = "http://www.iana.org/assignments/relation/next";
/// `iana:prev`: node → preceding node.
pub const PREV: &str = "http://www.iana.org/assignments/relation/prev";
/// `iana:first`: aggregation → head node.
pub const FIRST: &str = "http://www.iana.org/assignments/relation/first";
/// `iana:last`: aggregation → tail node.
pub const LAST: &str = "http://www.iana.org/assignments/relation/last";

/// Returns `ore:proxyFor`.
pub fn proxy_for() -> Iri {
    Iri::new(PROXY_FOR)
}

/// Returns `ore:proxyIn`.
pub fn proxy_in() -> Iri {
    Iri::new(PROXY_IN)
}

/// Returns `iana:next`.
pub fn next() -> Iri {
    Iri::new(NEXT)
}

/// Returns `iana:prev`.
pub fn prev() -> Iri {
    Iri::new(PREV)
}

/// Returns `iana:first`.
pub fn first() -> Iri {
    Iri::new(FIRST)
}

/// Returns `iana:last`.
pub fn last() -> Iri {
    Iri::new(LAST)
}
