//! # Target Selection
//!
//! Declarative rules deciding which operations an interceptor wraps.
//! Selection happens once, when an operation is registered with a
//! [`Pipeline`](crate::Pipeline), never per call.

use crate::context::OperationDescriptor;

/// Rule matching a set of operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// Every operation.
    All,
    /// Operations carrying the given tag.
    Tagged(String),
    /// Operations in the namespace or any dotted sub-namespace of it.
    Within(String),
    /// The operation with exactly this name.
    Named(String),
    /// Operations matched by at least one inner selector.
    AnyOf(Vec<Selector>),
}

impl Selector {
    pub fn tagged(tag: impl Into<String>) -> Self {
        Self::Tagged(tag.into())
    }

    pub fn within(namespace: impl Into<String>) -> Self {
        Self::Within(namespace.into())
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    pub fn matches(&self, op: &OperationDescriptor) -> bool {
        match self {
            Self::All => true,
            Self::Tagged(tag) => op.has_tag(tag),
            Self::Within(namespace) => namespace_contains(namespace, op.namespace()),
            Self::Named(name) => op.name() == name,
            Self::AnyOf(selectors) => selectors.iter().any(|s| s.matches(op)),
        }
    }
}

/// `controller` contains `controller` and `controller.polkaman`, but not
/// `controllers`.
fn namespace_contains(outer: &str, candidate: &str) -> bool {
    match candidate.strip_prefix(outer) {
        Some(rest) => rest.is_empty() || rest.starts_with('.'),
        None => false,
    }
}
