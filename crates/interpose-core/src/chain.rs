//! # Interceptor Chain
//!
//! An intercepted call runs as a chain: each [`Interceptor`] receives the
//! [`CallContext`] and a [`Next`] handle for the rest of the chain. Calling
//! [`Next::proceed`] runs the remaining interceptors and finally the wrapped
//! [`Operation`]; dropping `Next` without proceeding suppresses the call.
//!
//! ```text
//! AuthGate ─proceed→ CallLogger ─proceed→ Operation
//!    │                                       │
//!    └──────────── InvocationOutcome ←───────┘
//! ```
//!
//! `Next::proceed` takes `self`, so an interceptor can run the wrapped call at
//! most once.

use std::sync::Arc;

use serde_json::Value;

use crate::context::CallContext;
use crate::error::{CallFault, InvocationError};
use crate::outcome::InvocationOutcome;

/// A wrapped operation: the real work behind an intercepted call.
pub trait Operation: Send + Sync {
    fn invoke(&self, ctx: &CallContext) -> Result<Value, CallFault>;
}

impl<F> Operation for F
where
    F: Fn(&CallContext) -> Result<Value, CallFault> + Send + Sync,
{
    fn invoke(&self, ctx: &CallContext) -> Result<Value, CallFault> {
        self(ctx)
    }
}

/// Cross-cutting behaviour placed around an operation.
pub trait Interceptor: Send + Sync {
    /// Stable interceptor name, reported by
    /// [`InterceptedOperation::interceptors`](crate::InterceptedOperation::interceptors).
    fn name(&self) -> &str;

    /// Handle one call. Return `next.proceed(ctx)` (possibly inspected or
    /// replaced) to run the wrapped call, or any other outcome to skip it.
    fn intercept(&self, ctx: &CallContext, next: Next<'_>) -> InvocationOutcome;
}

/// Handle to the remainder of an interceptor chain.
pub struct Next<'a> {
    remaining: &'a [Arc<dyn Interceptor>],
    target: &'a dyn Operation,
}

impl<'a> Next<'a> {
    pub fn new(remaining: &'a [Arc<dyn Interceptor>], target: &'a dyn Operation) -> Self {
        Self { remaining, target }
    }

    /// Number of interceptors still ahead of the operation.
    pub fn depth(&self) -> usize {
        self.remaining.len()
    }

    /// Run the rest of the chain, then the operation.
    pub fn proceed(self, ctx: &CallContext) -> InvocationOutcome {
        match self.remaining.split_first() {
            Some((head, rest)) => head.intercept(ctx, Next::new(rest, self.target)),
            None => match self.target.invoke(ctx) {
                Ok(value) => InvocationOutcome::Proceeded(value),
                Err(fault) => InvocationOutcome::Failed(InvocationError::WrappedCall(fault)),
            },
        }
    }
}

impl std::fmt::Debug for Next<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.remaining.iter().map(|i| i.name()).collect();
        f.debug_struct("Next").field("remaining", &names).finish()
    }
}
