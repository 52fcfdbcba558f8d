//! # Pipeline
//!
//! Explicit registration of interceptors against operations.
//!
//! A [`Pipeline`] is a list of bindings `(Selector, order, Interceptor)`.
//! Wrapping an operation resolves, once, which bindings match its
//! [`OperationDescriptor`] and in which order they run:
//!
//! - lower `order` runs further out (the auth gate defaults to `1`, the
//!   call logger to `i32::MAX`, so a rejected call never reaches the logger);
//! - equal `order` keeps binding order.
//!
//! The result is an [`InterceptedOperation`] that the host calls with
//! argument values.

use std::sync::Arc;

use serde_json::Value;

use crate::auth_gate::AuthGate;
use crate::call_logger::CallLogger;
use crate::chain::{Interceptor, Next, Operation};
use crate::config::InterposeConfig;
use crate::context::{CallContext, OperationDescriptor};
use crate::error::InvocationError;
use crate::outcome::InvocationOutcome;
use crate::selector::Selector;
use crate::sink::LogSink;

struct Binding {
    selector: Selector,
    order: i32,
    interceptor: Arc<dyn Interceptor>,
}

/// Builder for [`Pipeline`].
#[derive(Default)]
pub struct PipelineBuilder {
    bindings: Vec<Binding>,
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply `interceptor` to every operation matching `selector`.
    pub fn bind(
        mut self,
        selector: Selector,
        order: i32,
        interceptor: Arc<dyn Interceptor>,
    ) -> Self {
        self.bindings.push(Binding {
            selector,
            order,
            interceptor,
        });
        self
    }

    pub fn build(mut self) -> Pipeline {
        // Stable sort keeps binding order for equal `order` values.
        self.bindings.sort_by_key(|b| b.order);
        Pipeline {
            bindings: self.bindings,
        }
    }
}

/// Ordered interceptor bindings.
pub struct Pipeline {
    bindings: Vec<Binding>,
}

impl Pipeline {
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    /// Auth gate on operations tagged `config.auth.tag`, call logger on
    /// operations within `config.logging.namespace`, both emitting to `sink`.
    pub fn standard(config: &InterposeConfig, sink: Arc<dyn LogSink>) -> Self {
        let gate = AuthGate::from_settings(&config.auth, Arc::clone(&sink));
        let logger = CallLogger::new(sink);
        Self::builder()
            .bind(
                Selector::tagged(config.auth.tag.clone()),
                config.auth.order,
                Arc::new(gate),
            )
            .bind(
                Selector::within(config.logging.namespace.clone()),
                config.logging.order,
                Arc::new(logger),
            )
            .build()
    }

    /// Number of bindings.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Resolve the interceptors for `descriptor` and wrap `operation`.
    pub fn wrap(
        &self,
        descriptor: OperationDescriptor,
        operation: impl Operation + 'static,
    ) -> InterceptedOperation {
        let chain: Vec<Arc<dyn Interceptor>> = self
            .bindings
            .iter()
            .filter(|b| b.selector.matches(&descriptor))
            .map(|b| Arc::clone(&b.interceptor))
            .collect();

        tracing::debug!(
            operation = %descriptor.name(),
            namespace = %descriptor.namespace(),
            interceptors = chain.len(),
            "registered intercepted operation"
        );

        InterceptedOperation {
            descriptor: Arc::new(descriptor),
            chain,
            operation: Arc::new(operation),
        }
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let bindings: Vec<(&Selector, i32, &str)> = self
            .bindings
            .iter()
            .map(|b| (&b.selector, b.order, b.interceptor.name()))
            .collect();
        f.debug_struct("Pipeline").field("bindings", &bindings).finish()
    }
}

/// An operation together with its resolved interceptor chain.
#[derive(Clone)]
pub struct InterceptedOperation {
    descriptor: Arc<OperationDescriptor>,
    chain: Vec<Arc<dyn Interceptor>>,
    operation: Arc<dyn Operation>,
}

impl InterceptedOperation {
    pub fn descriptor(&self) -> &OperationDescriptor {
        &self.descriptor
    }

    /// Interceptor names, outermost first.
    pub fn interceptors(&self) -> Vec<&str> {
        self.chain.iter().map(|i| i.name()).collect()
    }

    /// Invoke with argument values in parameter order.
    pub fn call(&self, values: Vec<Value>) -> InvocationOutcome {
        let ctx = match CallContext::new(Arc::clone(&self.descriptor), values) {
            Ok(ctx) => ctx,
            Err(err) => {
                tracing::warn!(
                    operation = %self.descriptor.name(),
                    error = %err,
                    "rejected call with malformed arguments"
                );
                return InvocationOutcome::Failed(InvocationError::MalformedContext(err));
            }
        };

        let outcome = Next::new(&self.chain, self.operation.as_ref()).proceed(&ctx);

        tracing::debug!(
            call_id = %ctx.call_id(),
            operation = %ctx.operation_name(),
            outcome = outcome.kind(),
            "intercepted call completed"
        );
        outcome
    }
}

impl std::fmt::Debug for InterceptedOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InterceptedOperation")
            .field("operation", &self.descriptor.name())
            .field("interceptors", &self.interceptors())
            .finish()
    }
}
