//! # Call Context
//!
//! Per-invocation view of an intercepted call: which operation is being
//! invoked and the arguments it received, each paired with its declared
//! parameter name.
//!
//! Parameter names come from the [`OperationDescriptor`] supplied at
//! registration time rather than from runtime signature introspection, so an
//! interceptor asks for `argument("auth")` and gets `None` when the
//! operation has no such parameter. There is no positional fallback.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::error::ContextError;

// ── OperationDescriptor ─────────────────────────────────────────────────────

/// Static description of a registered operation.
///
/// The namespace is dot-separated (`controller.polkaman`) and is what
/// [`Selector::Within`](crate::Selector::Within) matches against. Tags stand
/// in for method annotations and are matched by
/// [`Selector::Tagged`](crate::Selector::Tagged).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperationDescriptor {
    name: String,
    namespace: String,
    tags: BTreeSet<String>,
    parameters: Vec<String>,
}

impl OperationDescriptor {
    /// Describe an operation with no parameters and no tags.
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            tags: BTreeSet::new(),
            parameters: Vec::new(),
        }
    }

    /// Declare the ordered parameter names.
    pub fn with_parameters<I, S>(mut self, parameters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.parameters = parameters.into_iter().map(Into::into).collect();
        self
    }

    /// Attach a tag.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn parameters(&self) -> &[String] {
        &self.parameters
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(String::as_str)
    }

    /// Index of the first parameter with the given name.
    pub fn position_of(&self, parameter: &str) -> Option<usize> {
        self.parameters.iter().position(|p| p == parameter)
    }
}

// ── CallContext ─────────────────────────────────────────────────────────────

/// One invocation of an intercepted operation.
///
/// Created by [`InterceptedOperation::call`](crate::InterceptedOperation::call)
/// and borrowed by every interceptor in the chain. It is dropped when the
/// call completes.
#[derive(Debug, Clone)]
pub struct CallContext {
    call_id: Uuid,
    descriptor: Arc<OperationDescriptor>,
    values: Vec<Value>,
}

impl CallContext {
    /// Bind argument values to the descriptor's parameters.
    ///
    /// Fails with [`ContextError::ArityMismatch`] when the value count does
    /// not equal the declared parameter count.
    pub fn new(
        descriptor: Arc<OperationDescriptor>,
        values: Vec<Value>,
    ) -> Result<Self, ContextError> {
        let expected = descriptor.parameters().len();
        if values.len() != expected {
            return Err(ContextError::ArityMismatch {
                operation: descriptor.name().to_string(),
                expected,
                actual: values.len(),
            });
        }
        Ok(Self {
            call_id: Uuid::new_v4(),
            descriptor,
            values,
        })
    }

    /// Unique id of this invocation, used to correlate log records.
    pub fn call_id(&self) -> Uuid {
        self.call_id
    }

    pub fn descriptor(&self) -> &OperationDescriptor {
        &self.descriptor
    }

    pub fn operation_name(&self) -> &str {
        self.descriptor.name()
    }

    pub fn parameter_names(&self) -> &[String] {
        self.descriptor.parameters()
    }

    /// Argument values in declaration order.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// `(parameter name, value)` pairs in declaration order.
    pub fn arguments(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.descriptor
            .parameters()
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }

    /// Value of the first parameter named `parameter`.
    pub fn argument(&self, parameter: &str) -> Option<&Value> {
        self.descriptor
            .position_of(parameter)
            .and_then(|i| self.values.get(i))
    }

    /// Like [`argument`](Self::argument) but reports a missing parameter as
    /// a [`ContextError::MissingParameter`].
    pub fn require_argument(&self, parameter: &str) -> Result<&Value, ContextError> {
        self.argument(parameter)
            .ok_or_else(|| ContextError::MissingParameter {
                operation: self.operation_name().to_string(),
                parameter: parameter.to_string(),
            })
    }

    /// String value of a parameter, if present and a JSON string.
    pub fn str_argument(&self, parameter: &str) -> Option<&str> {
        self.argument(parameter).and_then(Value::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn descriptor() -> Arc<OperationDescriptor> {
        Arc::new(
            OperationDescriptor::new("find_polkaman", "controller.polkaman")
                .with_parameters(["auth", "name"])
                .with_tag("manager"),
        )
    }

    #[test]
    fn descriptor_accessors() {
        let d = descriptor();
        assert_eq!(d.name(), "find_polkaman");
        assert_eq!(d.namespace(), "controller.polkaman");
        assert_eq!(d.parameters(), ["auth", "name"]);
        assert!(d.has_tag("manager"));
        assert!(!d.has_tag("admin"));
        assert_eq!(d.tags().collect::<Vec<_>>(), vec!["manager"]);
    }

    #[test]
    fn position_of_first_match_wins() {
        let d = OperationDescriptor::new("dup", "controller").with_parameters(["x", "auth", "auth"]);
        assert_eq!(d.position_of("auth"), Some(1));
        assert_eq!(d.position_of("missing"), None);
    }

    #[test]
    fn context_binds_arguments_by_name() {
        let ctx = CallContext::new(descriptor(), vec![json!("authenticated"), json!("pikapol")])
            .expect("arity matches");
        assert_eq!(ctx.operation_name(), "find_polkaman");
        assert_eq!(ctx.argument("auth"), Some(&json!("authenticated")));
        assert_eq!(ctx.str_argument("name"), Some("pikapol"));
        assert_eq!(ctx.argument("missing"), None);

        let pairs: Vec<_> = ctx.arguments().collect();
        assert_eq!(pairs[0].0, "auth");
        assert_eq!(pairs[1], ("name", &json!("pikapol")));
        assert_eq!(ctx.values(), [json!("authenticated"), json!("pikapol")]);
        assert_eq!(ctx.parameter_names(), ["auth", "name"]);
    }

    #[test]
    fn context_rejects_too_few_values() {
        let err = CallContext::new(descriptor(), vec![json!("authenticated")]).unwrap_err();
        assert_eq!(
            err,
            ContextError::ArityMismatch {
                operation: "find_polkaman".to_string(),
                expected: 2,
                actual: 1,
            }
        );
    }

    #[test]
    fn context_rejects_empty_values_for_parameterised_operation() {
        assert!(CallContext::new(descriptor(), vec![]).is_err());
    }

    #[test]
    fn require_argument_reports_missing_parameter() {
        let d = Arc::new(OperationDescriptor::new("health", "controller.health"));
        let ctx = CallContext::new(d, vec![]).unwrap();
        let err = ctx.require_argument("auth").unwrap_err();
        assert!(matches!(err, ContextError::MissingParameter { ref parameter, .. } if parameter == "auth"));
    }

    #[test]
    fn call_ids_are_unique_per_invocation() {
        let a = CallContext::new(descriptor(), vec![json!(null), json!(null)]).unwrap();
        let b = CallContext::new(descriptor(), vec![json!(null), json!(null)]).unwrap();
        assert_ne!(a.call_id(), b.call_id());
    }

    #[test]
    fn str_argument_ignores_non_strings() {
        let ctx = CallContext::new(descriptor(), vec![json!(42), json!(null)]).unwrap();
        assert_eq!(ctx.str_argument("auth"), None);
        assert_eq!(ctx.argument("auth"), Some(&json!(42)));
    }
}
