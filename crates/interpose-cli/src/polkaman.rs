//! # Polkaman Controller
//!
//! Demo controller layer the pipeline wraps. Operations live in the
//! `controller.*` namespace so the call logger applies to all of them; the
//! catalog reads are tagged `manager` so the auth gate guards them.
//!
//! | Operation        | Namespace              | Tags      | Parameters     |
//! |------------------|------------------------|-----------|----------------|
//! | `list_polkamans` | `controller.polkaman`  | `manager` | `auth`         |
//! | `find_polkaman`  | `controller.polkaman`  | `manager` | `auth`, `name` |
//! | `health`         | `controller.health`    |           |                |

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use interpose_core::{CallContext, CallFault, InterceptedOperation, OperationDescriptor, Pipeline};

/// A catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Polkaman {
    pub name: String,
    pub kind: String,
    pub level: u32,
}

impl Polkaman {
    fn new(name: &str, kind: &str, level: u32) -> Self {
        Self {
            name: name.to_string(),
            kind: kind.to_string(),
            level,
        }
    }
}

/// Read-only polkaman catalog.
#[derive(Debug, Clone)]
pub struct Catalog {
    entries: Vec<Polkaman>,
}

impl Catalog {
    pub fn new(entries: Vec<Polkaman>) -> Self {
        Self { entries }
    }

    /// The built-in demo catalog.
    pub fn seeded() -> Self {
        Self::new(vec![
            Polkaman::new("pikapol", "electric", 12),
            Polkaman::new("charmandolph", "fire", 9),
            Polkaman::new("squirtlebert", "water", 7),
            Polkaman::new("bulbasort", "grass", 11),
        ])
    }

    pub fn all(&self) -> &[Polkaman] {
        &self.entries
    }

    /// Case-insensitive lookup by name.
    pub fn find(&self, name: &str) -> Option<&Polkaman> {
        self.entries
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }
}

fn to_value<T: Serialize>(value: &T) -> Result<Value, CallFault> {
    serde_json::to_value(value).map_err(|e| CallFault::new("SerializationFault", e.to_string()))
}

fn list_polkamans(catalog: &Catalog) -> Result<Value, CallFault> {
    to_value(&catalog.all())
}

fn find_polkaman(catalog: &Catalog, ctx: &CallContext) -> Result<Value, CallFault> {
    let name = ctx
        .str_argument("name")
        .ok_or_else(|| CallFault::new("BadRequest", "name must be a string"))?;
    let found = catalog
        .find(name)
        .ok_or_else(|| CallFault::new("NotFound", format!("no polkaman named '{name}'")))?;
    to_value(found)
}

/// The controller's operations, each wrapped by `pipeline`.
#[derive(Debug, Clone)]
pub struct Controller {
    operations: Vec<InterceptedOperation>,
}

impl Controller {
    /// Register the polkaman operations against `pipeline`.
    pub fn register(pipeline: &Pipeline, catalog: Catalog) -> Self {
        let catalog = Arc::new(catalog);
        let mut operations = Vec::new();

        let list_catalog = Arc::clone(&catalog);
        operations.push(pipeline.wrap(
            OperationDescriptor::new("list_polkamans", "controller.polkaman")
                .with_parameters(["auth"])
                .with_tag("manager"),
            move |_: &CallContext| -> Result<Value, CallFault> { list_polkamans(&list_catalog) },
        ));

        let find_catalog = Arc::clone(&catalog);
        operations.push(pipeline.wrap(
            OperationDescriptor::new("find_polkaman", "controller.polkaman")
                .with_parameters(["auth", "name"])
                .with_tag("manager"),
            move |ctx: &CallContext| -> Result<Value, CallFault> {
                find_polkaman(&find_catalog, ctx)
            },
        ));

        operations.push(pipeline.wrap(
            OperationDescriptor::new("health", "controller.health"),
            |_: &CallContext| -> Result<Value, CallFault> { Ok(Value::String("ok".to_string())) },
        ));

        Self { operations }
    }

    pub fn operations(&self) -> &[InterceptedOperation] {
        &self.operations
    }

    pub fn operation(&self, name: &str) -> Option<&InterceptedOperation> {
        self.operations
            .iter()
            .find(|op| op.descriptor().name() == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use interpose_core::{
        AdvicePoint, AuthGate, CallLogger, InterposeConfig, InvocationError, InvocationOutcome,
        MemorySink,
    };
    use serde_json::json;

    fn controller(sink: Arc<MemorySink>) -> Controller {
        let pipeline = Pipeline::standard(&InterposeConfig::default(), sink);
        Controller::register(&pipeline, Catalog::seeded())
    }

    #[test]
    fn catalog_find_is_case_insensitive() {
        let catalog = Catalog::seeded();
        assert_eq!(catalog.find("PikaPol").map(|p| p.level), Some(12));
        assert!(catalog.find("mewtwoo").is_none());
    }

    #[test]
    fn registers_three_operations() {
        let c = controller(Arc::new(MemorySink::new()));
        let names: Vec<&str> = c.operations().iter().map(|o| o.descriptor().name()).collect();
        assert_eq!(names, vec!["list_polkamans", "find_polkaman", "health"]);
    }

    #[test]
    fn catalog_reads_are_gated_and_logged() {
        let c = controller(Arc::new(MemorySink::new()));
        for name in ["list_polkamans", "find_polkaman"] {
            let op = c.operation(name).unwrap();
            assert_eq!(op.interceptors(), vec![AuthGate::NAME, CallLogger::NAME]);
        }
        let health = c.operation("health").unwrap();
        assert_eq!(health.interceptors(), vec![CallLogger::NAME]);
    }

    #[test]
    fn list_returns_catalog_when_authenticated() {
        let c = controller(Arc::new(MemorySink::new()));
        let outcome = c.operation("list_polkamans").unwrap().call(vec![json!("authenticated")]);
        match outcome {
            InvocationOutcome::Proceeded(Value::Array(items)) => {
                assert_eq!(items.len(), 4);
                assert_eq!(items[0]["name"], "pikapol");
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn list_is_forbidden_for_guest() {
        let c = controller(Arc::new(MemorySink::new()));
        let outcome = c.operation("list_polkamans").unwrap().call(vec![json!("guest")]);
        assert!(outcome.is_forbidden());
    }

    #[test]
    fn find_unknown_name_is_swallowed_after_logging() {
        let sink = Arc::new(MemorySink::new());
        let c = controller(sink.clone());
        let outcome = c
            .operation("find_polkaman")
            .unwrap()
            .call(vec![json!("authenticated"), json!("mewtwoo")]);
        assert!(outcome.is_suppressed());
        assert!(!outcome.is_forbidden());
        let throwing = sink
            .records()
            .into_iter()
            .find(|r| r.point == AdvicePoint::AfterThrowing)
            .unwrap();
        assert!(throwing.message.contains("NotFound"));
        assert!(throwing.message.contains("mewtwoo"));
    }

    #[test]
    fn find_with_non_string_name_fails_as_bad_request_under_propagate() {
        let mut config = InterposeConfig::default();
        config.auth.on_failure = interpose_core::FailurePolicy::Propagate;
        let pipeline = Pipeline::standard(&config, Arc::new(MemorySink::new()));
        let c = Controller::register(&pipeline, Catalog::seeded());
        let outcome = c
            .operation("find_polkaman")
            .unwrap()
            .call(vec![json!("authenticated"), json!(7)]);
        match outcome {
            InvocationOutcome::Failed(InvocationError::WrappedCall(fault)) => {
                assert_eq!(fault.kind, "BadRequest");
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn health_is_open() {
        let sink = Arc::new(MemorySink::new());
        let c = controller(sink.clone());
        let outcome = c.operation("health").unwrap().call(vec![]);
        assert_eq!(outcome, InvocationOutcome::Proceeded(json!("ok")));
        assert_eq!(sink.len(), 3);
    }

    #[test]
    fn unknown_operation_lookup_is_none() {
        let c = controller(Arc::new(MemorySink::new()));
        assert!(c.operation("delete_polkaman").is_none());
    }
}
