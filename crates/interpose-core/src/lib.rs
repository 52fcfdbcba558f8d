//! # interpose-core — Call-Interception Pipeline
//!
//! Cross-cutting behaviour layered around operations by explicit
//! registration instead of annotation scanning.
//!
//! ## Pieces
//!
//! | Module          | Role                                                    |
//! |-----------------|---------------------------------------------------------|
//! | [`context`]     | `OperationDescriptor` and per-call `CallContext`        |
//! | [`outcome`]     | `InvocationOutcome`: proceeded, suppressed or failed    |
//! | [`chain`]       | `Operation`, `Interceptor`, and the `Next` handle       |
//! | [`selector`]    | rules choosing which operations an interceptor wraps    |
//! | [`pipeline`]    | bindings, ordering, `InterceptedOperation`              |
//! | [`auth_gate`]   | sentinel-comparison gate returning 403 on rejection     |
//! | [`call_logger`] | four-point controller call logging                      |
//! | [`sink`]        | injected log sinks (`tracing`, in-memory)               |
//! | [`config`]      | YAML configuration with env overrides                   |
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use interpose_core::{
//!     CallContext, CallFault, InterposeConfig, MemorySink, OperationDescriptor, Pipeline,
//! };
//! use serde_json::{json, Value};
//!
//! let sink = Arc::new(MemorySink::new());
//! let pipeline = Pipeline::standard(&InterposeConfig::default(), sink.clone());
//! let list = pipeline.wrap(
//!     OperationDescriptor::new("list_polkamans", "controller.polkaman")
//!         .with_parameters(["auth"])
//!         .with_tag("manager"),
//!     |_: &CallContext| -> Result<Value, CallFault> { Ok(json!(["pikapol"])) },
//! );
//!
//! assert!(list.call(vec![json!("authenticated")]).is_proceeded());
//! assert!(list.call(vec![json!("guest")]).is_forbidden());
//! ```

pub mod auth_gate;
pub mod call_logger;
pub mod chain;
pub mod config;
pub mod context;
pub mod error;
pub mod outcome;
pub mod pipeline;
pub mod selector;
pub mod sink;

pub use auth_gate::{AuthGate, FailurePolicy};
pub use call_logger::CallLogger;
pub use chain::{Interceptor, Next, Operation};
pub use config::{AuthSettings, InterposeConfig, LoggingSettings};
pub use context::{CallContext, OperationDescriptor};
pub use error::{CallFault, ConfigError, ContextError, InvocationError, SinkError};
pub use outcome::{ForbiddenResult, InvocationOutcome, Replacement, Reply, ResponseEnvelope};
pub use pipeline::{InterceptedOperation, Pipeline, PipelineBuilder};
pub use selector::Selector;
pub use sink::{AdvicePoint, LogLevel, LogRecord, LogSink, MemorySink, TracingSink};
