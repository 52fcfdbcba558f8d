//! # Invoke Subcommand
//!
//! Runs one controller operation through the pipeline and prints the
//! outcome as JSON on stdout.
//!
//! Arguments are given as `--arg name=value`. A value that parses as JSON is
//! passed as that JSON value (`--arg auth=null`, `--arg level=3`); anything
//! else is passed as a string. Declared parameters without an `--arg` are
//! passed as `null`.
//!
//! Exit codes: 0 when the call proceeded or was replaced with null, 2 when
//! the auth gate answered 403, 1 when the call failed.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Args;
use serde::Serialize;
use serde_json::Value;

use interpose_core::{
    InterposeConfig, InvocationOutcome, LogRecord, LogSink, MemorySink, OperationDescriptor,
    Replacement, TracingSink,
};

/// Arguments for the `interpose invoke` subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct InvokeArgs {
    /// Operation name, as listed by `interpose operations`.
    #[arg(value_name = "OPERATION")]
    pub operation: String,

    /// Call argument. Repeat once per parameter.
    #[arg(long = "arg", value_name = "NAME=VALUE")]
    pub args: Vec<String>,

    /// Capture log records in memory and print them with the outcome.
    #[arg(long)]
    pub trace: bool,
}

/// Printed result of an invocation.
#[derive(Debug, Clone, Serialize)]
pub struct InvokeReport {
    pub operation: String,
    pub outcome: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub records: Option<Vec<LogRecord>>,
}

/// Split `name=value` and decode the value.
pub fn parse_arg(raw: &str) -> Result<(String, Value)> {
    let Some((name, value)) = raw.split_once('=') else {
        bail!("argument '{raw}' is not of the form NAME=VALUE");
    };
    let name = name.trim();
    if name.is_empty() {
        bail!("argument '{raw}' has an empty name");
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((name.to_string(), value))
}

/// Order raw `--arg` values by the descriptor's parameter list.
pub fn bind_arguments(descriptor: &OperationDescriptor, raw: &[String]) -> Result<Vec<Value>> {
    let mut given: HashMap<String, Value> = HashMap::new();
    for entry in raw {
        let (name, value) = parse_arg(entry)?;
        if descriptor.position_of(&name).is_none() {
            bail!(
                "operation '{}' has no parameter '{name}' (parameters: {})",
                descriptor.name(),
                descriptor.parameters().join(", ")
            );
        }
        if given.insert(name.clone(), value).is_some() {
            bail!("argument '{name}' given more than once");
        }
    }
    Ok(descriptor
        .parameters()
        .iter()
        .map(|p| given.remove(p).unwrap_or(Value::Null))
        .collect())
}

/// Process exit code for an outcome.
pub fn exit_code(outcome: &InvocationOutcome) -> u8 {
    match outcome {
        InvocationOutcome::Proceeded(_) => 0,
        InvocationOutcome::Suppressed(Replacement::Forbidden { .. }) => 2,
        InvocationOutcome::Suppressed(Replacement::Null) => 0,
        InvocationOutcome::Failed(_) => 1,
    }
}

/// Run the invocation and return its outcome, plus captured records when
/// tracing.
pub fn invoke(
    args: &InvokeArgs,
    config: &InterposeConfig,
) -> Result<(InvocationOutcome, Option<Vec<LogRecord>>)> {
    let memory = args.trace.then(|| Arc::new(MemorySink::new()));
    let sink: Arc<dyn LogSink> = match &memory {
        Some(memory) => memory.clone(),
        None => Arc::new(TracingSink),
    };

    let controller = crate::build_controller(config, sink);
    let Some(operation) = controller.operation(&args.operation) else {
        let known: Vec<&str> = controller
            .operations()
            .iter()
            .map(|op| op.descriptor().name())
            .collect();
        bail!(
            "unknown operation '{}' (known: {})",
            args.operation,
            known.join(", ")
        );
    };

    let values = bind_arguments(operation.descriptor(), &args.args)
        .with_context(|| format!("invalid arguments for '{}'", args.operation))?;
    tracing::info!(operation = %args.operation, arity = values.len(), "invoking operation");

    let outcome = operation.call(values);
    Ok((outcome, memory.map(|m| m.drain())))
}

/// Execute the invoke subcommand.
pub fn run_invoke(args: &InvokeArgs, config: &InterposeConfig) -> Result<u8> {
    let (outcome, records) = invoke(args, config)?;
    let report = InvokeReport {
        operation: args.operation.clone(),
        outcome: outcome.to_report(),
        records,
    };
    let rendered = serde_json::to_string_pretty(&report).context("failed to render outcome")?;
    println!("{rendered}");
    Ok(exit_code(&outcome))
}
