//! # Operations Subcommand
//!
//! Lists every registered controller operation with its parameters and the
//! interceptor chain the pipeline resolved for it, outermost first.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use serde::Serialize;

use interpose_core::{InterposeConfig, TracingSink};

use crate::polkaman::Controller;

/// Listing format.
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ListingFormat {
    #[default]
    Text,
    Json,
}

/// Arguments for the `interpose operations` subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct OperationsArgs {
    /// Output format.
    #[arg(long, value_enum, default_value_t = ListingFormat::Text)]
    pub format: ListingFormat,
}

/// One row of the listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperationSummary {
    pub name: String,
    pub namespace: String,
    pub parameters: Vec<String>,
    pub tags: Vec<String>,
    pub interceptors: Vec<String>,
}

impl OperationSummary {
    fn render(&self) -> String {
        let chain = if self.interceptors.is_empty() {
            "(none)".to_string()
        } else {
            self.interceptors.join(" -> ")
        };
        format!(
            "{}({})  [{}]  {}",
            self.name,
            self.parameters.join(", "),
            self.namespace,
            chain
        )
    }
}

pub fn summarize(controller: &Controller) -> Vec<OperationSummary> {
    controller
        .operations()
        .iter()
        .map(|op| {
            let d = op.descriptor();
            OperationSummary {
                name: d.name().to_string(),
                namespace: d.namespace().to_string(),
                parameters: d.parameters().to_vec(),
                tags: d.tags().map(str::to_string).collect(),
                interceptors: op.interceptors().into_iter().map(str::to_string).collect(),
            }
        })
        .collect()
}

/// Execute the operations subcommand.
pub fn run_operations(args: &OperationsArgs, config: &InterposeConfig) -> Result<u8> {
    let controller = crate::build_controller(config, Arc::new(TracingSink));
    let summaries = summarize(&controller);
    if args.format == ListingFormat::Json {
        let rendered =
            serde_json::to_string_pretty(&summaries).context("failed to render operations")?;
        println!("{rendered}");
    } else {
        for summary in &summaries {
            println!("{}", summary.render());
        }
    }
    Ok(0)
}
