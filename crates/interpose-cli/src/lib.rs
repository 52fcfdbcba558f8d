//! # interpose-cli — Command-Line Driver for the Interception Pipeline
//!
//! Wires the standard pipeline (auth gate + call logger) around the demo
//! polkaman controller and exposes it through the `interpose` binary.
//!
//! ## Subcommands
//!
//! - `interpose operations`: list registered operations and their chains.
//! - `interpose invoke`: run one operation and print its outcome as JSON.
//!
//! ```bash
//! interpose operations
//! interpose invoke list_polkamans --arg auth=authenticated
//! interpose invoke find_polkaman --arg auth=guest --arg name=pikapol --trace
//! ```

pub mod invoke;
pub mod operations;
pub mod polkaman;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use interpose_core::{InterposeConfig, LogSink, Pipeline};

use crate::polkaman::{Catalog, Controller};

/// Load configuration from `path` (or defaults), then apply environment
/// overrides.
pub fn load_config(path: Option<&Path>) -> Result<InterposeConfig> {
    let mut config = match path {
        Some(path) => InterposeConfig::load(path)
            .with_context(|| format!("failed to load config: {}", path.display()))?,
        None => InterposeConfig::default(),
    };
    config
        .apply_env_overrides()
        .context("invalid environment override")?;
    Ok(config)
}

/// Build the standard pipeline and register the polkaman controller on it.
pub fn build_controller(config: &InterposeConfig, sink: Arc<dyn LogSink>) -> Controller {
    let pipeline = Pipeline::standard(config, sink);
    tracing::debug!(interceptors = pipeline.len(), "pipeline assembled");
    Controller::register(&pipeline, Catalog::seeded())
}
