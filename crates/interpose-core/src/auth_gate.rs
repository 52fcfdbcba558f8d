//! # Authentication Gate
//!
//! Interceptor that lets a call through only when a designated argument holds
//! a literal sentinel string. This is a marker comparison, not credential
//! validation.
//!
//! ## Decision table
//!
//! | Argument                       | Outcome                                  |
//! |--------------------------------|------------------------------------------|
//! | parameter not declared         | `Failed(MalformedContext)`               |
//! | JSON string equal to sentinel  | wrapped call runs, result passed through |
//! | anything else (incl. `null`)   | `Suppressed(Forbidden)`, call skipped    |
//!
//! A wrapped-call failure on the authenticated path is handled by the
//! configured [`FailurePolicy`].

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::chain::{Interceptor, Next};
use crate::config::AuthSettings;
use crate::context::CallContext;
use crate::error::InvocationError;
use crate::outcome::{InvocationOutcome, Replacement};
use crate::sink::{emit_contained, AdvicePoint, LogRecord, LogSink};

/// What the gate does when an authenticated call fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Log the failure and return `Suppressed(Null)`.
    #[default]
    Swallow,
    /// Return the `Failed` outcome unchanged.
    Propagate,
}

/// Sentinel-comparison gate.
pub struct AuthGate {
    parameter: String,
    sentinel: String,
    policy: FailurePolicy,
    sink: Arc<dyn LogSink>,
}

impl AuthGate {
    /// Name reported in interceptor listings.
    pub const NAME: &'static str = "auth_gate";

    /// Gate on parameter `auth` with sentinel `"authenticated"`, swallowing
    /// wrapped-call failures.
    pub fn new(sink: Arc<dyn LogSink>) -> Self {
        Self::from_settings(&AuthSettings::default(), sink)
    }

    pub fn from_settings(settings: &AuthSettings, sink: Arc<dyn LogSink>) -> Self {
        Self {
            parameter: settings.parameter.clone(),
            sentinel: settings.sentinel.clone(),
            policy: settings.on_failure,
            sink,
        }
    }

    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn parameter(&self) -> &str {
        &self.parameter
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    fn is_authenticated(&self, value: &Value) -> bool {
        value.as_str() == Some(self.sentinel.as_str())
    }
}

impl std::fmt::Debug for AuthGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthGate")
            .field("parameter", &self.parameter)
            .field("sentinel", &"[REDACTED]")
            .field("policy", &self.policy)
            .finish()
    }
}

impl Interceptor for AuthGate {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn intercept(&self, ctx: &CallContext, next: Next<'_>) -> InvocationOutcome {
        let value = match ctx.require_argument(&self.parameter) {
            Ok(value) => value,
            Err(err) => {
                tracing::error!(
                    operation = %ctx.operation_name(),
                    parameter = %self.parameter,
                    "auth gate applied to operation without auth parameter"
                );
                return InvocationOutcome::Failed(InvocationError::MalformedContext(err));
            }
        };

        if !self.is_authenticated(value) {
            emit_contained(
                self.sink.as_ref(),
                &LogRecord::warn(
                    ctx.call_id(),
                    ctx.operation_name(),
                    AdvicePoint::Rejected,
                    format!("call to {} rejected: not authenticated", ctx.operation_name()),
                ),
            );
            return InvocationOutcome::Suppressed(Replacement::forbidden());
        }

        match (next.proceed(ctx), self.policy) {
            (InvocationOutcome::Failed(err), FailurePolicy::Swallow) => {
                emit_contained(
                    self.sink.as_ref(),
                    &LogRecord::warn(
                        ctx.call_id(),
                        ctx.operation_name(),
                        AdvicePoint::Swallowed,
                        format!("call to {} failed and was swallowed: {err}", ctx.operation_name()),
                    ),
                );
                InvocationOutcome::Suppressed(Replacement::Null)
            }
            (outcome, _) => outcome,
        }
    }
}
