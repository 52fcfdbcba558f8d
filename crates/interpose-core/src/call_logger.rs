//! # Controller Call Logger
//!
//! Interceptor that records four advice points around every call it wraps:
//!
//! ```text
//! before ─→ [wrapped call] ─→ after ─→ after_returning | after_throwing
//! ```
//!
//! `after` is emitted from a drop guard, so it fires even when the wrapped
//! operation panics. Exactly one of `after_returning` / `after_throwing`
//! follows a call that returns. The logger never alters the outcome: a
//! failure is logged and handed back to the caller unchanged.

use std::sync::Arc;

use crate::chain::{Interceptor, Next};
use crate::context::CallContext;
use crate::outcome::InvocationOutcome;
use crate::sink::{emit_contained, AdvicePoint, LogRecord, LogSink};

/// Message emitted before every wrapped call.
pub const BEFORE_MESSAGE: &str = "controller call starting";

/// Message emitted after every wrapped call.
pub const AFTER_MESSAGE: &str = "controller call finished";

/// Four-point call logger.
pub struct CallLogger {
    sink: Arc<dyn LogSink>,
}

impl CallLogger {
    pub const NAME: &'static str = "call_logger";

    pub fn new(sink: Arc<dyn LogSink>) -> Self {
        Self { sink }
    }

    fn emit(&self, record: LogRecord) {
        emit_contained(self.sink.as_ref(), &record);
    }
}

impl std::fmt::Debug for CallLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallLogger").finish_non_exhaustive()
    }
}

/// Emits the `after` record when dropped.
struct AfterGuard<'a> {
    logger: &'a CallLogger,
    ctx: &'a CallContext,
}

impl Drop for AfterGuard<'_> {
    fn drop(&mut self) {
        self.logger.emit(LogRecord::info(
            self.ctx.call_id(),
            self.ctx.operation_name(),
            AdvicePoint::After,
            AFTER_MESSAGE,
        ));
    }
}

impl Interceptor for CallLogger {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn intercept(&self, ctx: &CallContext, next: Next<'_>) -> InvocationOutcome {
        let operation = ctx.operation_name();
        self.emit(LogRecord::info(
            ctx.call_id(),
            operation,
            AdvicePoint::Before,
            BEFORE_MESSAGE,
        ));

        let outcome = {
            let _after = AfterGuard { logger: self, ctx };
            next.proceed(ctx)
        };

        let record = match &outcome {
            InvocationOutcome::Failed(err) => LogRecord::info(
                ctx.call_id(),
                operation,
                AdvicePoint::AfterThrowing,
                format!("{operation} failed with {err}"),
            ),
            other => {
                let value = other.reply_value().unwrap_or_default();
                LogRecord::info(
                    ctx.call_id(),
                    operation,
                    AdvicePoint::AfterReturning,
                    format!("{operation} returned {value}"),
                )
            }
        };
        self.emit(record);

        outcome
    }
}
