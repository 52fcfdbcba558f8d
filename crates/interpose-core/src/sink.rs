//! # Log Sinks
//!
//! Interceptors never log through a global logger. They receive an
//! `Arc<dyn LogSink>` at construction and hand it [`LogRecord`]s.
//!
//! - [`TracingSink`] forwards records to the process-wide `tracing`
//!   dispatcher as structured events. This is the production default.
//! - [`MemorySink`] keeps records in a bounded in-memory buffer, for tests
//!   and for the CLI's `--trace` output.
//!
//! Sink failures never reach a call's outcome: interceptors emit through
//! [`emit_contained`], which absorbs both `Err` returns and panics.

use std::collections::VecDeque;
use std::panic::{catch_unwind, AssertUnwindSafe};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::SinkError;

// ── AdvicePoint ─────────────────────────────────────────────────────────────

/// Where in an intercepted call a record was emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdvicePoint {
    /// Before the wrapped call runs.
    Before,
    /// After the wrapped call, whatever its outcome.
    After,
    /// After the wrapped call returned a value.
    AfterReturning,
    /// After the wrapped call failed.
    AfterThrowing,
    /// The auth gate rejected the call.
    Rejected,
    /// The auth gate swallowed a wrapped-call failure.
    Swallowed,
}

impl AdvicePoint {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Before => "before",
            Self::After => "after",
            Self::AfterReturning => "after_returning",
            Self::AfterThrowing => "after_throwing",
            Self::Rejected => "rejected",
            Self::Swallowed => "swallowed",
        }
    }
}

impl std::fmt::Display for AdvicePoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Severity of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    Info,
    Warn,
}

// ── LogRecord ───────────────────────────────────────────────────────────────

/// One human-readable log line emitted by an interceptor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogRecord {
    pub call_id: Uuid,
    pub operation: String,
    pub point: AdvicePoint,
    pub level: LogLevel,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl LogRecord {
    /// Create an info-level record stamped with the current UTC time.
    pub fn info(
        call_id: Uuid,
        operation: impl Into<String>,
        point: AdvicePoint,
        message: impl Into<String>,
    ) -> Self {
        Self {
            call_id,
            operation: operation.into(),
            point,
            level: LogLevel::Info,
            message: message.into(),
            timestamp: Utc::now(),
        }
    }

    /// Create a warn-level record stamped with the current UTC time.
    pub fn warn(
        call_id: Uuid,
        operation: impl Into<String>,
        point: AdvicePoint,
        message: impl Into<String>,
    ) -> Self {
        Self {
            level: LogLevel::Warn,
            ..Self::info(call_id, operation, point, message)
        }
    }
}

// Timestamps are excluded: two records describing the same emission compare equal.
impl PartialEq for LogRecord {
    fn eq(&self, other: &Self) -> bool {
        self.call_id == other.call_id
            && self.operation == other.operation
            && self.point == other.point
            && self.level == other.level
            && self.message == other.message
    }
}

impl Eq for LogRecord {}

// ── LogSink ─────────────────────────────────────────────────────────────────

/// Destination for interceptor log records.
///
/// Implementations must tolerate concurrent callers.
pub trait LogSink: Send + Sync {
    fn emit(&self, record: &LogRecord) -> Result<(), SinkError>;
}

/// Emit a record, absorbing sink errors and panics.
///
/// Returns the absorbed error so callers can count failures if they wish;
/// interceptors ignore it.
pub fn emit_contained(sink: &dyn LogSink, record: &LogRecord) -> Option<SinkError> {
    let result = catch_unwind(AssertUnwindSafe(|| sink.emit(record)));
    let err = match result {
        Ok(Ok(())) => return None,
        Ok(Err(err)) => err,
        Err(_) => SinkError::Panicked,
    };
    tracing::debug!(
        operation = %record.operation,
        point = %record.point,
        error = %err,
        "log sink failure absorbed"
    );
    Some(err)
}

/// Forwards records to `tracing` with structured fields.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn emit(&self, record: &LogRecord) -> Result<(), SinkError> {
        match record.level {
            LogLevel::Info => tracing::info!(
                call_id = %record.call_id,
                operation = %record.operation,
                point = %record.point,
                "{}",
                record.message
            ),
            LogLevel::Warn => tracing::warn!(
                call_id = %record.call_id,
                operation = %record.operation,
                point = %record.point,
                "{}",
                record.message
            ),
        }
        Ok(())
    }
}

/// Bounded in-memory sink.
///
/// When full, the oldest record is dropped to make room.
#[derive(Debug)]
pub struct MemorySink {
    capacity: usize,
    records: Mutex<VecDeque<LogRecord>>,
}

impl MemorySink {
    /// Default number of retained records.
    pub const DEFAULT_CAPACITY: usize = 1024;

    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    /// A capacity of zero is treated as one.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            records: Mutex::new(VecDeque::new()),
        }
    }

    /// Snapshot of the retained records, oldest first.
    pub fn records(&self) -> Vec<LogRecord> {
        self.records.lock().iter().cloned().collect()
    }

    /// Retained records for one call, oldest first.
    pub fn records_for(&self, call_id: Uuid) -> Vec<LogRecord> {
        self.records
            .lock()
            .iter()
            .filter(|r| r.call_id == call_id)
            .cloned()
            .collect()
    }

    /// Advice points of the retained records, oldest first.
    pub fn points(&self) -> Vec<AdvicePoint> {
        self.records.lock().iter().map(|r| r.point).collect()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    /// Remove and return all retained records.
    pub fn drain(&self) -> Vec<LogRecord> {
        self.records.lock().drain(..).collect()
    }
}

impl Default for MemorySink {
    fn default() -> Self {
        Self::new()
    }
}

impl LogSink for MemorySink {
    fn emit(&self, record: &LogRecord) -> Result<(), SinkError> {
        let mut records = self.records.lock();
        if records.len() >= self.capacity {
            records.pop_front();
        }
        records.push_back(record.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingSink;

    impl LogSink for FailingSink {
        fn emit(&self, _record: &LogRecord) -> Result<(), SinkError> {
            Err(SinkError::Rejected("disk full".to_string()))
        }
    }

    struct PanickingSink;

    impl LogSink for PanickingSink {
        fn emit(&self, _record: &LogRecord) -> Result<(), SinkError> {
            panic!("sink exploded");
        }
    }

    fn record(point: AdvicePoint) -> LogRecord {
        LogRecord::info(Uuid::nil(), "list_polkamans", point, "message")
    }

    #[test]
    fn advice_point_as_str() {
        assert_eq!(AdvicePoint::Before.as_str(), "before");
        assert_eq!(AdvicePoint::After.as_str(), "after");
        assert_eq!(AdvicePoint::AfterReturning.as_str(), "after_returning");
        assert_eq!(AdvicePoint::AfterThrowing.as_str(), "after_throwing");
        assert_eq!(AdvicePoint::Rejected.to_string(), "rejected");
        assert_eq!(AdvicePoint::Swallowed.to_string(), "swallowed");
    }

    #[test]
    fn warn_record_keeps_fields() {
        let r = LogRecord::warn(Uuid::nil(), "op", AdvicePoint::Rejected, "denied");
        assert_eq!(r.level, LogLevel::Warn);
        assert_eq!(r.operation, "op");
        assert_eq!(r.message, "denied");
    }

    #[test]
    fn record_equality_ignores_timestamp() {
        let a = record(AdvicePoint::Before);
        let mut b = a.clone();
        b.timestamp = a.timestamp + chrono::Duration::seconds(5);
        assert_eq!(a, b);
    }

    #[test]
    fn memory_sink_retains_in_order() {
        let sink = MemorySink::new();
        sink.emit(&record(AdvicePoint::Before)).unwrap();
        sink.emit(&record(AdvicePoint::After)).unwrap();
        assert_eq!(sink.len(), 2);
        assert_eq!(sink.points(), vec![AdvicePoint::Before, AdvicePoint::After]);
    }

    #[test]
    fn memory_sink_drops_oldest_when_full() {
        let sink = MemorySink::with_capacity(2);
        sink.emit(&record(AdvicePoint::Before)).unwrap();
        sink.emit(&record(AdvicePoint::After)).unwrap();
        sink.emit(&record(AdvicePoint::AfterReturning)).unwrap();
        assert_eq!(
            sink.points(),
            vec![AdvicePoint::After, AdvicePoint::AfterReturning]
        );
    }

    #[test]
    fn memory_sink_zero_capacity_keeps_one() {
        let sink = MemorySink::with_capacity(0);
        sink.emit(&record(AdvicePoint::Before)).unwrap();
        sink.emit(&record(AdvicePoint::After)).unwrap();
        assert_eq!(sink.points(), vec![AdvicePoint::After]);
    }

    #[test]
    fn memory_sink_filters_by_call() {
        let sink = MemorySink::new();
        let id = Uuid::new_v4();
        sink.emit(&LogRecord::info(id, "a", AdvicePoint::Before, "x")).unwrap();
        sink.emit(&record(AdvicePoint::Before)).unwrap();
        assert_eq!(sink.records_for(id).len(), 1);
    }

    #[test]
    fn memory_sink_drain_empties() {
        let sink = MemorySink::new();
        sink.emit(&record(AdvicePoint::Before)).unwrap();
        assert_eq!(sink.drain().len(), 1);
        assert!(sink.is_empty());
    }

    #[test]
    fn tracing_sink_accepts_records_without_subscriber() {
        assert!(TracingSink.emit(&record(AdvicePoint::Before)).is_ok());
        let warn = LogRecord::warn(Uuid::nil(), "op", AdvicePoint::Rejected, "denied");
        assert!(TracingSink.emit(&warn).is_ok());
    }

    #[test]
    fn emit_contained_absorbs_errors() {
        let err = emit_contained(&FailingSink, &record(AdvicePoint::Before));
        assert_eq!(err, Some(SinkError::Rejected("disk full".to_string())));
    }

    #[test]
    fn emit_contained_absorbs_panics() {
        let err = emit_contained(&PanickingSink, &record(AdvicePoint::Before));
        assert_eq!(err, Some(SinkError::Panicked));
    }

    #[test]
    fn emit_contained_passes_success_through() {
        let sink = MemorySink::new();
        assert_eq!(emit_contained(&sink, &record(AdvicePoint::Before)), None);
        assert_eq!(sink.len(), 1);
    }
}
