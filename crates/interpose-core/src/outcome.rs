//! # Invocation Outcome
//!
//! The single result of an intercepted call. Every call through the pipeline
//! yields exactly one [`InvocationOutcome`]: the wrapped operation either ran
//! (`Proceeded`), was skipped or had its failure swallowed (`Suppressed`), or
//! failed (`Failed`).

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::InvocationError;

// ── ForbiddenResult ─────────────────────────────────────────────────────────

/// HTTP-style response envelope: status code plus raw body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub status: u16,
    pub body: String,
}

/// Fixed "access denied" marker returned by the auth gate on rejection.
///
/// Always status 403 with an empty body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ForbiddenResult;

impl ForbiddenResult {
    /// HTTP 403 Forbidden.
    pub const STATUS: u16 = 403;

    pub fn status(&self) -> u16 {
        Self::STATUS
    }

    pub fn body(&self) -> &'static str {
        ""
    }

    pub fn envelope(&self) -> ResponseEnvelope {
        ResponseEnvelope {
            status: Self::STATUS,
            body: String::new(),
        }
    }
}

impl Serialize for ForbiddenResult {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.envelope().serialize(serializer)
    }
}

// ── Replacement ─────────────────────────────────────────────────────────────

/// Value produced in place of a wrapped call's result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Replacement {
    /// The call was rejected before it ran.
    Forbidden {
        #[serde(flatten)]
        response: ForbiddenResult,
    },
    /// The call ran, failed, and its failure was swallowed.
    Null,
}

impl Replacement {
    pub fn forbidden() -> Self {
        Self::Forbidden {
            response: ForbiddenResult,
        }
    }

    /// JSON rendering of the replacement value.
    pub fn to_value(&self) -> Value {
        match self {
            Self::Forbidden { response } => serde_json::json!(response.envelope()),
            Self::Null => Value::Null,
        }
    }
}

// ── InvocationOutcome ───────────────────────────────────────────────────────

/// Result of one intercepted call.
#[derive(Debug, Clone, PartialEq)]
pub enum InvocationOutcome {
    /// The wrapped operation ran and returned this value.
    Proceeded(Value),
    /// The wrapped operation's result was replaced.
    Suppressed(Replacement),
    /// The wrapped operation failed, or the call could not be evaluated.
    Failed(InvocationError),
}

impl InvocationOutcome {
    /// Short name of the variant, for logs and CLI output.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Proceeded(_) => "proceeded",
            Self::Suppressed(_) => "suppressed",
            Self::Failed(_) => "failed",
        }
    }

    pub fn is_proceeded(&self) -> bool {
        matches!(self, Self::Proceeded(_))
    }

    pub fn is_suppressed(&self) -> bool {
        matches!(self, Self::Suppressed(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    pub fn is_forbidden(&self) -> bool {
        matches!(self, Self::Suppressed(Replacement::Forbidden { .. }))
    }

    /// The value a caller of the wrapped operation would observe, or `None`
    /// for a failed call.
    pub fn reply_value(&self) -> Option<Value> {
        match self {
            Self::Proceeded(value) => Some(value.clone()),
            Self::Suppressed(replacement) => Some(replacement.to_value()),
            Self::Failed(_) => None,
        }
    }

    /// Collapse into a `Result`, keeping suppression on the success side.
    pub fn into_result(self) -> Result<Reply, InvocationError> {
        match self {
            Self::Proceeded(value) => Ok(Reply::Value(value)),
            Self::Suppressed(replacement) => Ok(Reply::Replaced(replacement)),
            Self::Failed(err) => Err(err),
        }
    }

    /// JSON report of this outcome.
    pub fn to_report(&self) -> Value {
        match self {
            Self::Proceeded(value) => serde_json::json!({
                "outcome": self.kind(),
                "value": value,
            }),
            Self::Suppressed(replacement) => serde_json::json!({
                "outcome": self.kind(),
                "replacement": replacement,
            }),
            Self::Failed(err) => serde_json::json!({
                "outcome": self.kind(),
                "error": {
                    "code": err.code(),
                    "message": err.to_string(),
                },
            }),
        }
    }
}

/// Success side of [`InvocationOutcome::into_result`].
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Value(Value),
    Replaced(Replacement),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CallFault;
    use serde_json::json;

    #[test]
    fn forbidden_result_is_403_with_empty_body() {
        let forbidden = ForbiddenResult;
        assert_eq!(forbidden.status(), 403);
        assert_eq!(forbidden.body(), "");
        assert_eq!(
            forbidden.envelope(),
            ResponseEnvelope {
                status: 403,
                body: String::new()
            }
        );
    }

    #[test]
    fn forbidden_result_serializes_as_envelope() {
        let json = serde_json::to_value(ForbiddenResult).unwrap();
        assert_eq!(json, json!({"status": 403, "body": ""}));
    }

    #[test]
    fn forbidden_reply_value_matches_envelope_serialization() {
        let replacement = Replacement::forbidden();
        let envelope = serde_json::to_value(ForbiddenResult.envelope()).unwrap();
        assert_eq!(replacement.to_value(), envelope);
        assert_eq!(
            InvocationOutcome::Suppressed(replacement).reply_value(),
            Some(json!({"status": 403, "body": ""}))
        );
        assert_eq!(Replacement::Null.to_value(), Value::Null);
    }

    #[test]
    fn replacement_serializes_with_kind() {
        let forbidden = serde_json::to_value(Replacement::forbidden()).unwrap();
        assert_eq!(forbidden["kind"], "forbidden");
        assert_eq!(forbidden["status"], 403);

        let null = serde_json::to_value(Replacement::Null).unwrap();
        assert_eq!(null, json!({"kind": "null"}));
    }

    #[test]
    fn outcome_predicates_are_exclusive() {
        let outcomes = [
            InvocationOutcome::Proceeded(json!("ok")),
            InvocationOutcome::Suppressed(Replacement::forbidden()),
            InvocationOutcome::Failed(CallFault::runtime("x").into()),
        ];
        for outcome in &outcomes {
            let flags = [
                outcome.is_proceeded(),
                outcome.is_suppressed(),
                outcome.is_failed(),
            ];
            assert_eq!(flags.iter().filter(|f| **f).count(), 1, "{outcome:?}");
        }
    }

    #[test]
    fn reply_value_per_variant() {
        assert_eq!(
            InvocationOutcome::Proceeded(json!([1, 2])).reply_value(),
            Some(json!([1, 2]))
        );
        assert_eq!(
            InvocationOutcome::Suppressed(Replacement::Null).reply_value(),
            Some(Value::Null)
        );
        assert_eq!(
            InvocationOutcome::Suppressed(Replacement::forbidden()).reply_value(),
            Some(json!({"status": 403, "body": ""}))
        );
        assert_eq!(
            InvocationOutcome::Failed(CallFault::runtime("x").into()).reply_value(),
            None
        );
    }

    #[test]
    fn into_result_keeps_suppression_on_success_side() {
        let reply = InvocationOutcome::Suppressed(Replacement::forbidden())
            .into_result()
            .unwrap();
        assert_eq!(reply, Reply::Replaced(Replacement::forbidden()));

        let err = InvocationOutcome::Failed(CallFault::runtime("x").into())
            .into_result()
            .unwrap_err();
        assert_eq!(err, InvocationError::WrappedCall(CallFault::runtime("x")));
    }

    #[test]
    fn is_forbidden_only_for_forbidden_replacement() {
        assert!(InvocationOutcome::Suppressed(Replacement::forbidden()).is_forbidden());
        assert!(!InvocationOutcome::Suppressed(Replacement::Null).is_forbidden());
        assert!(!InvocationOutcome::Proceeded(json!(null)).is_forbidden());
    }

    #[test]
    fn report_for_failure_carries_code() {
        let report = InvocationOutcome::Failed(CallFault::runtime("x").into()).to_report();
        assert_eq!(report["outcome"], "failed");
        assert_eq!(report["error"]["code"], "WRAPPED_CALL_FAILURE");
        assert!(report["error"]["message"].as_str().unwrap().contains("x"));
    }
}
