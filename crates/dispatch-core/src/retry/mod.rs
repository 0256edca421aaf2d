//! Classifies executor-surfaced failures into retryable or fatal. A small
//! table maps a stable error-kind token to "retryable in principle"; the
//! Dispatcher never branches on a concrete error type, only on the token
//! the `Executor` itself produced. Whether a specific Task actually retries
//! is a second, separate gate: the kind must also appear in that Task's own
//! `retry_table`, or the failure is fatal regardless of what the policy
//! recognizes.

/// The classification of one `Outcome::Failure`'s `kind` token.
#[derive(Debug, Clone)]
pub enum Classification {
    Retryable { kind: String },
    NonRetryable,
}

/// Classifies error-kind tokens as retryable in principle or fatal. Does
/// not consult a Task's `retry_table` -- that gate is applied separately by
/// the Dispatcher, since a kind the policy recognizes can still be fatal
/// for a Task that never opted into retrying it.
pub trait RetryPolicy: Send + Sync {
    fn classify(&self, error_kind: &str) -> Classification;
}

/// Recognizes `"rate_limited"`, `"resource_exhausted"`, and `"transient"` as
/// retryable in principle; everything else, including the empty string, is
/// non-retryable.
#[derive(Debug, Default)]
pub struct DefaultRetryPolicy;

impl DefaultRetryPolicy {
    const RETRYABLE_KINDS: &'static [&'static str] =
        &["rate_limited", "resource_exhausted", "transient"];
}

impl RetryPolicy for DefaultRetryPolicy {
    fn classify(&self, error_kind: &str) -> Classification {
        if Self::RETRYABLE_KINDS.contains(&error_kind) {
            Classification::Retryable {
                kind: error_kind.to_string(),
            }
        } else {
            Classification::NonRetryable
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_known_kinds_as_retryable() {
        let policy = DefaultRetryPolicy;
        for kind in ["rate_limited", "resource_exhausted", "transient"] {
            match policy.classify(kind) {
                Classification::Retryable { kind: k } => assert_eq!(k, kind),
                Classification::NonRetryable => panic!("{kind} should be retryable"),
            }
        }
    }

    #[test]
    fn unknown_and_empty_kinds_are_fatal() {
        let policy = DefaultRetryPolicy;
        assert!(matches!(policy.classify(""), Classification::NonRetryable));
        assert!(matches!(
            policy.classify("permission_denied"),
            Classification::NonRetryable
        ));
    }
}
