//! Terminal outcome of a dispatched request.

use crate::transport::{TransportFailure, TransportResponse, TransportResult};

/// How a request ended
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The transport produced a response
    Completed(TransportResponse),
    /// The request was cancelled before the transport produced a response
    Aborted(TransportFailure),
    /// The transport failed for a reason other than cancellation
    Failed(TransportFailure),
}

impl Outcome {
    /// Classify a transport result, separating aborts from genuine failures.
    pub fn from_result(result: TransportResult) -> Self {
        match result {
            Ok(response) => Outcome::Completed(response),
            Err(failure) if failure.is_abort() => Outcome::Aborted(failure),
            Err(failure) => Outcome::Failed(failure),
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, Outcome::Completed(_))
    }

    pub fn is_aborted(&self) -> bool {
        matches!(self, Outcome::Aborted(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Outcome::Failed(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::FailureKind;
    use crate::types::RequestId;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn success_classifies_as_completed() {
        let outcome = Outcome::from_result(Ok(TransportResponse {
            status: 200,
            body: json!({ "ok": true }),
        }));
        assert!(outcome.is_completed());
        assert!(!outcome.is_aborted());
        assert!(!outcome.is_failed());
    }

    #[test]
    fn abort_marker_classifies_as_aborted() {
        let failure = TransportFailure::aborted(RequestId::next());
        let outcome = Outcome::from_result(Err(failure.clone()));
        assert_eq!(outcome, Outcome::Aborted(failure));
    }

    #[test]
    fn plain_failure_classifies_as_failed() {
        let failure = TransportFailure::http(500, "boom");
        let outcome = Outcome::from_result(Err(failure.clone()));
        assert_eq!(outcome, Outcome::Failed(failure));
    }

    fn arb_kind() -> impl Strategy<Value = FailureKind> {
        prop_oneof![
            Just(FailureKind::Aborted),
            Just(FailureKind::Timeout),
            Just(FailureKind::Connect),
            Just(FailureKind::Http),
            Just(FailureKind::Decode),
            Just(FailureKind::Other),
        ]
    }

    proptest! {
        #[test]
        fn classification_follows_only_the_failure_kind(
            kind in arb_kind(),
            status in any::<Option<u16>>(),
            message in ".*",
        ) {
            let failure = TransportFailure { kind, status, message };
            let outcome = Outcome::from_result(Err(failure.clone()));
            if kind == FailureKind::Aborted {
                prop_assert_eq!(outcome, Outcome::Aborted(failure));
            } else {
                prop_assert_eq!(outcome, Outcome::Failed(failure));
            }
        }
    }
}
