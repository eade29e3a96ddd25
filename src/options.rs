//! Per-dispatch options and their resolution against context and tracker defaults.

use crate::transport::{TransportFailure, TransportResponse};
use crate::types::{ContextId, Method};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Callback invoked with a failure that was not classified as an abort
pub type ErrorCallback =
    Arc<dyn Fn(ContextId, &TransportFailure, &ResolvedOptions) + Send + Sync>;

/// Callback invoked with the response of a completed request
pub type SuccessCallback =
    Arc<dyn Fn(ContextId, &TransportResponse, &ResolvedOptions) + Send + Sync>;

/// Options for a single dispatch
#[derive(Clone, Default)]
pub struct DispatchOptions {
    /// Cancel outstanding requests before dispatching (overrides the context default)
    pub abort_requests: Option<bool>,
    /// JSON body forwarded to the transport
    pub body: Option<Value>,
    /// Extra headers forwarded to the transport
    pub headers: HashMap<String, String>,
    /// Invoked when the request completes
    pub on_success: Option<SuccessCallback>,
    /// Invoked when the request fails for any reason other than a classified abort
    pub on_error: Option<ErrorCallback>,
}

impl DispatchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_abort_requests(mut self, abort_requests: bool) -> Self {
        self.abort_requests = Some(abort_requests);
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn on_success<F>(mut self, callback: F) -> Self
    where
        F: Fn(ContextId, &TransportResponse, &ResolvedOptions) + Send + Sync + 'static,
    {
        self.on_success = Some(Arc::new(callback));
        self
    }

    pub fn on_error<F>(mut self, callback: F) -> Self
    where
        F: Fn(ContextId, &TransportFailure, &ResolvedOptions) + Send + Sync + 'static,
    {
        self.on_error = Some(Arc::new(callback));
        self
    }
}

impl fmt::Debug for DispatchOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchOptions")
            .field("abort_requests", &self.abort_requests)
            .field("body", &self.body)
            .field("headers", &self.headers)
            .field("on_success", &self.on_success.is_some())
            .field("on_error", &self.on_error.is_some())
            .finish()
    }
}

/// Options snapshot after resolving per-call, context, and tracker defaults
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedOptions {
    pub method: Method,
    pub endpoint: String,
    pub abort_requests: bool,
}

/// Resolve the effective abort-requests flag for one dispatch.
///
/// The per-call value wins over the context default, which wins over the
/// tracker-wide default.
pub fn resolve_abort_requests(
    per_call: Option<bool>,
    context_default: Option<bool>,
    tracker_default: bool,
) -> bool {
    per_call.or(context_default).unwrap_or(tracker_default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn resolution_precedence_table() {
        // per-call beats everything
        assert!(resolve_abort_requests(Some(true), Some(false), false));
        assert!(!resolve_abort_requests(Some(false), Some(true), true));

        // context default beats the tracker default
        assert!(resolve_abort_requests(None, Some(true), false));
        assert!(!resolve_abort_requests(None, Some(false), true));

        // tracker default is the fallback
        assert!(resolve_abort_requests(None, None, true));
        assert!(!resolve_abort_requests(None, None, false));
    }

    proptest! {
        #[test]
        fn per_call_value_always_wins(
            per_call in any::<bool>(),
            context_default in any::<Option<bool>>(),
            tracker_default in any::<bool>(),
        ) {
            prop_assert_eq!(
                resolve_abort_requests(Some(per_call), context_default, tracker_default),
                per_call
            );
        }

        #[test]
        fn context_default_wins_without_per_call(
            context_default in any::<bool>(),
            tracker_default in any::<bool>(),
        ) {
            prop_assert_eq!(
                resolve_abort_requests(None, Some(context_default), tracker_default),
                context_default
            );
        }
    }

    #[test]
    fn builder_collects_everything() {
        let options = DispatchOptions::new()
            .with_abort_requests(true)
            .with_body(json!({ "title": "hello" }))
            .with_header("x-sync-token", "abc")
            .on_success(|_context, _response, _options| {})
            .on_error(|_context, _failure, _options| {});

        assert_eq!(options.abort_requests, Some(true));
        assert_eq!(options.body, Some(json!({ "title": "hello" })));
        assert_eq!(options.headers.get("x-sync-token").map(String::as_str), Some("abc"));
        assert!(options.on_success.is_some());
        assert!(options.on_error.is_some());
    }

    #[test]
    fn debug_output_hides_callback_internals() {
        let options = DispatchOptions::new().on_error(|_context, _failure, _options| {});
        let rendered = format!("{:?}", options);
        assert!(rendered.contains("on_error: true"));
        assert!(rendered.contains("on_success: false"));
    }

    #[test]
    fn default_options_leave_the_decision_open() {
        let options = DispatchOptions::default();
        assert_eq!(options.abort_requests, None);
        assert!(options.body.is_none());
        assert!(options.headers.is_empty());
    }
}
