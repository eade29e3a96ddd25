//! Data contexts that own request registries.
//!
//! A context is whatever unit of client-side data issues requests: a single
//! record, a collection, a view. The tracker only needs a stable identity, an
//! endpoint, and an optional default for latest-wins dispatch.

use crate::types::ContextId;

/// A unit of data that dispatches requests through the tracker
pub trait Context: Send + Sync {
    /// Stable identity used to key this context's request registry
    fn context_id(&self) -> ContextId;

    /// Endpoint requests for this context are sent to
    fn endpoint(&self) -> String;

    /// Context-level default for cancelling superseded requests.
    ///
    /// `None` defers to the tracker-wide default.
    fn single_requests(&self) -> Option<bool> {
        None
    }
}

/// Plain owned context, sufficient for most callers
#[derive(Debug, Clone)]
pub struct ModelContext {
    id: ContextId,
    endpoint: String,
    single_requests: Option<bool>,
}

impl ModelContext {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            id: ContextId::next(),
            endpoint: endpoint.into(),
            single_requests: None,
        }
    }

    pub fn with_single_requests(endpoint: impl Into<String>, single_requests: bool) -> Self {
        Self {
            id: ContextId::next(),
            endpoint: endpoint.into(),
            single_requests: Some(single_requests),
        }
    }
}

impl Context for ModelContext {
    fn context_id(&self) -> ContextId {
        self.id
    }

    fn endpoint(&self) -> String {
        self.endpoint.clone()
    }

    fn single_requests(&self) -> Option<bool> {
        self.single_requests
    }
}
