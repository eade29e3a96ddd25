//! Cancellable handle for a dispatched request.

use crate::outcome::Outcome;
use crate::types::{ContextId, Method, RequestId};
use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{oneshot, Notify};

struct HandleState {
    request_id: RequestId,
    context_id: ContextId,
    method: Method,
    endpoint: String,
    cancel_tx: Mutex<Option<oneshot::Sender<()>>>,
    cancelled: AtomicBool,
    outcome: Mutex<Option<Outcome>>,
    settled: Notify,
}

/// Handle to a dispatched request
///
/// Clones share state: cancelling or settling through one clone is visible
/// through all of them. Handles compare equal when they refer to the same
/// request.
#[derive(Clone)]
pub struct RequestHandle {
    state: Arc<HandleState>,
}

impl RequestHandle {
    /// Create a handle and the cancellation receiver its worker listens on.
    pub(crate) fn new_pair(
        request_id: RequestId,
        context_id: ContextId,
        method: Method,
        endpoint: String,
    ) -> (Self, oneshot::Receiver<()>) {
        let (cancel_tx, cancel_rx) = oneshot::channel();
        let handle = Self {
            state: Arc::new(HandleState {
                request_id,
                context_id,
                method,
                endpoint,
                cancel_tx: Mutex::new(Some(cancel_tx)),
                cancelled: AtomicBool::new(false),
                outcome: Mutex::new(None),
                settled: Notify::new(),
            }),
        };
        (handle, cancel_rx)
    }

    pub fn request_id(&self) -> RequestId {
        self.state.request_id
    }

    pub fn context_id(&self) -> ContextId {
        self.state.context_id
    }

    pub fn method(&self) -> Method {
        self.state.method
    }

    pub fn endpoint(&self) -> &str {
        &self.state.endpoint
    }

    /// Request cancellation.
    ///
    /// Returns `false` if the request already settled or cancellation was
    /// already requested. A cancel that races completion is decided by
    /// whichever settles the handle first.
    pub fn cancel(&self) -> bool {
        let sender = self.state.cancel_tx.lock().take();
        match sender {
            Some(cancel_tx) => {
                self.state.cancelled.store(true, Ordering::SeqCst);
                // The worker may have finished in between; settlement decides
                // the outcome either way.
                let _ = cancel_tx.send(());
                true
            }
            None => false,
        }
    }

    /// Whether cancellation was requested through this handle.
    pub fn is_cancelled(&self) -> bool {
        self.state.cancelled.load(Ordering::SeqCst)
    }

    /// Terminal outcome, if the request has settled.
    pub fn outcome(&self) -> Option<Outcome> {
        self.state.outcome.lock().clone()
    }

    pub fn is_settled(&self) -> bool {
        self.state.outcome.lock().is_some()
    }

    /// Record the terminal outcome. The first write wins.
    pub(crate) fn settle(&self, outcome: Outcome) -> bool {
        {
            let mut slot = self.state.outcome.lock();
            if slot.is_some() {
                return false;
            }
            *slot = Some(outcome);
        }
        // Cancelling a settled handle is a no-op from here on.
        self.state.cancel_tx.lock().take();
        self.state.settled.notify_waiters();
        true
    }

    /// Wait until the request settles and return its outcome.
    pub async fn settled(&self) -> Outcome {
        loop {
            let notified = self.state.settled.notified();
            tokio::pin!(notified);
            // Register interest before checking, so a settle that lands in
            // between is not missed.
            notified.as_mut().enable();
            if let Some(outcome) = self.outcome() {
                return outcome;
            }
            notified.await;
        }
    }
}

impl PartialEq for RequestHandle {
    fn eq(&self, other: &Self) -> bool {
        self.state.request_id == other.state.request_id
    }
}

impl Eq for RequestHandle {}

impl fmt::Debug for RequestHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestHandle")
            .field("request_id", &self.state.request_id)
            .field("context_id", &self.state.context_id)
            .field("method", &self.state.method)
            .field("endpoint", &self.state.endpoint)
            .field("cancelled", &self.is_cancelled())
            .field("settled", &self.is_settled())
            .finish()
    }
}
