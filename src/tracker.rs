//! Request lifecycle tracker.
//!
//! The tracker owns a registry of in-flight request handles per context and
//! implements latest-wins dispatch: when a dispatch resolves with
//! abort-requests set, every outstanding request for that context is cancelled
//! before the new one goes out. Cancelled requests settle as aborted and are
//! routed to the abort notifier instead of the caller's error callback, so
//! error handlers only ever see genuine failures.

use crate::config::TrackerConfig;
use crate::context::Context;
use crate::error::TrackerError;
use crate::events::{EventEnvelope, Notifier, NullNotifier, RequestEvent};
use crate::handle::RequestHandle;
use crate::options::{
    resolve_abort_requests, DispatchOptions, ErrorCallback, ResolvedOptions, SuccessCallback,
};
use crate::outcome::Outcome;
use crate::registry::RequestRegistry;
use crate::transport::{OperationRequest, Transport, TransportFailure};
use crate::types::{ContextId, Method, RequestId};
use futures::future;
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Tracker statistics
#[derive(Debug, Clone, Default)]
pub struct TrackerStats {
    /// Total requests dispatched
    pub dispatched: usize,
    /// Requests currently in flight
    pub in_flight: usize,
    /// Requests that completed
    pub completed: usize,
    /// Requests cancelled before the transport answered
    pub aborted: usize,
    /// Requests that failed for any other reason
    pub failed: usize,
}

/// Request lifecycle tracker
pub struct RequestTracker {
    /// Transport every dispatch goes through
    transport: Arc<dyn Transport>,
    /// Sink for abort events
    notifier: Arc<dyn Notifier>,
    /// Configuration
    config: TrackerConfig,
    /// Registries of outstanding handles, keyed by context identity
    registries: Arc<Mutex<HashMap<ContextId, RequestRegistry>>>,
    /// Statistics
    stats: Arc<RwLock<TrackerStats>>,
}

impl RequestTracker {
    /// Create a tracker that drops abort events.
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self::with_notifier(transport, Arc::new(NullNotifier))
    }

    pub fn with_notifier(transport: Arc<dyn Transport>, notifier: Arc<dyn Notifier>) -> Self {
        Self::with_config(transport, notifier, TrackerConfig::default())
    }

    pub fn with_config(
        transport: Arc<dyn Transport>,
        notifier: Arc<dyn Notifier>,
        config: TrackerConfig,
    ) -> Self {
        Self {
            transport,
            notifier,
            config,
            registries: Arc::new(Mutex::new(HashMap::new())),
            stats: Arc::new(RwLock::new(TrackerStats::default())),
        }
    }

    /// Dispatch an operation for a context and return its handle.
    ///
    /// When the effective abort-requests flag resolves to true, every
    /// outstanding request for the context is cancelled first. The handle is
    /// appended to the context's registry before the transport runs, so the
    /// registry always reflects dispatch order with the newest handle last.
    ///
    /// Must be called within a Tokio runtime.
    pub fn dispatch<C>(&self, method: Method, context: &C, options: DispatchOptions) -> RequestHandle
    where
        C: Context + ?Sized,
    {
        let DispatchOptions {
            abort_requests: per_call,
            body,
            headers,
            on_success,
            on_error,
        } = options;

        let abort_requests = resolve_abort_requests(
            per_call,
            context.single_requests(),
            self.config.default_abort_requests,
        );

        let context_id = context.context_id();
        if abort_requests {
            self.abort_outstanding(context_id);
        }

        let request_id = RequestId::next();
        let endpoint = context.endpoint();

        let (handle, cancel_rx) =
            RequestHandle::new_pair(request_id, context_id, method, endpoint.clone());

        // Register before spawning so a settle can never race an entry that
        // does not exist yet.
        {
            let mut registries = self.registries.lock();
            registries
                .entry(context_id)
                .or_default()
                .register(handle.clone());
        }

        {
            let mut stats = self.stats.write();
            stats.dispatched += 1;
            stats.in_flight += 1;
        }

        let request = OperationRequest {
            request_id,
            context_id,
            method,
            endpoint,
            body,
            headers,
        };

        let resolved = ResolvedOptions {
            method,
            endpoint: request.endpoint.clone(),
            abort_requests,
        };

        debug!(
            request_id = ?request_id,
            context_id = ?context_id,
            method = %method,
            endpoint = %resolved.endpoint,
            abort_requests = abort_requests,
            transport = self.transport.name(),
            "Dispatching request"
        );

        let transport = Arc::clone(&self.transport);
        let notifier = Arc::clone(&self.notifier);
        let registries = Arc::clone(&self.registries);
        let stats = Arc::clone(&self.stats);
        let prune_settled = self.config.prune_settled;
        let worker_handle = handle.clone();

        tokio::spawn(async move {
            let result = tokio::select! {
                result = transport.perform(request) => result,
                _ = cancel_rx => Err(TransportFailure::aborted(request_id)),
            };

            Self::finish(
                worker_handle,
                Outcome::from_result(result),
                resolved,
                notifier,
                registries,
                stats,
                prune_settled,
                on_success,
                on_error,
            );
        });

        handle
    }

    /// Dispatch and wait for the terminal outcome.
    pub async fn dispatch_and_wait<C>(
        &self,
        method: Method,
        context: &C,
        options: DispatchOptions,
        timeout: Option<Duration>,
    ) -> Result<Outcome, TrackerError>
    where
        C: Context + ?Sized,
    {
        let handle = self.dispatch(method, context, options);
        match timeout {
            Some(timeout) => tokio::time::timeout(timeout, handle.settled())
                .await
                .map_err(|_| TrackerError::SettleTimeout {
                    timeout,
                    in_flight: self.stats.read().in_flight,
                }),
            None => Ok(handle.settled().await),
        }
    }

    /// Cancel every outstanding request for a context and clear its registry.
    ///
    /// Returns the number of handles actually cancelled. Settled handles that
    /// were still registered count as cleared but not cancelled.
    pub fn abort_outstanding(&self, context_id: ContextId) -> usize {
        let drained = {
            let mut registries = self.registries.lock();
            match registries.get_mut(&context_id) {
                Some(registry) => registry.drain(),
                None => Vec::new(),
            }
        };

        // Cancel after the lock is released; settle hooks take it again.
        let mut cancelled = 0;
        for handle in &drained {
            if handle.cancel() {
                cancelled += 1;
            }
        }

        if cancelled > 0 {
            debug!(
                context_id = ?context_id,
                cancelled = cancelled,
                "Cancelled outstanding requests"
            );
        }
        cancelled
    }

    /// Cancel anything outstanding and stop tracking the context entirely.
    ///
    /// Call this when the context's lifetime ends; the tracker keeps a
    /// registry entry for every context it has seen until then.
    pub fn release(&self, context_id: ContextId) -> usize {
        let drained = {
            let mut registries = self.registries.lock();
            registries
                .remove(&context_id)
                .map(RequestRegistry::into_handles)
                .unwrap_or_default()
        };

        let mut cancelled = 0;
        for handle in &drained {
            if handle.cancel() {
                cancelled += 1;
            }
        }

        debug!(
            context_id = ?context_id,
            cancelled = cancelled,
            "Released context"
        );
        cancelled
    }

    /// Number of handles registered for a context.
    pub fn outstanding(&self, context_id: ContextId) -> usize {
        self.registries
            .lock()
            .get(&context_id)
            .map(RequestRegistry::len)
            .unwrap_or(0)
    }

    /// Snapshot of a context's registered handles, in dispatch order.
    pub fn outstanding_handles(&self, context_id: ContextId) -> Vec<RequestHandle> {
        self.registries
            .lock()
            .get(&context_id)
            .map(|registry| registry.handles().to_vec())
            .unwrap_or_default()
    }

    /// Number of contexts with a registry entry.
    pub fn tracked_contexts(&self) -> usize {
        self.registries.lock().len()
    }

    /// Get tracker statistics
    pub fn stats(&self) -> TrackerStats {
        self.stats.read().clone()
    }

    /// Await settlement of every currently-outstanding request for a context.
    ///
    /// Snapshots the registry first; outcomes come back in dispatch order.
    /// Requests dispatched after the snapshot are not waited on.
    pub async fn settle_all(&self, context_id: ContextId) -> Vec<Outcome> {
        let handles = self.outstanding_handles(context_id);
        future::join_all(handles.iter().map(RequestHandle::settled)).await
    }

    /// Terminal bookkeeping for one request: prune the registry, update
    /// stats, route the outcome, then settle the handle. Settling last means
    /// anyone woken by the handle observes all of the above already done.
    #[allow(clippy::too_many_arguments)]
    fn finish(
        handle: RequestHandle,
        outcome: Outcome,
        resolved: ResolvedOptions,
        notifier: Arc<dyn Notifier>,
        registries: Arc<Mutex<HashMap<ContextId, RequestRegistry>>>,
        stats: Arc<RwLock<TrackerStats>>,
        prune_settled: bool,
        on_success: Option<SuccessCallback>,
        on_error: Option<ErrorCallback>,
    ) {
        if prune_settled {
            let mut registries = registries.lock();
            if let Some(registry) = registries.get_mut(&handle.context_id()) {
                registry.remove(handle.request_id());
                if registry.is_empty() {
                    registries.remove(&handle.context_id());
                }
            }
        }

        {
            let mut stats = stats.write();
            stats.in_flight = stats.in_flight.saturating_sub(1);
            match &outcome {
                Outcome::Completed(_) => stats.completed += 1,
                Outcome::Aborted(_) => stats.aborted += 1,
                Outcome::Failed(_) => stats.failed += 1,
            }
        }

        match &outcome {
            Outcome::Completed(response) => {
                debug!(
                    request_id = ?handle.request_id(),
                    status = response.status,
                    "Request completed"
                );
                if let Some(on_success) = on_success {
                    on_success(handle.context_id(), response, &resolved);
                }
            }
            Outcome::Aborted(failure) if resolved.abort_requests => {
                debug!(
                    request_id = ?handle.request_id(),
                    context_id = ?handle.context_id(),
                    "Request aborted, notifying"
                );
                notifier.notify(EventEnvelope {
                    context_id: handle.context_id(),
                    event: RequestEvent::Aborted {
                        request_id: handle.request_id(),
                        options: resolved.clone(),
                        failure: failure.clone(),
                    },
                });
            }
            Outcome::Aborted(failure) => {
                // Classification is disarmed for this request; the abort
                // reaches the caller like any other failure.
                debug!(
                    request_id = ?handle.request_id(),
                    "Request aborted without classification"
                );
                if let Some(on_error) = on_error {
                    on_error(handle.context_id(), failure, &resolved);
                }
            }
            Outcome::Failed(failure) => {
                warn!(
                    request_id = ?handle.request_id(),
                    kind = ?failure.kind,
                    error = %failure,
                    "Request failed"
                );
                if let Some(on_error) = on_error {
                    on_error(handle.context_id(), failure, &resolved);
                }
            }
        }

        handle.settle(outcome);
    }
}
