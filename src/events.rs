//! In-process notification channel for request lifecycle events.

use crate::options::ResolvedOptions;
use crate::transport::TransportFailure;
use crate::types::{ContextId, RequestId};
use std::sync::mpsc::{channel, Receiver, Sender};

/// Lifecycle event emitted by the tracker
#[derive(Debug, Clone)]
pub enum RequestEvent {
    /// A request armed for latest-wins dispatch was cancelled
    Aborted {
        request_id: RequestId,
        options: ResolvedOptions,
        failure: TransportFailure,
    },
}

/// Event plus the context it belongs to
#[derive(Debug, Clone)]
pub struct EventEnvelope {
    pub context_id: ContextId,
    pub event: RequestEvent,
}

/// Sink for request lifecycle events
pub trait Notifier: Send + Sync {
    fn notify(&self, envelope: EventEnvelope);
}

/// Channel-backed notifier
#[derive(Clone)]
pub struct EventBus {
    sender: Sender<EventEnvelope>,
}

impl EventBus {
    pub fn new_pair() -> (Self, Receiver<EventEnvelope>) {
        let (sender, receiver) = channel();
        (Self { sender }, receiver)
    }
}

impl Notifier for EventBus {
    fn notify(&self, envelope: EventEnvelope) {
        // The receiver may be gone during shutdown.
        let _ = self.sender.send(envelope);
    }
}

/// Notifier that drops every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn notify(&self, _envelope: EventEnvelope) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Method;

    fn abort_envelope() -> EventEnvelope {
        let request_id = RequestId::next();
        EventEnvelope {
            context_id: ContextId::next(),
            event: RequestEvent::Aborted {
                request_id,
                options: ResolvedOptions {
                    method: Method::Read,
                    endpoint: "/notes".to_string(),
                    abort_requests: true,
                },
                failure: TransportFailure::aborted(request_id),
            },
        }
    }

    #[test]
    fn bus_delivers_to_its_receiver() {
        let (bus, receiver) = EventBus::new_pair();
        let envelope = abort_envelope();
        let context_id = envelope.context_id;

        bus.notify(envelope);

        let received = receiver.try_recv().unwrap();
        assert_eq!(received.context_id, context_id);
        let RequestEvent::Aborted { failure, .. } = received.event;
        assert!(failure.is_abort());
    }

    #[test]
    fn bus_survives_a_dropped_receiver() {
        let (bus, receiver) = EventBus::new_pair();
        drop(receiver);
        bus.notify(abort_envelope());
    }

    #[test]
    fn null_notifier_swallows_events() {
        NullNotifier.notify(abort_envelope());
    }
}
