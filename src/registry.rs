//! Per-context registry of dispatched request handles.

use crate::handle::RequestHandle;
use crate::types::RequestId;

/// Ordered registry of handles for a single context
///
/// Handles appear in dispatch order; the newest handle is last.
#[derive(Debug, Default)]
pub struct RequestRegistry {
    handles: Vec<RequestHandle>,
}

impl RequestRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a handle. The caller guarantees dispatch order.
    pub fn register(&mut self, handle: RequestHandle) {
        self.handles.push(handle);
    }

    /// Remove every handle, preserving dispatch order.
    pub fn drain(&mut self) -> Vec<RequestHandle> {
        std::mem::take(&mut self.handles)
    }

    /// Remove a single handle by ID, preserving the order of the rest.
    pub fn remove(&mut self, request_id: RequestId) -> Option<RequestHandle> {
        let position = self
            .handles
            .iter()
            .position(|handle| handle.request_id() == request_id)?;
        Some(self.handles.remove(position))
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Most recently registered handle.
    pub fn last(&self) -> Option<&RequestHandle> {
        self.handles.last()
    }

    pub fn contains(&self, request_id: RequestId) -> bool {
        self.handles
            .iter()
            .any(|handle| handle.request_id() == request_id)
    }

    /// Handles in dispatch order.
    pub fn handles(&self) -> &[RequestHandle] {
        &self.handles
    }

    pub fn into_handles(self) -> Vec<RequestHandle> {
        self.handles
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ContextId, Method};

    fn handle() -> RequestHandle {
        let (handle, _cancel_rx) = RequestHandle::new_pair(
            RequestId::next(),
            ContextId::next(),
            Method::Read,
            "/notes".to_string(),
        );
        handle
    }

    #[test]
    fn registration_preserves_dispatch_order() {
        let mut registry = RequestRegistry::new();
        let first = handle();
        let second = handle();
        let third = handle();

        registry.register(first.clone());
        registry.register(second.clone());
        registry.register(third.clone());

        assert_eq!(registry.len(), 3);
        assert_eq!(registry.handles()[0], first);
        assert_eq!(registry.handles()[1], second);
        assert_eq!(registry.last(), Some(&third));
    }

    #[test]
    fn drain_empties_in_order() {
        let mut registry = RequestRegistry::new();
        let first = handle();
        let second = handle();
        registry.register(first.clone());
        registry.register(second.clone());

        let drained = registry.drain();
        assert_eq!(drained, vec![first, second]);
        assert!(registry.is_empty());
        assert_eq!(registry.last(), None);
    }

    #[test]
    fn remove_keeps_the_rest_ordered() {
        let mut registry = RequestRegistry::new();
        let first = handle();
        let second = handle();
        let third = handle();
        registry.register(first.clone());
        registry.register(second.clone());
        registry.register(third.clone());

        let removed = registry.remove(second.request_id());
        assert_eq!(removed, Some(second.clone()));
        assert!(!registry.contains(second.request_id()));
        assert_eq!(registry.handles(), &[first, third]);
    }

    #[test]
    fn remove_of_unknown_id_is_none() {
        let mut registry = RequestRegistry::new();
        registry.register(handle());
        assert_eq!(registry.remove(RequestId::next()), None);
        assert_eq!(registry.len(), 1);
    }
}
