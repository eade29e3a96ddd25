//! Transport seam between the tracker and whatever actually moves bytes.
//!
//! The tracker never talks to the network directly; it hands an
//! [`OperationRequest`] to a [`Transport`] and classifies the result. The
//! bundled HTTP binding lives in [`http`], tests substitute their own.

use crate::types::{ContextId, Method, RequestId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

pub mod http;

/// Result of a single transport operation
pub type TransportResult = Result<TransportResponse, TransportFailure>;

/// A single operation handed to the transport
#[derive(Debug, Clone)]
pub struct OperationRequest {
    pub request_id: RequestId,
    pub context_id: ContextId,
    pub method: Method,
    pub endpoint: String,
    pub body: Option<Value>,
    pub headers: HashMap<String, String>,
}

impl PartialEq for OperationRequest {
    fn eq(&self, other: &Self) -> bool {
        self.request_id == other.request_id
    }
}

impl Eq for OperationRequest {}

/// Successful transport response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Value,
}

/// Failure taxonomy; `Aborted` is the canonical cancellation marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureKind {
    Aborted,
    Timeout,
    Connect,
    Http,
    Decode,
    Other,
}

/// Failed transport operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransportFailure {
    pub kind: FailureKind,
    pub status: Option<u16>,
    pub message: String,
}

impl TransportFailure {
    /// Canonical failure for a request cancelled before the transport answered.
    pub fn aborted(request_id: RequestId) -> Self {
        Self {
            kind: FailureKind::Aborted,
            status: None,
            message: format!("Request {} aborted", request_id.as_u64()),
        }
    }

    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Http,
            status: Some(status),
            message: message.into(),
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Timeout,
            status: None,
            message: message.into(),
        }
    }

    pub fn connect(message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Connect,
            status: None,
            message: message.into(),
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Decode,
            status: None,
            message: message.into(),
        }
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Other,
            status: None,
            message: message.into(),
        }
    }

    /// Whether this failure is the canonical abort marker.
    pub fn is_abort(&self) -> bool {
        self.kind == FailureKind::Aborted
    }
}

impl fmt::Display for TransportFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "{:?} (status {}): {}", self.kind, status, self.message),
            None => write!(f, "{:?}: {}", self.kind, self.message),
        }
    }
}

impl std::error::Error for TransportFailure {}

/// Transport abstraction the tracker dispatches through
#[async_trait]
pub trait Transport: Send + Sync {
    /// Perform the operation and return its result.
    ///
    /// Cancellation drops this future; transports should abort any in-flight
    /// work on drop.
    async fn perform(&self, request: OperationRequest) -> TransportResult;

    /// Get the transport name
    fn name(&self) -> &str;
}
