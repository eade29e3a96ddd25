//! HTTP binding of the transport seam, built on `reqwest`.

use crate::error::TrackerError;
use crate::transport::{
    FailureKind, OperationRequest, Transport, TransportFailure, TransportResponse, TransportResult,
};
use crate::types::Method;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

const HTTP_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const HTTP_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for the bundled HTTP transport
#[derive(Debug, Clone)]
pub struct HttpTransportConfig {
    /// Base URL that context endpoints are joined onto
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl HttpTransportConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            connect_timeout: HTTP_CONNECT_TIMEOUT,
            request_timeout: HTTP_REQUEST_TIMEOUT,
        }
    }
}

/// HTTP transport
///
/// Dropping the in-flight future aborts the underlying request, which is how
/// the tracker cancels superseded dispatches.
pub struct HttpTransport {
    client: Client,
    config: HttpTransportConfig,
}

impl HttpTransport {
    pub fn new(config: HttpTransportConfig) -> Result<Self, TrackerError> {
        let client = Client::builder()
            .no_proxy()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| TrackerError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    fn url_for(&self, endpoint: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        )
    }
}

// Helper function to convert tracker methods to HTTP verbs
fn http_method(method: Method) -> reqwest::Method {
    match method {
        Method::Create => reqwest::Method::POST,
        Method::Read => reqwest::Method::GET,
        Method::Update => reqwest::Method::PUT,
        Method::Patch => reqwest::Method::PATCH,
        Method::Delete => reqwest::Method::DELETE,
    }
}

// Helper function to map reqwest errors onto the failure taxonomy
fn map_http_error(error: reqwest::Error) -> TransportFailure {
    if error.is_status() {
        TransportFailure {
            kind: FailureKind::Http,
            status: error.status().map(|s| s.as_u16()),
            message: format!("Request failed: {}", error),
        }
    } else if error.is_timeout() {
        TransportFailure::timeout(format!("Request timeout: {}", error))
    } else if error.is_connect() {
        TransportFailure::connect(format!("Connection error: {}", error))
    } else {
        TransportFailure::other(format!("HTTP error: {}", error))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn perform(&self, request: OperationRequest) -> TransportResult {
        let url = self.url_for(&request.endpoint);
        let mut builder = self.client.request(http_method(request.method), &url);

        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }

        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(map_http_error)?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(TransportFailure::http(status.as_u16(), error_text));
        }

        let text = response.text().await.map_err(map_http_error)?;
        // 204-style responses come back with an empty body
        let body = if text.is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text)
                .map_err(|e| TransportFailure::decode(format!("Failed to parse response: {}", e)))?
        };

        Ok(TransportResponse {
            status: status.as_u16(),
            body,
        })
    }

    fn name(&self) -> &str {
        "http"
    }
}
