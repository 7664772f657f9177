//! HTTP client abstraction for testability

use bytes::Bytes;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

use super::error::FetchError;
use super::identity::DEFAULT_USER_AGENT;

/// Response from a tile GET request.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    /// Value of the `Content-Type` header, if any
    pub content_type: Option<String>,
    pub body: Bytes,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    fn mime(&self) -> String {
        self.content_type
            .as_deref()
            .unwrap_or("")
            .trim()
            .to_ascii_lowercase()
    }

    /// True for HTML pages, which tile servers return instead of an image
    /// when they block a client.
    pub fn is_html(&self) -> bool {
        self.mime().starts_with("text/html")
    }

    pub fn is_image(&self) -> bool {
        self.mime().starts_with("image/")
    }
}

/// Transport-level failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Request did not complete within the timeout
    #[error("request timed out")]
    Timeout,
    /// Connection, TLS, or body read failure
    #[error("{0}")]
    Connection(String),
}

/// Trait for async HTTP GET requests.
///
/// The scheduler is generic over this trait so tests can substitute a mock.
pub trait AsyncHttpClient: Send + Sync + 'static {
    /// Performs an HTTP GET request with the given headers.
    ///
    /// Non-2xx responses are returned as `Ok`; only transport failures are
    /// errors.
    fn get(
        &self,
        url: &str,
        headers: &[(String, String)],
    ) -> impl Future<Output = Result<HttpResponse, TransportError>> + Send;
}

/// HTTP client backed by reqwest.
#[derive(Clone)]
pub struct ReqwestClient {
    client: reqwest::Client,
}

impl ReqwestClient {
    /// Creates a client with the given per-request timeout.
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout.min(Duration::from_secs(10)))
            .pool_max_idle_per_host(8)
            .user_agent(DEFAULT_USER_AGENT)
            .build()
            .map_err(|e| FetchError::HttpClient(e.to_string()))?;

        Ok(Self { client })
    }
}

impl AsyncHttpClient for ReqwestClient {
    async fn get(
        &self,
        url: &str,
        headers: &[(String, String)],
    ) -> Result<HttpResponse, TransportError> {
        let mut request = self.client.get(url);
        for (name, value) in headers {
            request = request.header(name.as_str(), value.as_str());
        }

        let response = request.send().await.map_err(|e| {
            warn!(url, error = %e, is_timeout = e.is_timeout(), "HTTP request failed");
            classify(e)
        })?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let body = response.bytes().await.map_err(|e| {
            warn!(url, error = %e, "Failed to read response body");
            classify(e)
        })?;

        Ok(HttpResponse {
            status,
            content_type,
            body,
        })
    }
}

fn classify(error: reqwest::Error) -> TransportError {
    if error.is_timeout() {
        TransportError::Timeout
    } else {
        TransportError::Connection(error.to_string())
    }
}
