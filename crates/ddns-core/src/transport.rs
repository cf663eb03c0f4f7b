//! Request execution seam
//!
//! Every outbound call is an [`ApiRequest`] handed to a [`RequestExecutor`].
//! Executors compose by wrapping: [`crate::resilience::Retry`] wraps an
//! [`HttpExecutor`], and clients only ever see the outermost one.

use async_trait::async_trait;
use reqwest::Method;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::error::{Error, Result};

/// Default HTTP timeout for API requests
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// An outbound HTTP request
///
/// Requests are plain values so a retrying executor can send the same one
/// several times.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

impl ApiRequest {
    /// Create a request with no headers and no body
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    /// Shorthand for a GET request
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    /// Add a header
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Set the body
    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = Some(body);
        self
    }

    /// Look up a header value by case-insensitive name
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

// Custom Debug implementation that hides the Authorization header
impl std::fmt::Debug for ApiRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let headers: Vec<(&str, &str)> = self
            .headers
            .iter()
            .map(|(key, value)| {
                if key.eq_ignore_ascii_case("authorization") {
                    (key.as_str(), "<REDACTED>")
                } else {
                    (key.as_str(), value.as_str())
                }
            })
            .collect();

        f.debug_struct("ApiRequest")
            .field("method", &self.method)
            .field("url", &self.url)
            .field("headers", &headers)
            .field("body_len", &self.body.as_ref().map(Vec::len))
            .finish()
    }
}

/// A fully-read HTTP response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Status >= 500
    pub fn is_server_error(&self) -> bool {
        self.status >= 500
    }

    /// Status in 400..500
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status)
    }

    /// Body as lossy UTF-8
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Executes a single request
///
/// Returns `Ok` for any response that arrived, whatever its status; `Err`
/// only for transport failure or cancellation.
#[async_trait]
pub trait RequestExecutor: Send + Sync {
    async fn execute(&self, request: &ApiRequest, cancel: &CancellationToken)
    -> Result<ApiResponse>;
}

#[async_trait]
impl<E: RequestExecutor + ?Sized> RequestExecutor for Box<E> {
    async fn execute(
        &self,
        request: &ApiRequest,
        cancel: &CancellationToken,
    ) -> Result<ApiResponse> {
        (**self).execute(request, cancel).await
    }
}

#[async_trait]
impl<E: RequestExecutor + ?Sized> RequestExecutor for Arc<E> {
    async fn execute(
        &self,
        request: &ApiRequest,
        cancel: &CancellationToken,
    ) -> Result<ApiResponse> {
        (**self).execute(request, cancel).await
    }
}

/// Executor that sends requests over the network with `reqwest`
#[derive(Debug, Clone)]
pub struct HttpExecutor {
    client: reqwest::Client,
}

impl HttpExecutor {
    /// Create an executor whose requests time out after `timeout`
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse> {
        let mut builder = self
            .client
            .request(request.method.clone(), request.url.as_str());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder
            .send()
            .await
            .map_err(|e| Error::transport(format!("could not get response: {}", e)))?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| Error::transport(format!("could not read response body: {}", e)))?;

        Ok(ApiResponse::new(status, body.to_vec()))
    }
}

#[async_trait]
impl RequestExecutor for HttpExecutor {
    async fn execute(
        &self,
        request: &ApiRequest,
        cancel: &CancellationToken,
    ) -> Result<ApiResponse> {
        tracing::debug!(method = %request.method, url = %request.url, "Sending request");

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(Error::Cancelled),
            result = self.send(request) => result,
        }
    }
}
