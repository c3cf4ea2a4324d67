//! HTTP transport abstraction.
//!
//! The transfer engine never talks to `reqwest` directly. It issues
//! [`HttpRequest`] envelopes through the [`HttpClient`] trait and receives
//! [`HttpResponse`] envelopes back, so the retry executor can be exercised
//! against deterministic in-process transports in tests.

use std::collections::BTreeMap;
use std::collections::VecDeque;
use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

/// HTTP methods used by the transfer engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

impl Display for HttpMethod {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request envelope for a single network call.
///
/// Header names are stored lowercased so lookups are case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: BTreeMap<String, String>,
    pub body: Option<String>,
    pub timeout_ms: u64,
}

impl HttpRequest {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: BTreeMap::new(),
            body: None,
            timeout_ms: 10_000,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, url)
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.into().to_ascii_lowercase(), value.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }
}

/// Response envelope returned by a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: BTreeMap::new(),
            body: body.into(),
        }
    }

    pub fn ok_json(body: impl Into<String>) -> Self {
        Self::new(200, body)
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.into().to_ascii_lowercase(), value.into());
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Server-provided retry hint, in seconds.
    ///
    /// Returns `None` when the header is absent or does not parse as a
    /// non-negative number; callers fall back to computed backoff.
    pub fn retry_after_seconds(&self) -> Option<f64> {
        self.header("retry-after")
            .and_then(|value| value.trim().parse::<f64>().ok())
            .filter(|seconds| seconds.is_finite() && *seconds >= 0.0)
    }
}

/// Transport-level failure: timeout, connection error, or protocol breakage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpError {
    message: String,
    retryable: bool,
}

impl HttpError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            retryable: true,
        }
    }

    pub fn non_retryable(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            retryable: false,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn retryable(&self) -> bool {
        self.retryable
    }
}

impl Display for HttpError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for HttpError {}

/// Transport contract: perform exactly one network call per invocation.
pub trait HttpClient: Send + Sync {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>>;
}

/// Production transport backed by reqwest.
///
/// The underlying client is created once per run with a fixed connect
/// timeout; the per-request timeout comes from the request envelope.
#[derive(Debug, Clone)]
pub struct ReqwestHttpClient {
    client: Arc<reqwest::Client>,
}

impl ReqwestHttpClient {
    pub fn new() -> Self {
        Self {
            client: Arc::new(
                reqwest::Client::builder()
                    .user_agent("siphon/0.1.0")
                    .connect_timeout(std::time::Duration::from_secs(2))
                    .build()
                    .unwrap_or_else(|_| reqwest::Client::new()),
            ),
        }
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client: Arc::new(client),
        }
    }
}

impl Default for ReqwestHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClient for ReqwestHttpClient {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        Box::pin(async move {
            let mut builder = match request.method {
                HttpMethod::Get => self.client.get(&request.url),
                HttpMethod::Post => self.client.post(&request.url),
            };

            for (name, value) in &request.headers {
                builder = builder.header(name, value);
            }

            builder = builder.timeout(std::time::Duration::from_millis(request.timeout_ms));

            if let Some(body) = request.body {
                builder = builder
                    .header("content-type", "application/json")
                    .body(body);
            }

            let response = builder.send().await.map_err(|e| {
                if e.is_timeout() {
                    HttpError::new(format!("request timeout: {e}"))
                } else if e.is_connect() {
                    HttpError::new(format!("connection failed: {e}"))
                } else {
                    HttpError::new(format!("request failed: {e}"))
                }
            })?;

            let status = response.status().as_u16();
            let mut headers = BTreeMap::new();
            for (name, value) in response.headers() {
                if let Ok(value) = value.to_str() {
                    headers.insert(name.as_str().to_ascii_lowercase(), value.to_string());
                }
            }

            let body = response
                .text()
                .await
                .map_err(|e| HttpError::new(format!("failed to read response body: {e}")))?;

            Ok(HttpResponse {
                status,
                headers,
                body,
            })
        })
    }
}

/// Deterministic scripted transport for offline tests.
///
/// Pops one scripted step per call and records every request it saw, so tests
/// can assert on ordering, headers, and call counts.
pub struct ScriptedHttpClient {
    script: Mutex<VecDeque<Result<HttpResponse, HttpError>>>,
    seen: Mutex<Vec<HttpRequest>>,
}

impl ScriptedHttpClient {
    pub fn new(script: impl IntoIterator<Item = Result<HttpResponse, HttpError>>) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
            seen: Mutex::new(Vec::new()),
        }
    }

    /// Every request executed so far, in order.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.seen.lock().expect("request log poisoned").clone()
    }

    pub fn request_count(&self) -> usize {
        self.seen.lock().expect("request log poisoned").len()
    }
}

impl HttpClient for ScriptedHttpClient {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        Box::pin(async move {
            self.seen.lock().expect("request log poisoned").push(request);
            match self.script.lock().expect("script poisoned").pop_front() {
                Some(step) => step,
                None => Err(HttpError::non_retryable(
                    "scripted transport ran out of responses",
                )),
            }
        })
    }
}
