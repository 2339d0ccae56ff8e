use crate::error::ClientError;
use async_trait::async_trait;
use std::time::Duration;
use url::Url;

/// A read request, ready to go on the wire.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    /// Absolute URL without a query string.
    pub url: Url,
    /// Query parameters in order. Keys may repeat.
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    /// Overrides the transport's own timeout for this request.
    pub timeout: Option<Duration>,
}

impl HttpRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// A response whose body has been read to completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The seam between sessions and the network.
///
/// Sessions only ever issue GET requests through this trait, which lets the
/// test suite swap the HTTP stack for an in-memory backend.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends a GET request and returns the status with the full body.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ClientError>;
}

/// The reqwest-backed transport used against the real service.
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("atlas/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ClientError::Configuration(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    /// Wraps an already configured client, e.g. one with a proxy or custom TLS roots.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ClientError> {
        tracing::debug!(url = %request.url, params = request.query.len(), "Dispatching request.");

        let mut builder = self.client.get(request.url.clone()).query(&request.query);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        tracing::debug!(url = %request.url, status, bytes = body.len(), "Received response.");
        Ok(HttpResponse { status, body })
    }
}
