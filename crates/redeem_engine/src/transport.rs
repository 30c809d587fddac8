use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, COOKIE, USER_AGENT};
use thiserror::Error;

use redeem_core::CredentialSet;

/// Fixed deadline for one submission.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const BROWSER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/137.0.0.0 Safari/537.36";

#[derive(Debug, Clone)]
pub struct SubmitSettings {
    /// Full URL of the redemption endpoint.
    pub endpoint: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl SubmitSettings {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: REQUEST_TIMEOUT,
        }
    }
}

/// A completed HTTP exchange, before classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("submission deadline expired")]
    Timeout,
    #[error("network error: {0}")]
    Network(String),
}

/// One outbound submission carrying a code. Implementations must not
/// touch any run state; the dispatcher records every outcome.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    async fn submit(&self, code: &str) -> Result<HttpReply, TransportError>;
}

/// Transport bound to one endpoint and one credential set. The
/// credentials are rendered once into a `Cookie` header and ride on
/// every submission.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    endpoint: reqwest::Url,
}

impl ReqwestTransport {
    pub fn new(
        settings: &SubmitSettings,
        credentials: &CredentialSet,
    ) -> Result<Self, TransportError> {
        let endpoint = reqwest::Url::parse(&settings.endpoint)
            .map_err(|err| TransportError::Network(err.to_string()))?;

        // The upstream endpoint expects XHR-shaped requests.
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
        headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_AGENT));
        headers.insert("x-requested-with", HeaderValue::from_static("XMLHttpRequest"));
        if let Some(cookie_header) = credentials.to_cookie_header() {
            let value = HeaderValue::from_str(&cookie_header)
                .map_err(|err| TransportError::Network(err.to_string()))?;
            headers.insert(COOKIE, value);
        }

        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .default_headers(headers)
            .build()
            .map_err(|err| TransportError::Network(err.to_string()))?;

        Ok(Self { client, endpoint })
    }
}

#[async_trait::async_trait]
impl Transport for ReqwestTransport {
    async fn submit(&self, code: &str) -> Result<HttpReply, TransportError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .form(&[("code", code)])
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(map_reqwest_error)?;
        Ok(HttpReply { status, body })
    }
}

fn map_reqwest_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        return TransportError::Timeout;
    }
    TransportError::Network(err.to_string())
}
