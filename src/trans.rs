use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header::HeaderMap, StatusCode, Url};

use crate::{api::RestMethod, error::Result, req::req_safe_read_body};

/// A fully prepared request to the ca-server.
#[derive(Debug, Clone)]
pub struct CaRequest {
    pub method: RestMethod,
    pub url: Url,
    pub headers: HeaderMap,

    /// JSON encoded body, if any.
    pub body: Option<String>,
}

/// Raw response from the ca-server.
#[derive(Debug, Clone)]
pub struct CaResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl CaResponse {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        CaResponse {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..=299).contains(&self.status.as_u16())
    }

    /// Human readable description of the response, used in error messages.
    pub fn describe(&self) -> String {
        format!(
            "{} headers: {:?} body: {}",
            self.status, self.headers, self.body
        )
    }
}

/// Sends requests to the ca-server.
///
/// [`HttpTransport`] is the implementation used by default. Timeouts and TLS are whatever the
/// transport provides; the client never retries.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends the request and returns the response, whatever its status.
    ///
    /// Errors are reserved for failures that produced no response at all.
    async fn send(&self, request: CaRequest) -> Result<CaResponse>;
}

/// [`Transport`] over a [`reqwest::Client`].
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Creates a transport with connect and request timeouts of 30 seconds.
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(30))
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self::from_client(client))
    }

    /// Wraps an existing, configured client.
    pub fn from_client(client: reqwest::Client) -> Self {
        HttpTransport { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: CaRequest) -> Result<CaResponse> {
        let CaRequest {
            method,
            url,
            headers,
            body,
        } = request;

        let mut req = self.client.request(method.into(), url).headers(headers);

        if let Some(body) = body {
            req = req.body(body);
        }

        let res = req.send().await?;

        let status = res.status();
        let headers = res.headers().clone();
        let body = req_safe_read_body(res).await;

        Ok(CaResponse {
            status,
            headers,
            body,
        })
    }
}
