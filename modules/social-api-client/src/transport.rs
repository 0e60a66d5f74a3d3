use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::error::{ApiError, Result};

/// A GET request against an upstream endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    /// Endpoint URL without query string.
    pub url: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
}

impl ApiRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            query: Vec::new(),
            headers: Vec::new(),
        }
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }
}

/// Request/response boundary every upstream call goes through.
/// Production wires in `ReqwestTransport`; tests use `StubTransport`.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Perform the request and return the raw body of a 2xx response.
    /// Non-2xx responses become `ApiError::Api` carrying the body text.
    async fn send(&self, request: ApiRequest) -> Result<Vec<u8>>;

    async fn get_text(&self, request: ApiRequest) -> Result<String> {
        let body = self.send(request).await?;
        String::from_utf8(body).map_err(|e| ApiError::Parse(e.to_string()))
    }
}

/// Fetch and decode a JSON body.
pub async fn fetch_json<T: DeserializeOwned>(
    transport: &dyn Transport,
    request: ApiRequest,
) -> Result<T> {
    let body = transport.send(request).await?;
    Ok(serde_json::from_slice(&body)?)
}

pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("socialfeed/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(timeout.min(Duration::from_secs(5)))
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: ApiRequest) -> Result<Vec<u8>> {
        tracing::debug!(url = request.url.as_str(), "GET");

        let mut builder = self.client.get(&request.url).query(&request.query);
        for (key, value) in &request.headers {
            builder = builder.header(key.as_str(), value.as_str());
        }
        let resp = builder.send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ApiError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        Ok(resp.bytes().await?.to_vec())
    }
}
