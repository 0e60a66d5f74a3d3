// Canned-response transport for tests. Routes are keyed by endpoint URL
// (query string excluded) and every request is recorded.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{ApiError, Result};
use crate::transport::{ApiRequest, Transport};

#[derive(Clone)]
enum StubResponse {
    Body(Vec<u8>),
    Status(u16, String),
    Network(String),
}

#[derive(Default)]
pub struct StubTransport {
    routes: Mutex<HashMap<String, StubResponse>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl StubTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn route(self, url: &str, response: StubResponse) -> Self {
        self.routes
            .lock()
            .unwrap()
            .insert(url.to_string(), response);
        self
    }

    pub fn with_json(self, url: &str, body: serde_json::Value) -> Self {
        self.route(url, StubResponse::Body(body.to_string().into_bytes()))
    }

    pub fn with_text(self, url: &str, body: &str) -> Self {
        self.route(url, StubResponse::Body(body.as_bytes().to_vec()))
    }

    pub fn with_bytes(self, url: &str, body: Vec<u8>) -> Self {
        self.route(url, StubResponse::Body(body))
    }

    pub fn with_status(self, url: &str, status: u16, body: &str) -> Self {
        self.route(url, StubResponse::Status(status, body.to_string()))
    }

    pub fn with_network_error(self, url: &str) -> Self {
        self.route(url, StubResponse::Network("connection refused".to_string()))
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requested_urls(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.url).collect()
    }
}

#[async_trait]
impl Transport for StubTransport {
    async fn send(&self, request: ApiRequest) -> Result<Vec<u8>> {
        let response = self.routes.lock().unwrap().get(&request.url).cloned();
        let url = request.url.clone();
        self.requests.lock().unwrap().push(request);

        match response {
            Some(StubResponse::Body(body)) => Ok(body),
            Some(StubResponse::Status(status, message)) => Err(ApiError::Api { status, message }),
            Some(StubResponse::Network(message)) => Err(ApiError::Network(message)),
            None => Err(ApiError::Network(format!("no stub for {url}"))),
        }
    }
}
