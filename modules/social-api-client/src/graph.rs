// Facebook Graph API client. Authenticates with the app token
// `<app_id>|<app_secret>` passed as `access_token`.

use std::sync::Arc;

use crate::error::{ApiError, Result};
use crate::transport::{fetch_json, ApiRequest, Transport};
use crate::types::{GraphNode, GraphPage, GraphPost};

pub const GRAPH_API: &str = "https://graph.facebook.com/v2.3";

pub struct GraphClient {
    transport: Arc<dyn Transport>,
    access_token: String,
    base_url: String,
}

impl GraphClient {
    pub fn new(transport: Arc<dyn Transport>, app_id: &str, app_secret: &str) -> Self {
        Self {
            transport,
            access_token: format!("{app_id}|{app_secret}"),
            base_url: GRAPH_API.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    async fn get(&self, path: &str) -> Result<serde_json::Value> {
        let request = ApiRequest::get(format!("{}/{}", self.base_url, path))
            .query("access_token", self.access_token.as_str());

        let value: serde_json::Value = fetch_json(self.transport.as_ref(), request)
            .await
            .map_err(|e| e.with_upstream_message(error_message))?;
        if let Some(message) = error_message(&value) {
            return Err(ApiError::Upstream(message));
        }
        Ok(value)
    }

    /// Resolve a username (or numeric id) to its Graph node.
    pub async fn node(&self, username: &str) -> Result<GraphNode> {
        tracing::info!(username, "facebook: resolving node");
        let value = self.get(username).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// First page of `/<id>/feed`, undecoded so callers can skip bad entries.
    pub async fn feed(&self, user_id: &str) -> Result<Vec<serde_json::Value>> {
        tracing::info!(user_id, "facebook: fetching feed");
        let value = self.get(&format!("{user_id}/feed")).await?;
        let page: GraphPage<serde_json::Value> = serde_json::from_value(value)?;
        Ok(page.data)
    }

    pub async fn post(&self, id: &str) -> Result<GraphPost> {
        tracing::info!(id, "facebook: fetching post");
        let value = self.get(id).await?;
        Ok(serde_json::from_value(value)?)
    }
}

/// `{"error":{"message":"...","type":"OAuthException","code":190}}`
fn error_message(value: &serde_json::Value) -> Option<String> {
    value
        .get("error")?
        .get("message")?
        .as_str()
        .map(str::to_string)
}
