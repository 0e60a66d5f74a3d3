// Instagram legacy v1 API client. Authenticates with `client_id`.

use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::error::{ApiError, Result};
use crate::transport::{fetch_json, ApiRequest, Transport};
use crate::types::{InstagramEnvelope, InstagramMedia, InstagramUser};

pub const INSTAGRAM_API: &str = "https://api.instagram.com/v1";

pub struct InstagramClient {
    transport: Arc<dyn Transport>,
    client_id: String,
    base_url: String,
}

impl InstagramClient {
    pub fn new(transport: Arc<dyn Transport>, client_id: &str) -> Self {
        Self {
            transport,
            client_id: client_id.to_string(),
            base_url: INSTAGRAM_API.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// GET an endpoint and unwrap the `{meta, data}` envelope.
    async fn get<T: DeserializeOwned>(&self, path: &str, params: &[(&str, &str)]) -> Result<T> {
        let mut request = ApiRequest::get(format!("{}/{}", self.base_url, path))
            .query("client_id", self.client_id.as_str());
        for (key, value) in params {
            request = request.query(*key, *value);
        }

        let envelope: InstagramEnvelope<T> = fetch_json(self.transport.as_ref(), request)
            .await
            .map_err(|e| e.with_upstream_message(error_message))?;
        if envelope.meta.code != 200 {
            return Err(ApiError::Upstream(
                envelope
                    .meta
                    .error_message
                    .unwrap_or_else(|| format!("meta code {}", envelope.meta.code)),
            ));
        }
        envelope
            .data
            .ok_or_else(|| ApiError::Parse("response has no data".to_string()))
    }

    pub async fn search_users(&self, username: &str) -> Result<Vec<InstagramUser>> {
        tracing::info!(username, "instagram: searching users");
        self.get("users/search", &[("q", username)]).await
    }

    /// Recent media of a user id, undecoded so callers can skip bad entries.
    pub async fn recent_media(&self, user_id: &str) -> Result<Vec<serde_json::Value>> {
        tracing::info!(user_id, "instagram: fetching recent media");
        self.get(&format!("users/{user_id}/media/recent"), &[]).await
    }

    pub async fn media(&self, id: &str) -> Result<InstagramMedia> {
        tracing::info!(id, "instagram: fetching media");
        self.get(&format!("media/{id}"), &[]).await
    }

    pub async fn media_by_shortcode(&self, shortcode: &str) -> Result<InstagramMedia> {
        self.get(&format!("media/shortcode/{shortcode}"), &[]).await
    }
}

/// Error bodies carry the same `meta` block as successful ones.
fn error_message(value: &serde_json::Value) -> Option<String> {
    let meta = value.get("meta").unwrap_or(value);
    meta.get("error_message")
        .and_then(|m| m.as_str())
        .map(str::to_string)
}
