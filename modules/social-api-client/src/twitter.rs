// Twitter REST v1.1 client (OAuth 1.0a user context).

use std::sync::Arc;

use crate::error::{ApiError, Result};
use crate::oauth::OAuthKeys;
use crate::transport::{fetch_json, ApiRequest, Transport};
use crate::types::Tweet;

pub const TWITTER_API: &str = "https://api.twitter.com/1.1";

pub struct TwitterClient {
    transport: Arc<dyn Transport>,
    keys: OAuthKeys,
    base_url: String,
}

impl TwitterClient {
    pub fn new(transport: Arc<dyn Transport>, keys: OAuthKeys) -> Self {
        Self {
            transport,
            keys,
            base_url: TWITTER_API.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Signed GET; explicit `errors` payloads become `ApiError::Upstream`.
    async fn get(&self, path: &str, params: &[(&str, &str)]) -> Result<serde_json::Value> {
        let url = format!("{}/{}", self.base_url, path);
        let params: Vec<(String, String)> = params
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let auth = self.keys.authorization("GET", &url, &params);

        let mut request = ApiRequest::get(url).header("Authorization", auth);
        request.query = params;

        let value: serde_json::Value = fetch_json(self.transport.as_ref(), request)
            .await
            .map_err(|e| e.with_upstream_message(error_message))?;
        if let Some(message) = error_message(&value) {
            return Err(ApiError::Upstream(message));
        }
        Ok(value)
    }

    /// Most recent statuses of a user, undecoded so callers can skip bad entries.
    pub async fn user_timeline(&self, screen_name: &str) -> Result<Vec<serde_json::Value>> {
        tracing::info!(screen_name, "twitter: fetching user timeline");
        let value = self
            .get("statuses/user_timeline.json", &[("screen_name", screen_name)])
            .await?;
        match value {
            serde_json::Value::Array(items) => Ok(items),
            other => Err(ApiError::Parse(format!(
                "expected a status array, got {}",
                type_name(&other)
            ))),
        }
    }

    pub async fn show_status(&self, id: &str) -> Result<Tweet> {
        tracing::info!(id, "twitter: fetching status");
        let value = self.get("statuses/show.json", &[("id", id)]).await?;
        Ok(serde_json::from_value(value)?)
    }
}

/// `{"errors":[{"code":34,"message":"..."}]}`
fn error_message(value: &serde_json::Value) -> Option<String> {
    let errors = value.get("errors")?.as_array()?;
    let first = errors.first()?;
    first
        .get("message")
        .and_then(|m| m.as_str())
        .map(str::to_string)
}

fn type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extracts_first_error_message() {
        let payload = json!({"errors": [{"code": 34, "message": "Sorry, that page does not exist."}]});
        assert_eq!(
            error_message(&payload).as_deref(),
            Some("Sorry, that page does not exist.")
        );
    }

    #[test]
    fn timeline_array_has_no_error_message() {
        assert_eq!(error_message(&json!([{"id": 1}])), None);
        assert_eq!(error_message(&json!({"errors": []})), None);
    }
}
