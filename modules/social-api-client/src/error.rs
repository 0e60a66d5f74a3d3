use thiserror::Error;

pub type Result<T> = std::result::Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// The upstream answered with an explicit error payload.
    #[error("{0}")]
    Upstream(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Request timed out")]
    Timeout,
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return ApiError::Timeout;
        }
        ApiError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Parse(err.to_string())
    }
}

impl ApiError {
    /// Rewrite a non-2xx response into an `Upstream` error when its body
    /// carries a message the network recognizes.
    pub(crate) fn with_upstream_message(self, extract: fn(&serde_json::Value) -> Option<String>) -> Self {
        match self {
            ApiError::Api { status, message } => {
                match serde_json::from_str::<serde_json::Value>(&message)
                    .ok()
                    .as_ref()
                    .and_then(extract)
                {
                    Some(upstream) => ApiError::Upstream(upstream),
                    None => ApiError::Api { status, message },
                }
            }
            other => other,
        }
    }
}
