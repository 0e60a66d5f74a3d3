use social_api_client::ApiError;

/// Result type alias for feed operations.
pub type Result<T> = std::result::Result<T, FeedError>;

#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    /// A required credential key is missing, or no credentials were set.
    #[error("Credentials error: {0}")]
    Credentials(String),

    #[error("Service {service} reports error: {message}")]
    Service { service: String, message: String },

    #[error("Service not found: {0}")]
    NotFound(String),

    #[error("No {service} post id found in {url}")]
    UnresolvableUrl { service: String, url: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FeedError {
    pub fn service(service: &str, message: impl Into<String>) -> Self {
        FeedError::Service {
            service: service.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn upstream(service: &str, err: ApiError) -> Self {
        FeedError::service(service, err.to_string())
    }
}
