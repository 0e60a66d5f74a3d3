pub mod config;
pub mod types;

pub use config::{credentials_from_env, Credentials, FeedConfig, UrlScan};
pub use types::*;
