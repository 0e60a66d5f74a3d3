use std::collections::HashMap;
use std::env;
use std::time::Duration;

use tracing::info;

use crate::types::Network;

/// Raw credential map handed to an adapter; required keys depend on the network.
pub type Credentials = HashMap<String, String>;

/// How many of a post's link entities are tried for media.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UrlScan {
    /// Only the first link is resolved, whatever it yields.
    FirstUrl,
    /// Links are resolved in order until one yields an image or a video.
    #[default]
    UntilMatch,
}

impl UrlScan {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "first_url" | "first" => Some(UrlScan::FirstUrl),
            "until_match" | "all" => Some(UrlScan::UntilMatch),
            _ => None,
        }
    }
}

/// Runtime settings loaded from environment variables.
#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// Run the perceptual-hash hook on every mapped item.
    pub create_hash: bool,
    /// Upper bound for every upstream HTTP request.
    pub http_timeout: Duration,
    /// Upper bound for best-effort lookups (Vine page, oEmbed, hash download).
    pub lookup_timeout: Duration,
    pub url_scan: UrlScan,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            create_hash: false,
            http_timeout: Duration::from_secs(10),
            lookup_timeout: Duration::from_secs(5),
            url_scan: UrlScan::default(),
        }
    }
}

impl FeedConfig {
    /// Load from environment variables, falling back to defaults for
    /// unset or unparseable values.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            create_hash: env::var("SOCIALFEED_CREATE_HASH")
                .ok()
                .and_then(|v| parse_bool(&v))
                .unwrap_or(defaults.create_hash),
            http_timeout: secs_env("SOCIALFEED_HTTP_TIMEOUT_SECS").unwrap_or(defaults.http_timeout),
            lookup_timeout: secs_env("SOCIALFEED_LOOKUP_TIMEOUT_SECS")
                .unwrap_or(defaults.lookup_timeout),
            url_scan: env::var("SOCIALFEED_URL_SCAN")
                .ok()
                .and_then(|v| UrlScan::parse(&v))
                .unwrap_or(defaults.url_scan),
        }
    }

    pub fn log_redacted(&self) {
        info!(
            create_hash = self.create_hash,
            http_timeout_secs = self.http_timeout.as_secs(),
            lookup_timeout_secs = self.lookup_timeout.as_secs(),
            url_scan = ?self.url_scan,
            "Feed config loaded"
        );
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn secs_env(key: &str) -> Option<Duration> {
    env::var(key)
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .filter(|s| *s > 0)
        .map(Duration::from_secs)
}

/// Env variable → credential key, per network.
const CREDENTIAL_VARS: &[(Network, &str, &str)] = &[
    (Network::Twitter, "TWITTER_CONSUMER_KEY", "consumer_key"),
    (Network::Twitter, "TWITTER_CONSUMER_SECRET", "consumer_secret"),
    (Network::Twitter, "TWITTER_ACCESS_TOKEN", "access_token"),
    (Network::Twitter, "TWITTER_ACCESS_TOKEN_SECRET", "access_token_secret"),
    (Network::Facebook, "FACEBOOK_APP_ID", "app_id"),
    (Network::Facebook, "FACEBOOK_APP_SECRET", "app_secret"),
    (Network::Instagram, "INSTAGRAM_CLIENT_ID", "client_id"),
    (Network::Instagram, "INSTAGRAM_CLIENT_SECRET", "client_secret"),
];

/// Collect credential maps from the environment. A network appears only
/// when at least one of its variables is set; completeness is checked
/// later by the adapter.
pub fn credentials_from_env() -> HashMap<Network, Credentials> {
    let mut out: HashMap<Network, Credentials> = HashMap::new();
    for (network, var, key) in CREDENTIAL_VARS {
        if let Ok(value) = env::var(var) {
            out.entry(*network)
                .or_default()
                .insert(key.to_string(), value);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const VARS: &[&str] = &[
        "SOCIALFEED_CREATE_HASH",
        "SOCIALFEED_HTTP_TIMEOUT_SECS",
        "SOCIALFEED_LOOKUP_TIMEOUT_SECS",
        "SOCIALFEED_URL_SCAN",
    ];

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
        for (_, var, _) in CREDENTIAL_VARS {
            env::remove_var(var);
        }
    }

    #[serial_test::serial]
    #[test]
    fn defaults_when_env_is_empty() {
        clear_env();
        let config = FeedConfig::from_env();
        assert!(!config.create_hash);
        assert_eq!(config.http_timeout, Duration::from_secs(10));
        assert_eq!(config.lookup_timeout, Duration::from_secs(5));
        assert_eq!(config.url_scan, UrlScan::UntilMatch);
    }

    #[serial_test::serial]
    #[test]
    fn reads_overrides_and_ignores_garbage() {
        clear_env();
        env::set_var("SOCIALFEED_CREATE_HASH", "yes");
        env::set_var("SOCIALFEED_HTTP_TIMEOUT_SECS", "3");
        env::set_var("SOCIALFEED_LOOKUP_TIMEOUT_SECS", "soon");
        env::set_var("SOCIALFEED_URL_SCAN", "first_url");

        let config = FeedConfig::from_env();
        assert!(config.create_hash);
        assert_eq!(config.http_timeout, Duration::from_secs(3));
        assert_eq!(config.lookup_timeout, Duration::from_secs(5));
        assert_eq!(config.url_scan, UrlScan::FirstUrl);
        clear_env();
    }

    #[serial_test::serial]
    #[test]
    fn credentials_grouped_by_network() {
        clear_env();
        env::set_var("TWITTER_CONSUMER_KEY", "ck");
        env::set_var("TWITTER_ACCESS_TOKEN", "at");
        env::set_var("FACEBOOK_APP_ID", "42");

        let creds = credentials_from_env();
        assert_eq!(creds.len(), 2);
        let twitter = &creds[&Network::Twitter];
        assert_eq!(twitter.get("consumer_key").map(String::as_str), Some("ck"));
        assert_eq!(twitter.get("access_token").map(String::as_str), Some("at"));
        assert!(!twitter.contains_key("consumer_secret"));
        assert_eq!(
            creds[&Network::Facebook].get("app_id").map(String::as_str),
            Some("42")
        );
        assert!(!creds.contains_key(&Network::Instagram));
        clear_env();
    }
}
