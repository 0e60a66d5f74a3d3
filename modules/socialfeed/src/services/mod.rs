// Per-network adapters. Each adapter owns its credentials and upstream
// client, fetches raw payloads through the shared transport and maps
// them into the unified item model.

pub mod facebook;
pub mod instagram;
pub mod twitter;

use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use social_api_client::{ReqwestTransport, Transport};
use socialfeed_common::{Credentials, FeedConfig, Item, UrlScan};
use tracing::warn;

use crate::enrichment::{ItemEnricher, PerceptualHasher};
use crate::error::{FeedError, Result};
use crate::media::MediaResolver;

pub use facebook::FacebookAdapter;
pub use instagram::InstagramAdapter;
pub use twitter::TwitterAdapter;

/// Unified fetch/map contract, one implementation per network.
#[async_trait]
pub trait ServiceAdapter: Send + Sync {
    /// Registry name, e.g. "twitter".
    fn name(&self) -> &str;

    /// Validate and store credentials. Fails naming the first missing key.
    fn set_credentials(&self, credentials: &Credentials) -> Result<()>;

    /// A single page of the user's recent posts.
    async fn get_feed(&self, username: &str) -> Result<Vec<Item>>;

    async fn get_item(&self, id: &str) -> Result<Item>;

    /// Fails with `FeedError::Credentials` until credentials are set.
    fn ensure_credentials(&self) -> Result<()>;

    /// Network-native post id from a permalink. Best-effort: lookup
    /// failures yield `None`.
    async fn get_id_from_url(&self, url: &str) -> Option<String>;

    async fn get_item_from_url(&self, url: &str) -> Result<Item> {
        self.ensure_credentials()?;
        match self.get_id_from_url(url).await {
            Some(id) => self.get_item(&id).await,
            None => Err(FeedError::UnresolvableUrl {
                service: self.name().to_string(),
                url: url.to_string(),
            }),
        }
    }
}

/// Collaborators shared by every adapter.
#[derive(Clone)]
pub struct ServiceContext {
    pub transport: Arc<dyn Transport>,
    pub resolver: Arc<MediaResolver>,
    pub enricher: Option<Arc<dyn ItemEnricher>>,
    pub url_scan: UrlScan,
}

impl ServiceContext {
    /// Build around an existing transport. The perceptual hasher is wired
    /// in when `create_hash` is on.
    pub fn new(transport: Arc<dyn Transport>, config: &FeedConfig) -> Self {
        let resolver = Arc::new(MediaResolver::new(transport.clone(), config.lookup_timeout));
        let enricher: Option<Arc<dyn ItemEnricher>> = if config.create_hash {
            Some(Arc::new(PerceptualHasher::new(
                transport.clone(),
                config.lookup_timeout,
            )))
        } else {
            None
        };

        Self {
            transport,
            resolver,
            enricher,
            url_scan: config.url_scan,
        }
    }

    /// Build with the production `reqwest` transport.
    pub fn from_config(config: &FeedConfig) -> Result<Self> {
        let transport = ReqwestTransport::new(config.http_timeout)
            .map_err(|e| FeedError::Other(anyhow::Error::new(e)))?;
        Ok(Self::new(Arc::new(transport), config))
    }

    pub fn with_enricher(mut self, enricher: Arc<dyn ItemEnricher>) -> Self {
        self.enricher = Some(enricher);
        self
    }

    /// Run the post-processing hook, if any.
    pub async fn finish(&self, mut item: Item) -> Item {
        if let Some(ref enricher) = self.enricher {
            if let Err(e) = enricher.enrich(&mut item).await {
                warn!(service = item.service.as_str(), id = item.id.as_str(), error = %e, "Item enrichment failed");
            }
        }
        item
    }
}

/// Credentials-dependent upstream client, replaced on every successful
/// `set_credentials`.
pub(crate) struct ClientSlot<C> {
    inner: RwLock<Option<Arc<C>>>,
}

impl<C> ClientSlot<C> {
    pub(crate) fn new() -> Self {
        Self {
            inner: RwLock::new(None),
        }
    }

    pub(crate) fn set(&self, client: C) {
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(client));
    }

    pub(crate) fn get(&self, service: &str) -> Result<Arc<C>> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or_else(|| FeedError::Credentials(format!("Missing credentials for service {service}")))
    }
}

/// Return the value of every required key, in order, or fail on the first
/// missing one.
pub(crate) fn require_keys<'a>(
    service: &str,
    keys: &[&str],
    credentials: &'a Credentials,
) -> Result<Vec<&'a str>> {
    keys.iter()
        .map(|key| {
            credentials
                .get(*key)
                .map(String::as_str)
                .ok_or_else(|| FeedError::Credentials(format!("Missing credential {key} in {service}")))
        })
        .collect()
}

/// Decode raw feed entries, skipping (and logging) those that don't fit
/// the network's payload type.
pub(crate) fn decode_entries<T: DeserializeOwned>(
    service: &str,
    entries: Vec<serde_json::Value>,
) -> Vec<T> {
    entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| match serde_json::from_value(entry) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                warn!(service, index, error = %e, "Skipping undecodable feed entry");
                None
            }
        })
        .collect()
}
