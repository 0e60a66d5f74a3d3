// Name -> adapter registry with lazily constructed, cached instances.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use socialfeed_common::{Credentials, Item};
use tracing::info;

use crate::error::{FeedError, Result};
use crate::services::{
    FacebookAdapter, InstagramAdapter, ServiceAdapter, ServiceContext, TwitterAdapter,
};

/// Builds a fresh adapter instance.
pub type Factory = Arc<dyn Fn() -> Arc<dyn ServiceAdapter> + Send + Sync>;

#[derive(Default)]
pub struct FeedRegistry {
    factories: Mutex<HashMap<String, Factory>>,
    instances: Mutex<HashMap<String, Arc<dyn ServiceAdapter>>>,
}

impl FeedRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in Twitter, Facebook and Instagram adapters,
    /// all sharing `ctx`.
    pub fn with_defaults(ctx: ServiceContext) -> Self {
        let registry = Self::new();

        let c = ctx.clone();
        registry.register("twitter", move || Arc::new(TwitterAdapter::new(c.clone())));
        let c = ctx.clone();
        registry.register("facebook", move || Arc::new(FacebookAdapter::new(c.clone())));
        registry.register("instagram", move || Arc::new(InstagramAdapter::new(ctx.clone())));

        registry
    }

    /// Add or replace a factory. Replacing drops the cached instance, so the
    /// next `get` builds from the new factory.
    pub fn register<F>(&self, name: &str, factory: F)
    where
        F: Fn() -> Arc<dyn ServiceAdapter> + Send + Sync + 'static,
    {
        self.factories
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.to_string(), Arc::new(factory));
        self.instances
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(name);
    }

    /// The cached adapter for `name`, constructed on first use.
    pub fn get(&self, name: &str) -> Result<Arc<dyn ServiceAdapter>> {
        let mut instances = self.instances.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(adapter) = instances.get(name) {
            return Ok(adapter.clone());
        }

        let factory = self
            .factories
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
            .ok_or_else(|| FeedError::NotFound(name.to_string()))?;

        let adapter = factory();
        info!(service = name, "Constructed service adapter");
        instances.insert(name.to_string(), adapter.clone());
        Ok(adapter)
    }

    /// Registered service names, sorted.
    pub fn services(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .factories
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }

    pub fn set_credentials(&self, service: &str, credentials: &Credentials) -> Result<()> {
        self.get(service)?.set_credentials(credentials)
    }

    pub async fn get_feed(&self, service: &str, username: &str) -> Result<Vec<Item>> {
        self.get(service)?.get_feed(username).await
    }

    pub async fn get_item(&self, service: &str, id: &str) -> Result<Item> {
        self.get(service)?.get_item(id).await
    }

    pub async fn get_item_from_url(&self, service: &str, url: &str) -> Result<Item> {
        self.get(service)?.get_item_from_url(url).await
    }
}
