//! Registry dispatch and the item post-processing hook.

use std::io::Cursor;
use std::sync::Arc;

use async_trait::async_trait;
use image::{DynamicImage, GrayImage, ImageOutputFormat, Luma};
use serde_json::json;
use social_api_client::StubTransport;
use socialfeed::{
    Credentials, FeedConfig, FeedError, FeedRegistry, Item, ItemEnricher, ServiceContext,
};

const TWITTER_SHOW: &str = "https://api.twitter.com/1.1/statuses/show.json";

fn twitter_creds() -> Credentials {
    [
        ("consumer_key", "ck"),
        ("consumer_secret", "cs"),
        ("access_token", "at"),
        ("access_token_secret", "ats"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

fn png(img: GrayImage) -> Vec<u8> {
    let mut out = Vec::new();
    DynamicImage::ImageLuma8(img)
        .write_to(&mut Cursor::new(&mut out), ImageOutputFormat::Png)
        .unwrap();
    out
}

fn photo_tweet() -> serde_json::Value {
    json!({
        "id_str": "9",
        "text": "photo",
        "user": {"screen_name": "a"},
        "extended_entities": {"media": [{"media_url_https": "https://pbs.twimg.com/media/p.png"}]}
    })
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

#[test]
fn defaults_register_three_networks() {
    let stub = Arc::new(StubTransport::new());
    let registry = FeedRegistry::with_defaults(ServiceContext::new(stub, &FeedConfig::default()));
    assert_eq!(registry.services(), vec!["facebook", "instagram", "twitter"]);
}

#[test]
fn unknown_service_is_not_found() {
    let stub = Arc::new(StubTransport::new());
    let registry = FeedRegistry::with_defaults(ServiceContext::new(stub, &FeedConfig::default()));
    let err = registry.get("bogus").err().expect("bogus is not registered");
    assert!(matches!(err, FeedError::NotFound(ref name) if name == "bogus"), "{err:?}");
}

#[test]
fn same_adapter_instance_is_returned() {
    let stub = Arc::new(StubTransport::new());
    let registry = FeedRegistry::with_defaults(ServiceContext::new(stub, &FeedConfig::default()));
    let first = registry.get("twitter").unwrap();
    let second = registry.get("twitter").unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(first.name(), "twitter");
}

#[tokio::test]
async fn credentials_persist_on_the_cached_adapter() {
    let stub = Arc::new(StubTransport::new().with_json(TWITTER_SHOW, photo_tweet()));
    let registry = FeedRegistry::with_defaults(ServiceContext::new(
        stub.clone(),
        &FeedConfig::default(),
    ));

    let err = registry.get_item("twitter", "9").await.unwrap_err();
    assert!(matches!(err, FeedError::Credentials(_)), "{err:?}");

    registry.set_credentials("twitter", &twitter_creds()).unwrap();
    let item = registry.get_item("twitter", "9").await.unwrap();
    assert_eq!(item.service, "twitter");
    assert_eq!(item.id, "9");
}

// ---------------------------------------------------------------------------
// Post-processing hook
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_hash_stores_perceptual_hash() {
    let image = png(GrayImage::from_pixel(16, 16, Luma([200])));
    let stub = Arc::new(
        StubTransport::new()
            .with_json(TWITTER_SHOW, photo_tweet())
            .with_bytes("https://pbs.twimg.com/media/p.png", image),
    );
    let config = FeedConfig {
        create_hash: true,
        ..FeedConfig::default()
    };
    let registry = FeedRegistry::with_defaults(ServiceContext::new(stub, &config));
    registry.set_credentials("twitter", &twitter_creds()).unwrap();

    let item = registry.get_item("twitter", "9").await.unwrap();
    assert_eq!(item.media.hash.as_deref(), Some("ffffffffffffffff"));
}

#[tokio::test]
async fn failed_hash_download_leaves_item_unchanged() {
    let stub = Arc::new(
        StubTransport::new()
            .with_json(TWITTER_SHOW, photo_tweet())
            .with_status("https://pbs.twimg.com/media/p.png", 404, "gone"),
    );
    let config = FeedConfig {
        create_hash: true,
        ..FeedConfig::default()
    };
    let registry = FeedRegistry::with_defaults(ServiceContext::new(stub, &config));
    registry.set_credentials("twitter", &twitter_creds()).unwrap();

    let item = registry.get_item("twitter", "9").await.unwrap();
    assert_eq!(item.media.image.as_deref(), Some("https://pbs.twimg.com/media/p.png"));
    assert!(item.media.hash.is_none());
}

struct Tagger;

#[async_trait]
impl ItemEnricher for Tagger {
    async fn enrich(&self, item: &mut Item) -> anyhow::Result<()> {
        item.text = Some(format!("[tagged] {}", item.text.as_deref().unwrap_or_default()));
        Ok(())
    }
}

#[tokio::test]
async fn custom_enricher_runs_on_every_item() {
    let stub = Arc::new(StubTransport::new().with_json(TWITTER_SHOW, photo_tweet()));
    let ctx = ServiceContext::new(stub, &FeedConfig::default()).with_enricher(Arc::new(Tagger));
    let registry = FeedRegistry::with_defaults(ctx);
    registry.set_credentials("twitter", &twitter_creds()).unwrap();

    let item = registry.get_item("twitter", "9").await.unwrap();
    assert_eq!(item.text.as_deref(), Some("[tagged] photo"));
}
