//! MediaResolver end-to-end through a stub transport.
//!
//! Deterministic providers must not touch the network; Vine and Instagram
//! lookups are best-effort and degrade to partial or empty media.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use social_api_client::{ApiRequest, StubTransport, Transport};
use socialfeed::{Media, MediaResolver, Video, VideoService};

const LOOKUP_TIMEOUT: Duration = Duration::from_millis(200);

fn resolver(stub: &Arc<StubTransport>) -> MediaResolver {
    MediaResolver::new(stub.clone(), LOOKUP_TIMEOUT)
}

// ---------------------------------------------------------------------------
// Deterministic providers
// ---------------------------------------------------------------------------

#[tokio::test]
async fn youtube_forms_resolve_without_network() {
    let stub = Arc::new(StubTransport::new());
    let resolver = resolver(&stub);

    for url in [
        "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
        "https://youtu.be/dQw4w9WgXcQ",
        "https://www.youtube.com/embed/dQw4w9WgXcQ",
        "https://www.youtube.com/v/dQw4w9WgXcQ",
    ] {
        let media = resolver.resolve(url).await;
        assert_eq!(
            media,
            Media::video(
                Video::new(VideoService::Youtube, "dQw4w9WgXcQ")
                    .with_image("https://img.youtube.com/vi/dQw4w9WgXcQ/hqdefault.jpg")
            ),
            "{url}"
        );
    }
    assert!(stub.requests().is_empty());
}

#[tokio::test]
async fn vimeo_has_no_thumbnail() {
    let stub = Arc::new(StubTransport::new());
    let media = resolver(&stub).resolve("https://vimeo.com/76979871").await;
    assert_eq!(media, Media::video(Video::new(VideoService::Vimeo, "76979871")));
    assert!(stub.requests().is_empty());
}

#[tokio::test]
async fn facebook_video_uses_graph_picture() {
    let stub = Arc::new(StubTransport::new());
    let media = resolver(&stub)
        .resolve("https://facebook.com/someuser/videos/123456789/")
        .await;
    assert_eq!(
        media,
        Media::video(
            Video::new(VideoService::Facebook, "123456789")
                .with_image("https://graph.facebook.com/123456789/picture?type=large")
        )
    );
}

#[tokio::test]
async fn unrecognized_url_is_empty_media() {
    let stub = Arc::new(StubTransport::new());
    let media = resolver(&stub)
        .resolve("https://example.com/2015/04/some-article")
        .await;
    assert!(media.is_empty());
    assert!(stub.requests().is_empty());
}

// ---------------------------------------------------------------------------
// Vine
// ---------------------------------------------------------------------------

#[tokio::test]
async fn vine_thumbnail_is_scraped_from_og_image() {
    let stub = Arc::new(StubTransport::new().with_text(
        "https://vine.co/v/eYxUJ1mKvEp",
        r#"<html><head><meta property="og:image" content="https://v.cdn.vine.co/thumb.jpg"></head></html>"#,
    ));
    let media = resolver(&stub).resolve("https://vine.co/v/eYxUJ1mKvEp").await;
    assert_eq!(
        media,
        Media::video(
            Video::new(VideoService::Vine, "eYxUJ1mKvEp").with_image("https://v.cdn.vine.co/thumb.jpg")
        )
    );
    assert_eq!(stub.requested_urls(), vec!["https://vine.co/v/eYxUJ1mKvEp"]);
}

#[tokio::test]
async fn failed_vine_scrape_still_yields_video() {
    let stub = Arc::new(StubTransport::new().with_network_error("https://vine.co/v/eYxUJ1mKvEp"));
    let media = resolver(&stub).resolve("https://vine.co/v/eYxUJ1mKvEp").await;
    assert_eq!(media, Media::video(Video::new(VideoService::Vine, "eYxUJ1mKvEp")));
}

#[tokio::test]
async fn vine_page_without_og_image_has_no_thumbnail() {
    let stub = Arc::new(
        StubTransport::new().with_text("https://vine.co/v/abc", "<html><body>gone</body></html>"),
    );
    let media = resolver(&stub).resolve("https://vine.co/v/abc").await;
    assert_eq!(media, Media::video(Video::new(VideoService::Vine, "abc")));
}

#[tokio::test]
async fn vine_page_with_invalid_utf8_still_yields_thumbnail() {
    let page = b"<html>\xff\xfe<meta property=\"og:image\" content=\"https://v.cdn.vine.co/t.jpg\"></html>".to_vec();
    let stub = Arc::new(StubTransport::new().with_bytes("https://vine.co/v/abc", page));
    let media = resolver(&stub).resolve("https://vine.co/v/abc").await;
    assert_eq!(
        media,
        Media::video(Video::new(VideoService::Vine, "abc").with_image("https://v.cdn.vine.co/t.jpg"))
    );
}

// ---------------------------------------------------------------------------
// Instagram oEmbed
// ---------------------------------------------------------------------------

const OEMBED: &str = "https://api.instagram.com/oembed";

#[tokio::test]
async fn instagram_video_via_oembed() {
    let stub = Arc::new(StubTransport::new().with_json(
        OEMBED,
        serde_json::json!({
            "html": "<blockquote class=\"instagram-media\" data-instgrm-version=\"4\">video</blockquote>",
            "thumbnail_url": "https://scontent.cdninstagram.com/thumb.jpg"
        }),
    ));
    let url = "https://instagram.com/p/BxF-a_9/";
    let media = resolver(&stub).resolve(url).await;

    assert_eq!(
        media,
        Media::video(
            Video::new(VideoService::Instagram, "BxF-a_9")
                .with_image("https://scontent.cdninstagram.com/thumb.jpg")
        )
    );
    let requests = stub.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].query, vec![("url".to_string(), url.to_string())]);
}

#[tokio::test]
async fn instagram_photo_contributes_only_an_image() {
    let stub = Arc::new(StubTransport::new().with_json(
        OEMBED,
        serde_json::json!({
            "html": "<blockquote class=\"instagram-media\">photo</blockquote>",
            "thumbnail_url": "https://scontent.cdninstagram.com/photo.jpg"
        }),
    ));
    let media = resolver(&stub).resolve("https://instagram.com/p/abc/").await;
    assert_eq!(media, Media::image("https://scontent.cdninstagram.com/photo.jpg"));
}

#[tokio::test]
async fn failed_oembed_is_empty_media() {
    let stub = Arc::new(StubTransport::new().with_status(OEMBED, 404, "No Media Match"));
    let media = resolver(&stub).resolve("https://instagram.com/p/abc/").await;
    assert!(media.is_empty());
}

// ---------------------------------------------------------------------------
// Lookup timeout
// ---------------------------------------------------------------------------

struct SlowTransport;

#[async_trait]
impl Transport for SlowTransport {
    async fn send(&self, _request: ApiRequest) -> social_api_client::Result<Vec<u8>> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok(Vec::new())
    }
}

#[tokio::test]
async fn slow_lookups_are_cut_off() {
    let resolver = MediaResolver::new(Arc::new(SlowTransport), Duration::from_millis(50));

    let started = std::time::Instant::now();
    let vine = resolver.resolve("https://vine.co/v/abc").await;
    let instagram = resolver.resolve("https://instagram.com/p/abc/").await;

    assert_eq!(vine, Media::video(Video::new(VideoService::Vine, "abc")));
    assert!(instagram.is_empty());
    assert!(started.elapsed() < Duration::from_secs(5));
}
