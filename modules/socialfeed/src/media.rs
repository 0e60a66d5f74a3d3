// Media resolution: classify a link against known video/image hosts and
// build a media descriptor. Vine and Instagram links need a secondary
// lookup; those are best-effort and bounded by `lookup_timeout`.

use std::sync::{Arc, LazyLock};
use std::time::Duration;

use regex::Regex;
use social_api_client::{fetch_json, ApiRequest, OEmbed, Transport};
use socialfeed_common::{Media, Video, VideoService};
use tracing::debug;

static VINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)vine\.co/v/([a-z0-9]+)").expect("valid regex"));

static YOUTUBE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)(?:youtube\.com/(?:[^/]+/.+/|(?:v|e(?:mbed)?)/|.*[?&]v=)|youtu\.be/)([^"&?/ ]{11})"#,
    )
    .expect("valid regex")
});

static VIMEO_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)https?://(?:www\.|player\.)?vimeo\.com/(?:channels/(?:\w+/)?|groups/(?:[^/]*)/videos/|album/(?:\d+)/video/|video/|)(\d+)(?:$|/|\?)",
    )
    .expect("valid regex")
});

static INSTAGRAM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)instagram\.com/p/([a-z0-9_-]+)/").expect("valid regex"));

static FACEBOOK_VIDEO_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)facebook\.com/.+/videos/([0-9]+)(?:/|\?|$)").expect("valid regex")
});

static OG_IMAGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"property="og:image" content="(.*?)""#).expect("valid regex")
});

const VINE_PAGE: &str = "https://vine.co/v";
const INSTAGRAM_OEMBED: &str = "https://api.instagram.com/oembed";

/// Which host a link points at. Determined from the string alone (no HTTP).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaLink {
    Vine { id: String },
    Youtube { id: String },
    Vimeo { id: String },
    Instagram { shortcode: String },
    Facebook { id: String },
}

/// Match `url` against the provider patterns in priority order.
pub fn classify(url: &str) -> Option<MediaLink> {
    if let Some(id) = first_capture(&VINE_RE, url) {
        return Some(MediaLink::Vine { id });
    }
    if let Some(id) = first_capture(&YOUTUBE_RE, url) {
        return Some(MediaLink::Youtube { id });
    }
    if let Some(id) = first_capture(&VIMEO_RE, url) {
        return Some(MediaLink::Vimeo { id });
    }
    if let Some(shortcode) = first_capture(&INSTAGRAM_RE, url) {
        return Some(MediaLink::Instagram { shortcode });
    }
    if let Some(id) = first_capture(&FACEBOOK_VIDEO_RE, url) {
        return Some(MediaLink::Facebook { id });
    }
    None
}

fn first_capture(re: &Regex, haystack: &str) -> Option<String> {
    re.captures(haystack).map(|c| c[1].to_string())
}

pub fn youtube_thumbnail(id: &str) -> String {
    format!("https://img.youtube.com/vi/{id}/hqdefault.jpg")
}

pub fn facebook_video_thumbnail(id: &str) -> String {
    format!("https://graph.facebook.com/{id}/picture?type=large")
}

pub struct MediaResolver {
    transport: Arc<dyn Transport>,
    lookup_timeout: Duration,
}

impl MediaResolver {
    pub fn new(transport: Arc<dyn Transport>, lookup_timeout: Duration) -> Self {
        Self {
            transport,
            lookup_timeout,
        }
    }

    /// Resolve a link into a media descriptor. Never fails: unknown links
    /// and failed lookups produce empty or partial media.
    pub async fn resolve(&self, url: &str) -> Media {
        let Some(link) = classify(url) else {
            return Media::default();
        };

        match link {
            MediaLink::Vine { id } => {
                let image = self.vine_thumbnail(&id).await;
                Media::video(Video {
                    service: VideoService::Vine,
                    id,
                    image,
                })
            }
            MediaLink::Youtube { id } => {
                let image = youtube_thumbnail(&id);
                Media::video(Video::new(VideoService::Youtube, id).with_image(image))
            }
            MediaLink::Vimeo { id } => Media::video(Video::new(VideoService::Vimeo, id)),
            MediaLink::Instagram { shortcode } => self.instagram_media(url, shortcode).await,
            MediaLink::Facebook { id } => {
                let image = facebook_video_thumbnail(&id);
                Media::video(Video::new(VideoService::Facebook, id).with_image(image))
            }
        }
    }

    /// Scrape the `og:image` meta tag from the Vine page.
    async fn vine_thumbnail(&self, id: &str) -> Option<String> {
        let request = ApiRequest::get(format!("{VINE_PAGE}/{id}"));
        let page = match tokio::time::timeout(self.lookup_timeout, self.transport.send(request))
            .await
        {
            Ok(Ok(body)) => String::from_utf8_lossy(&body).into_owned(),
            Ok(Err(e)) => {
                debug!(id, error = %e, "vine page lookup failed");
                return None;
            }
            Err(_) => {
                debug!(id, "vine page lookup timed out");
                return None;
            }
        };

        first_capture(&OG_IMAGE_RE, &page).filter(|s| !s.is_empty())
    }

    /// Ask oEmbed whether the post is a video; photos only contribute an image.
    async fn instagram_media(&self, url: &str, shortcode: String) -> Media {
        let request = ApiRequest::get(INSTAGRAM_OEMBED).query("url", url);
        let lookup = fetch_json::<OEmbed>(self.transport.as_ref(), request);
        let embed = match tokio::time::timeout(self.lookup_timeout, lookup).await {
            Ok(Ok(embed)) => embed,
            Ok(Err(e)) => {
                debug!(shortcode = shortcode.as_str(), error = %e, "instagram oembed lookup failed");
                return Media::default();
            }
            Err(_) => {
                debug!(shortcode = shortcode.as_str(), "instagram oembed lookup timed out");
                return Media::default();
            }
        };

        let is_video = embed.html.as_deref().is_some_and(|h| h.contains("video"));
        if is_video {
            Media::video(Video {
                service: VideoService::Instagram,
                id: shortcode,
                image: embed.thumbnail_url,
            })
        } else {
            Media {
                image: embed.thumbnail_url,
                ..Media::default()
            }
        }
    }
}
