// Instagram adapter: recent media via the legacy v1 API.

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use social_api_client::{InstagramClient, InstagramMedia, InstagramUser};
use socialfeed_common::{Credentials, Item, Media, Network, User, Video, VideoService};
use tracing::{debug, info, warn};

use super::{decode_entries, require_keys, ClientSlot, ServiceAdapter, ServiceContext};
use crate::error::{FeedError, Result};

const NAME: &str = "instagram";

const REQUIRED_KEYS: &[&str] = &["client_id", "client_secret"];

static SHORTCODE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:^|[/.])instagram\.com/p/([a-z0-9_-]+)").expect("valid regex")
});

pub struct InstagramAdapter {
    ctx: ServiceContext,
    client: ClientSlot<InstagramClient>,
}

impl InstagramAdapter {
    pub fn new(ctx: ServiceContext) -> Self {
        Self {
            ctx,
            client: ClientSlot::new(),
        }
    }

    pub async fn map_media(&self, media: InstagramMedia) -> Item {
        let mut item = Item::new(Network::Instagram.as_str(), media.id.clone());
        item.created = media
            .created_time
            .as_deref()
            .and_then(|t| t.trim().parse::<i64>().ok());
        item.text = media.caption.as_ref().and_then(|c| c.text.clone());
        item.link = media.link.clone();
        item.user = media.user.as_ref().map(map_user).unwrap_or_default();
        item.media = media_for(&media);
        self.ctx.finish(item).await
    }
}

fn media_for(media: &InstagramMedia) -> Media {
    let url = media
        .images
        .as_ref()
        .and_then(|i| i.standard_resolution.as_ref())
        .map(|r| r.url.clone());

    match (media.media_type.as_deref(), url) {
        (Some("video"), url) => {
            let mut video = Video::new(VideoService::Instagram, media.id.clone());
            video.image = url;
            Media::video(video)
        }
        (_, Some(url)) => Media::image(url),
        (_, None) => Media::default(),
    }
}

fn map_user(user: &InstagramUser) -> User {
    User {
        id: Some(user.id.clone()),
        handle: user.username.clone(),
        name: user.full_name.clone(),
        image: user.profile_picture.clone(),
        link: user
            .username
            .as_ref()
            .map(|name| format!("https://instagram.com/{name}")),
    }
}

/// Exact (case-insensitive) username match, else the first hit.
fn pick_user<'a>(username: &str, candidates: &'a [InstagramUser]) -> Option<&'a InstagramUser> {
    candidates
        .iter()
        .find(|u| {
            u.username
                .as_deref()
                .is_some_and(|name| name.eq_ignore_ascii_case(username))
        })
        .or_else(|| candidates.first())
}

#[async_trait]
impl ServiceAdapter for InstagramAdapter {
    fn name(&self) -> &str {
        NAME
    }

    fn set_credentials(&self, credentials: &Credentials) -> Result<()> {
        let values = require_keys(NAME, REQUIRED_KEYS, credentials)?;
        self.client
            .set(InstagramClient::new(self.ctx.transport.clone(), values[0]));
        Ok(())
    }

    fn ensure_credentials(&self) -> Result<()> {
        self.client.get(NAME).map(|_| ())
    }

    async fn get_feed(&self, username: &str) -> Result<Vec<Item>> {
        let client = self.client.get(NAME)?;
        let candidates = client
            .search_users(username)
            .await
            .map_err(|e| FeedError::upstream(NAME, e))?;
        let user = pick_user(username, &candidates)
            .ok_or_else(|| FeedError::service(NAME, format!("no user named {username}")))?;
        if !user
            .username
            .as_deref()
            .is_some_and(|name| name.eq_ignore_ascii_case(username))
        {
            warn!(username, picked = user.id.as_str(), "instagram: no exact username match, using first result");
        }

        let entries = client
            .recent_media(&user.id)
            .await
            .map_err(|e| FeedError::upstream(NAME, e))?;

        let posts: Vec<InstagramMedia> = decode_entries(NAME, entries);
        let mut items = Vec::with_capacity(posts.len());
        for post in posts {
            items.push(self.map_media(post).await);
        }
        info!(username, user_id = user.id.as_str(), count = items.len(), "instagram: feed mapped");
        Ok(items)
    }

    async fn get_item(&self, id: &str) -> Result<Item> {
        let client = self.client.get(NAME)?;
        let media = client
            .media(id)
            .await
            .map_err(|e| FeedError::upstream(NAME, e))?;
        Ok(self.map_media(media).await)
    }

    async fn get_id_from_url(&self, url: &str) -> Option<String> {
        let shortcode = SHORTCODE_RE.captures(url).map(|c| c[1].to_string())?;
        let client = self.client.get(NAME).ok()?;
        match client.media_by_shortcode(&shortcode).await {
            Ok(media) => Some(media.id),
            Err(e) => {
                debug!(shortcode = shortcode.as_str(), error = %e, "instagram: shortcode lookup failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use social_api_client::{InstagramImage, InstagramImages};

    fn user(id: &str, username: &str) -> InstagramUser {
        InstagramUser {
            id: id.into(),
            username: Some(username.into()),
            full_name: None,
            profile_picture: None,
        }
    }

    fn media(kind: &str) -> InstagramMedia {
        InstagramMedia {
            id: "99_1".into(),
            media_type: Some(kind.into()),
            created_time: Some("1429617600".into()),
            link: None,
            caption: None,
            user: None,
            images: Some(InstagramImages {
                standard_resolution: Some(InstagramImage {
                    url: "https://cdn.example/std.jpg".into(),
                }),
            }),
        }
    }

    #[test]
    fn exact_username_wins_over_first_result() {
        let found = [user("1", "snoopdoggy"), user("2", "SnoopDogg")];
        assert_eq!(pick_user("snoopdogg", &found).map(|u| u.id.as_str()), Some("2"));
    }

    #[test]
    fn falls_back_to_first_result() {
        let found = [user("1", "snoopdoggy"), user("2", "snoop_fan")];
        assert_eq!(pick_user("snoopdogg", &found).map(|u| u.id.as_str()), Some("1"));
        assert!(pick_user("snoopdogg", &[]).is_none());
    }

    #[test]
    fn video_posts_become_instagram_videos() {
        let mapped = media_for(&media("video"));
        let video = mapped.video.expect("video");
        assert_eq!(video.service, VideoService::Instagram);
        assert_eq!(video.id, "99_1");
        assert_eq!(video.image.as_deref(), Some("https://cdn.example/std.jpg"));
        assert!(mapped.image.is_none());
    }

    #[test]
    fn video_without_images_keeps_the_video() {
        let mut post = media("video");
        post.images = None;
        let mapped = media_for(&post);
        let video = mapped.video.expect("video");
        assert_eq!(video.id, "99_1");
        assert!(video.image.is_none());
    }

    #[test]
    fn image_posts_use_standard_resolution() {
        let mapped = media_for(&media("image"));
        assert_eq!(mapped.image.as_deref(), Some("https://cdn.example/std.jpg"));
        assert!(mapped.video.is_none());
    }

    #[test]
    fn shortcode_pattern() {
        let code = |url: &str| SHORTCODE_RE.captures(url).map(|c| c[1].to_string());
        assert_eq!(code("https://instagram.com/p/BxF-a_9/").as_deref(), Some("BxF-a_9"));
        assert_eq!(code("https://www.instagram.com/p/abc123").as_deref(), Some("abc123"));
        assert_eq!(code("https://instagram.com/snoopdogg"), None);
    }
}
