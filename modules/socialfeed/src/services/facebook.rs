// Facebook adapter: page/user feeds and single posts over the Graph API.

use std::sync::LazyLock;

use async_trait::async_trait;
use chrono::DateTime;
use regex::Regex;
use social_api_client::{GraphClient, GraphImage, GraphNode, GraphPost};
use socialfeed_common::{Credentials, Item, Media, Network, User};
use tracing::{debug, info, warn};

use super::{decode_entries, require_keys, ClientSlot, ServiceAdapter, ServiceContext};
use crate::error::{FeedError, Result};

const NAME: &str = "facebook";

const REQUIRED_KEYS: &[&str] = &["app_id", "app_secret"];

static STORY_FBID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[?&]story_fbid=(\d+)").expect("valid regex"));

static STORY_OWNER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[?&]id=(\d+)").expect("valid regex"));

static POSTS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)facebook\.com/([^/?#]+)/posts/(\d+)").expect("valid regex")
});

static VIDEOS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)facebook\.com/.+/videos/(\d+)").expect("valid regex"));

pub struct FacebookAdapter {
    ctx: ServiceContext,
    client: ClientSlot<GraphClient>,
}

impl FacebookAdapter {
    pub fn new(ctx: ServiceContext) -> Self {
        Self {
            ctx,
            client: ClientSlot::new(),
        }
    }

    pub async fn map_post(&self, post: GraphPost) -> Item {
        let mut item = Item::new(Network::Facebook.as_str(), post.id.clone());
        item.created = post.created_time.as_deref().and_then(parse_created_time);
        item.text = post.message.clone();
        item.link = post.link.clone();
        item.user = post.from.as_ref().map(map_user).unwrap_or_default();
        item.media = self.media_for(&post).await;
        self.ctx.finish(item).await
    }

    async fn media_for(&self, post: &GraphPost) -> Media {
        match (post.post_type.as_deref(), &post.object_id, &post.link) {
            (Some("photo"), Some(object_id), _) => Media::image(format!(
                "https://graph.facebook.com/{object_id}/picture?type=normal"
            )),
            (Some("video"), _, Some(link)) => self.ctx.resolver.resolve(link).await,
            _ => post
                .images
                .as_deref()
                .and_then(pick_image)
                .map(|image| Media::image(image.source()))
                .unwrap_or_default(),
        }
    }

    /// `/<owner>/posts/<id>` ids are scoped by the owner's numeric id.
    async fn owner_id(&self, owner: &str) -> Option<String> {
        if owner.chars().all(|c| c.is_ascii_digit()) {
            return Some(owner.to_string());
        }
        let client = self.client.get(NAME).ok()?;
        match client.node(owner).await {
            Ok(node) => Some(node.id),
            Err(e) => {
                debug!(owner, error = %e, "facebook: owner lookup failed");
                None
            }
        }
    }
}

/// The second image when there are at least two (the first is usually a
/// low-resolution or unrelated thumbnail), else the first.
fn pick_image(images: &[GraphImage]) -> Option<&GraphImage> {
    if images.len() >= 2 {
        images.get(1)
    } else {
        images.first()
    }
}

fn map_user(from: &GraphNode) -> User {
    User {
        id: Some(from.id.clone()),
        handle: None,
        name: from.name.clone(),
        image: Some(format!("https://graph.facebook.com/v2.3/{}/picture/", from.id)),
        link: Some(format!("https://facebook.com/profile.php?id={}", from.id)),
    }
}

/// "2015-04-21T12:00:00+0000", RFC 3339 also accepted.
fn parse_created_time(value: &str) -> Option<i64> {
    DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%z")
        .or_else(|_| DateTime::parse_from_rfc3339(value))
        .ok()
        .map(|dt| dt.timestamp())
}

#[async_trait]
impl ServiceAdapter for FacebookAdapter {
    fn name(&self) -> &str {
        NAME
    }

    fn set_credentials(&self, credentials: &Credentials) -> Result<()> {
        let values = require_keys(NAME, REQUIRED_KEYS, credentials)?;
        self.client.set(GraphClient::new(
            self.ctx.transport.clone(),
            values[0],
            values[1],
        ));
        Ok(())
    }

    fn ensure_credentials(&self) -> Result<()> {
        self.client.get(NAME).map(|_| ())
    }

    /// Only posts authored by the user themselves; posts by others on the
    /// user's timeline are dropped.
    async fn get_feed(&self, username: &str) -> Result<Vec<Item>> {
        let client = self.client.get(NAME)?;
        let user = client
            .node(username)
            .await
            .map_err(|e| FeedError::upstream(NAME, e))?;
        let entries = client
            .feed(&user.id)
            .await
            .map_err(|e| FeedError::upstream(NAME, e))?;

        let posts: Vec<GraphPost> = decode_entries(NAME, entries);
        let total = posts.len();
        let mut items = Vec::with_capacity(total);
        for post in posts {
            if post.from.as_ref().map(|f| f.id.as_str()) != Some(user.id.as_str()) {
                continue;
            }
            items.push(self.map_post(post).await);
        }
        if items.len() < total {
            warn!(username, dropped = total - items.len(), "facebook: dropped posts by other authors");
        }
        info!(username, user_id = user.id.as_str(), count = items.len(), "facebook: feed mapped");
        Ok(items)
    }

    async fn get_item(&self, id: &str) -> Result<Item> {
        let client = self.client.get(NAME)?;
        let post = client
            .post(id)
            .await
            .map_err(|e| FeedError::upstream(NAME, e))?;
        Ok(self.map_post(post).await)
    }

    async fn get_id_from_url(&self, url: &str) -> Option<String> {
        if let Some(story) = STORY_FBID_RE.captures(url) {
            let owner = STORY_OWNER_RE.captures(url)?;
            return Some(format!("{}_{}", &owner[1], &story[1]));
        }
        if let Some(caps) = POSTS_RE.captures(url) {
            let owner = self.owner_id(&caps[1]).await?;
            return Some(format!("{}_{}", owner, &caps[2]));
        }
        VIDEOS_RE.captures(url).map(|c| c[1].to_string())
    }
}
