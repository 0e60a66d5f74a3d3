// Twitter adapter: user timeline and single statuses over REST v1.1.

use std::sync::LazyLock;

use async_trait::async_trait;
use chrono::DateTime;
use regex::Regex;
use social_api_client::{OAuthKeys, Tweet, TwitterClient, TwitterUser};
use socialfeed_common::{Credentials, Item, Media, Network, UrlScan, User};
use tracing::{info, warn};

use super::{decode_entries, require_keys, ClientSlot, ServiceAdapter, ServiceContext};
use crate::error::{FeedError, Result};

const NAME: &str = "twitter";

const REQUIRED_KEYS: &[&str] = &[
    "consumer_key",
    "consumer_secret",
    "access_token",
    "access_token_secret",
];

static STATUS_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:^|[/.])(?:twitter|x)\.com/(?:#!/)?[^/]+/status(?:es)?/(\d+)").expect("valid regex")
});

pub struct TwitterAdapter {
    ctx: ServiceContext,
    client: ClientSlot<TwitterClient>,
}

impl TwitterAdapter {
    pub fn new(ctx: ServiceContext) -> Self {
        Self {
            ctx,
            client: ClientSlot::new(),
        }
    }

    /// Map a status into an item. Retweets are attributed to the original author.
    pub async fn map_tweet(&self, tweet: Tweet) -> Result<Item> {
        let id = tweet
            .id()
            .ok_or_else(|| FeedError::service(NAME, "status without id"))?;
        let mut item = Item::new(Network::Twitter.as_str(), id);

        item.created = tweet.created_at.as_deref().and_then(parse_created_at);
        item.text = tweet.content().map(str::to_string);

        let author = tweet
            .retweeted_status
            .as_ref()
            .and_then(|original| original.user.as_ref())
            .or(tweet.user.as_ref());
        item.user = author.map(map_user).unwrap_or_default();

        // Retweets link to the original status, matching the attributed author.
        let status_id = tweet
            .retweeted_status
            .as_ref()
            .and_then(|original| original.id())
            .unwrap_or_else(|| item.id.clone());
        if let Some(ref handle) = item.user.handle {
            item.link = Some(format!("https://twitter.com/{handle}/status/{status_id}"));
        }

        item.media = self.media_for(&tweet).await;
        Ok(self.ctx.finish(item).await)
    }

    /// Attached photo first; otherwise the link entities, via the resolver.
    async fn media_for(&self, tweet: &Tweet) -> Media {
        let attached = tweet
            .extended_entities
            .as_ref()
            .and_then(|e| e.media.first())
            .and_then(|m| m.media_url_https.clone());
        if let Some(image) = attached {
            return Media::image(image);
        }

        let urls = tweet
            .entities
            .as_ref()
            .map(|e| e.urls.as_slice())
            .unwrap_or_default();
        for entity in urls {
            let Some(ref url) = entity.expanded_url else {
                continue;
            };
            let media = self.ctx.resolver.resolve(url).await;
            if !media.is_empty() || self.ctx.url_scan == UrlScan::FirstUrl {
                return media;
            }
        }
        Media::default()
    }
}

fn map_user(user: &TwitterUser) -> User {
    User {
        id: user.id(),
        handle: user.screen_name.clone(),
        name: user.name.clone(),
        image: user.profile_image_url_https.clone(),
        link: user
            .screen_name
            .as_ref()
            .map(|handle| format!("https://twitter.com/{handle}")),
    }
}

/// "Wed Aug 27 13:08:45 +0000 2008"
fn parse_created_at(value: &str) -> Option<i64> {
    DateTime::parse_from_str(value, "%a %b %d %H:%M:%S %z %Y")
        .ok()
        .map(|dt| dt.timestamp())
}

#[async_trait]
impl ServiceAdapter for TwitterAdapter {
    fn name(&self) -> &str {
        NAME
    }

    fn set_credentials(&self, credentials: &Credentials) -> Result<()> {
        let values = require_keys(NAME, REQUIRED_KEYS, credentials)?;
        let keys = OAuthKeys {
            consumer_key: values[0].to_string(),
            consumer_secret: values[1].to_string(),
            access_token: values[2].to_string(),
            access_token_secret: values[3].to_string(),
        };
        self.client
            .set(TwitterClient::new(self.ctx.transport.clone(), keys));
        Ok(())
    }

    fn ensure_credentials(&self) -> Result<()> {
        self.client.get(NAME).map(|_| ())
    }

    async fn get_feed(&self, username: &str) -> Result<Vec<Item>> {
        let client = self.client.get(NAME)?;
        let entries = client
            .user_timeline(username)
            .await
            .map_err(|e| FeedError::upstream(NAME, e))?;

        let tweets: Vec<Tweet> = decode_entries(NAME, entries);
        let mut items = Vec::with_capacity(tweets.len());
        for tweet in tweets {
            match self.map_tweet(tweet).await {
                Ok(item) => items.push(item),
                Err(e) => warn!(username, error = %e, "Skipping unmappable status"),
            }
        }
        info!(username, count = items.len(), "twitter: feed mapped");
        Ok(items)
    }

    async fn get_item(&self, id: &str) -> Result<Item> {
        let client = self.client.get(NAME)?;
        let tweet = client
            .show_status(id)
            .await
            .map_err(|e| FeedError::upstream(NAME, e))?;
        self.map_tweet(tweet).await
    }

    async fn get_id_from_url(&self, url: &str) -> Option<String> {
        STATUS_URL_RE.captures(url).map(|c| c[1].to_string())
    }
}
