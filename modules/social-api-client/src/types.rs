use serde::Deserialize;

// --- Twitter (REST v1.1) ---

/// A status from `statuses/user_timeline` or `statuses/show`.
#[derive(Debug, Clone, Deserialize)]
pub struct Tweet {
    pub id: Option<u64>,
    pub id_str: Option<String>,
    pub created_at: Option<String>,
    pub text: Option<String>,
    pub full_text: Option<String>,
    pub user: Option<TwitterUser>,
    pub retweeted_status: Option<Box<Tweet>>,
    pub entities: Option<TweetEntities>,
    pub extended_entities: Option<ExtendedEntities>,
}

impl Tweet {
    pub fn id(&self) -> Option<String> {
        self.id_str
            .clone()
            .or_else(|| self.id.map(|id| id.to_string()))
    }

    pub fn content(&self) -> Option<&str> {
        self.full_text.as_deref().or(self.text.as_deref())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TwitterUser {
    pub id: Option<u64>,
    pub id_str: Option<String>,
    pub screen_name: Option<String>,
    pub name: Option<String>,
    pub profile_image_url_https: Option<String>,
    pub url: Option<String>,
}

impl TwitterUser {
    pub fn id(&self) -> Option<String> {
        self.id_str
            .clone()
            .or_else(|| self.id.map(|id| id.to_string()))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TweetEntities {
    #[serde(default)]
    pub urls: Vec<UrlEntity>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UrlEntity {
    pub url: Option<String>,
    pub expanded_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExtendedEntities {
    #[serde(default)]
    pub media: Vec<MediaEntity>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MediaEntity {
    pub media_url_https: Option<String>,
    #[serde(rename = "type")]
    pub media_type: Option<String>,
}

// --- Facebook Graph API (v2.3) ---

/// Minimal node returned by `/<username>`.
#[derive(Debug, Clone, Deserialize)]
pub struct GraphNode {
    pub id: String,
    pub name: Option<String>,
}

/// One page of a Graph edge such as `/<id>/feed`.
#[derive(Debug, Clone, Deserialize)]
pub struct GraphPage<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphPost {
    pub id: String,
    pub created_time: Option<String>,
    pub message: Option<String>,
    pub link: Option<String>,
    pub from: Option<GraphNode>,
    #[serde(rename = "type")]
    pub post_type: Option<String>,
    pub object_id: Option<String>,
    pub images: Option<Vec<GraphImage>>,
}

/// Entry of a Graph `images` array: either an image object or a bare URL.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum GraphImage {
    Sized {
        source: String,
        width: Option<u32>,
        height: Option<u32>,
    },
    Url(String),
}

impl GraphImage {
    pub fn source(&self) -> &str {
        match self {
            GraphImage::Sized { source, .. } => source,
            GraphImage::Url(url) => url,
        }
    }
}

// --- Instagram (legacy v1 API) ---

#[derive(Debug, Clone, Deserialize)]
pub struct InstagramEnvelope<T> {
    pub meta: InstagramMeta,
    pub data: Option<T>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InstagramMeta {
    pub code: u16,
    pub error_type: Option<String>,
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InstagramUser {
    pub id: String,
    pub username: Option<String>,
    pub full_name: Option<String>,
    pub profile_picture: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InstagramMedia {
    pub id: String,
    #[serde(rename = "type")]
    pub media_type: Option<String>,
    pub created_time: Option<String>,
    pub link: Option<String>,
    pub caption: Option<InstagramCaption>,
    pub user: Option<InstagramUser>,
    pub images: Option<InstagramImages>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InstagramCaption {
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InstagramImages {
    pub standard_resolution: Option<InstagramImage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InstagramImage {
    pub url: String,
}

/// Response of the public `api.instagram.com/oembed` endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct OEmbed {
    pub html: Option<String>,
    pub thumbnail_url: Option<String>,
}
