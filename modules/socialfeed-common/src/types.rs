use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// --- Networks ---

/// Built-in social networks. Third-party adapters register under their
/// own names, so `Item::service` stays a plain string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Twitter,
    Facebook,
    Instagram,
}

impl Network {
    pub const ALL: [Network; 3] = [Network::Twitter, Network::Facebook, Network::Instagram];

    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Twitter => "twitter",
            Network::Facebook => "facebook",
            Network::Instagram => "instagram",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown network: {0}")]
pub struct UnknownNetwork(pub String);

impl FromStr for Network {
    type Err = UnknownNetwork;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "twitter" => Ok(Network::Twitter),
            "facebook" => Ok(Network::Facebook),
            "instagram" => Ok(Network::Instagram),
            _ => Err(UnknownNetwork(s.to_string())),
        }
    }
}

// --- Media ---

/// Video host a link resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoService {
    Youtube,
    Vimeo,
    Vine,
    Instagram,
    Facebook,
}

impl VideoService {
    pub fn as_str(&self) -> &'static str {
        match self {
            VideoService::Youtube => "youtube",
            VideoService::Vimeo => "vimeo",
            VideoService::Vine => "vine",
            VideoService::Instagram => "instagram",
            VideoService::Facebook => "facebook",
        }
    }
}

impl fmt::Display for VideoService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An embedded video. Service and id are always both known.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Video {
    pub service: VideoService,
    pub id: String,
    /// Thumbnail URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl Video {
    pub fn new(service: VideoService, id: impl Into<String>) -> Self {
        Self {
            service,
            id: id.into(),
            image: None,
        }
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }
}

/// A post's single media attachment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Media {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video: Option<Video>,
    /// Perceptual hash of the media image, 16 hex digits.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
}

impl Media {
    pub fn image(url: impl Into<String>) -> Self {
        Self {
            image: Some(url.into()),
            ..Self::default()
        }
    }

    pub fn video(video: Video) -> Self {
        Self {
            video: Some(video),
            ..Self::default()
        }
    }

    /// True when neither an image nor a video was found.
    pub fn is_empty(&self) -> bool {
        self.image.is_none() && self.video.is_none()
    }

    /// The picture that best represents this media: the image, else the
    /// video thumbnail.
    pub fn preview_image(&self) -> Option<&str> {
        self.image
            .as_deref()
            .or_else(|| self.video.as_ref().and_then(|v| v.image.as_deref()))
    }
}

// --- Posts ---

/// Author of a post, as the network describes them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Avatar URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Profile URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

impl User {
    pub fn is_empty(&self) -> bool {
        self == &User::default()
    }
}

/// A post normalized across networks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub service: String,
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Permalink.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    /// Unix seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<i64>,
    #[serde(default, skip_serializing_if = "User::is_empty")]
    pub user: User,
    #[serde(default, skip_serializing_if = "media_is_unset")]
    pub media: Media,
}

fn media_is_unset(media: &Media) -> bool {
    media.is_empty() && media.hash.is_none()
}

impl Item {
    pub fn new(service: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            id: id.into(),
            text: None,
            link: None,
            created: None,
            user: User::default(),
            media: Media::default(),
        }
    }
}
