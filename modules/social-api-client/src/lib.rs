pub mod error;
pub mod graph;
pub mod instagram;
pub mod oauth;
pub mod transport;
pub mod twitter;
pub mod types;

#[cfg(feature = "test-support")]
pub mod stub;

pub use error::{ApiError, Result};
pub use graph::GraphClient;
pub use instagram::InstagramClient;
pub use oauth::OAuthKeys;
pub use transport::{fetch_json, ApiRequest, ReqwestTransport, Transport};
pub use twitter::TwitterClient;
pub use types::{
    ExtendedEntities, GraphImage, GraphNode, GraphPage, GraphPost, InstagramCaption,
    InstagramEnvelope, InstagramImage, InstagramImages, InstagramMedia, InstagramMeta,
    InstagramUser, MediaEntity, OEmbed, Tweet, TweetEntities, TwitterUser, UrlEntity,
};

#[cfg(feature = "test-support")]
pub use stub::StubTransport;
