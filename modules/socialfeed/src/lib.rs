pub mod enrichment;
pub mod error;
pub mod media;
pub mod registry;
pub mod services;

pub use enrichment::{average_hash, ItemEnricher, PerceptualHasher};
pub use error::{FeedError, Result};
pub use media::{classify, MediaLink, MediaResolver};
pub use registry::{Factory, FeedRegistry};
pub use services::{
    FacebookAdapter, InstagramAdapter, ServiceAdapter, ServiceContext, TwitterAdapter,
};
pub use socialfeed_common::{
    Credentials, FeedConfig, Item, Media, Network, UrlScan, User, Video, VideoService,
};
