use anyhow::Result;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use socialfeed::{FeedRegistry, ServiceContext};
use socialfeed_common::{credentials_from_env, FeedConfig};

#[derive(Parser)]
#[command(name = "socialfeed", about = "Fetch social posts as normalized JSON")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Recent posts of a user
    Feed { service: String, username: String },
    /// A single post by its network id
    Item { service: String, id: String },
    /// A single post by its permalink
    Url { service: String, url: String },
    /// Resolve a link into a media descriptor (no credentials needed)
    Media { url: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Logs go to stderr; stdout is reserved for JSON output
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("socialfeed=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = FeedConfig::from_env();
    config.log_redacted();
    let ctx = ServiceContext::from_config(&config)?;

    let resolver = ctx.resolver.clone();
    let registry = FeedRegistry::with_defaults(ctx);
    for (network, credentials) in credentials_from_env() {
        match registry.set_credentials(network.as_str(), &credentials) {
            Ok(()) => info!(service = network.as_str(), "Credentials loaded"),
            Err(e) => warn!(service = network.as_str(), error = %e, "Ignoring incomplete credentials"),
        }
    }

    match cli.command {
        Command::Feed { service, username } => {
            let items = registry.get_feed(&service, &username).await?;
            info!(service = service.as_str(), username = username.as_str(), count = items.len(), "Feed fetched");
            print_json(&items)
        }
        Command::Item { service, id } => print_json(&registry.get_item(&service, &id).await?),
        Command::Url { service, url } => {
            print_json(&registry.get_item_from_url(&service, &url).await?)
        }
        Command::Media { url } => print_json(&resolver.resolve(&url).await),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
