mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use cli::{CacheAction, Cli, Commands};
use tubi_addon::config::Config;
use tubi_addon::types::{DirectoryRequest, Ids, ItemRequest};
use tubi_addon::Tubi;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(region) = &cli.region {
        config.region = region.to_ascii_lowercase();
    }
    if cli.no_cache {
        config.cache_enabled = false;
    }

    let tubi = Tubi::connect(&config).await.context("initializing addon runtime")?;

    match cli.command {
        Commands::Manifest => print_json(tubi.manifest()),
        Commands::Directory { id, search, cursor } => {
            let req = DirectoryRequest { region: config.region.clone(), search, id, cursor };
            let res = tubi.directory(&req).await.context("directory action failed")?;
            print_json(&res)
        }
        Commands::Item { id, item_type } => {
            let req = ItemRequest { region: config.region.clone(), item_type, ids: Ids::new(id) };
            let res = tubi.item(&req).await.context("item action failed")?;
            print_json(&res)
        }
        Commands::Cache { action: CacheAction::Clear { prefix } } => {
            let removed = tubi.clear_cache_prefix(prefix.as_deref()).await?;
            println!("Removed {removed} cached responses");
            Ok(())
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
