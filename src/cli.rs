use clap::{Parser, Subcommand};
use std::path::PathBuf;

use tubi_addon::types::ItemType;

/// Browse the Tubi catalog through the addon actions
#[derive(Parser)]
#[command(name = "tubi")]
#[command(version, about = "Query the Tubi catalog and print normalized JSON", long_about = None)]
pub struct Cli {
    /// Config file (defaults to $TUBI_CONFIG, then the user config dir)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Region the request is made from
    #[arg(long, global = true)]
    pub region: Option<String>,

    /// Skip the response cache entirely
    #[arg(long, global = true)]
    pub no_cache: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the addon manifest
    Manifest,
    /// List categories, one category's content, or search results
    Directory {
        /// Category id to list
        #[arg(long)]
        id: Option<String>,
        /// Search term; takes precedence over --id
        #[arg(short, long)]
        search: Option<String>,
        /// Offset returned as nextCursor by a previous page
        #[arg(long)]
        cursor: Option<u64>,
    },
    /// Show one movie or series
    Item {
        id: String,
        #[arg(short = 't', long = "type", default_value = "movie")]
        item_type: ItemType,
    },
    /// Manage the response cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Subcommand)]
pub enum CacheAction {
    /// Remove cached responses
    Clear {
        /// Only keys starting with this prefix (e.g. `us|`)
        #[arg(long)]
        prefix: Option<String>,
    },
}
