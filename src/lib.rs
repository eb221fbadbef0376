pub mod addon;
pub mod config;
pub mod context;
pub mod db;
pub mod endpoints;
pub mod error;
pub mod handlers;
pub mod http;
pub mod mapping;
pub mod storage;
pub mod title;
pub mod types;
pub mod upstream;

// --- Library API for embedding ---

/// Convenience re-exports for embedders.
pub mod prelude {
    pub use crate::addon::{Addon, AddonManifest};
    pub use crate::context::{ActionContext, CacheKey, CacheOptions, FetchResponse, Ttl};
    pub use crate::error::{Error, Result};
    pub use crate::types::{
        CatalogItem, DirectoryItem, DirectoryRequest, DirectoryResponse, Ids, Images, ItemRequest, ItemType,
        PlayableItem, SeriesEpisode, Source,
    };
    pub use crate::Tubi;
}

use anyhow::Result;
use std::sync::Arc;
use tracing::debug;

use crate::addon::{Addon, AddonManifest};
use crate::config::Config;
use crate::db::Database;
use crate::endpoints::Endpoints;
use crate::http::HttpRuntime;
use crate::storage::Storage;
use crate::types::{DirectoryRequest, DirectoryResponse, ItemRequest, PlayableItem};

/// The addon wired to a real HTTP client and response cache.
pub struct Tubi {
    addon: Addon,
    runtime: HttpRuntime,
}

impl Tubi {
    /// Build from config: opens (and migrates) the cache database unless
    /// caching is disabled.
    pub async fn connect(config: &Config) -> Result<Self> {
        let storage: Option<Arc<dyn Storage>> = if config.cache_enabled {
            let db = Database::connect(config.database_url.as_deref()).await?;
            db.run_migrations().await?;
            Some(Arc::new(db))
        } else {
            debug!("response cache disabled");
            None
        };
        Self::with_storage(config, storage)
    }

    pub fn with_storage(config: &Config, storage: Option<Arc<dyn Storage>>) -> Result<Self> {
        let runtime = HttpRuntime::new(config, storage)?;
        Ok(Self { addon: Addon::new(Endpoints::new(config.host.clone())), runtime })
    }

    pub fn manifest(&self) -> &AddonManifest { self.addon.manifest() }

    pub async fn directory(&self, input: &DirectoryRequest) -> error::Result<DirectoryResponse> {
        let ctx = self.runtime.context();
        self.addon.directory(&ctx, input).await
    }

    pub async fn item(&self, input: &ItemRequest) -> error::Result<PlayableItem> {
        let ctx = self.runtime.context();
        self.addon.item(&ctx, input).await
    }

    /// Drop cached responses whose key starts with `prefix`, or all of them.
    pub async fn clear_cache_prefix(&self, prefix: Option<&str>) -> Result<u64> {
        match self.runtime.storage() {
            Some(s) => s.clear_cache_prefix(prefix).await,
            None => Ok(0),
        }
    }
}
