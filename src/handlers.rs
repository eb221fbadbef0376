use std::time::Duration;

use tracing::{debug, warn};

use crate::context::{fetch_api, ActionContext, CacheKey, CacheOptions, Ttl};
use crate::endpoints::Endpoints;
use crate::error::{Error, Result};
use crate::mapping::{directory_item_from, playable_item_from};
use crate::types::{
    CatalogItem, DirectoryOptions, DirectoryRequest, DirectoryResponse, ImageShape, ItemRequest, PlayableItem,
};
use crate::upstream::{ContainerContent, ContainerList, RawCatalogEntry};

/// Directory listings are kept indefinitely and refreshed in the background.
pub const DIRECTORY_REFRESH_INTERVAL: Duration = Duration::from_secs(8 * 3600);

pub fn directory_cache_options() -> CacheOptions {
    CacheOptions { ttl: Ttl::Forever, refresh_interval: Some(DIRECTORY_REFRESH_INTERVAL) }
}

/// Root categories, one category's content, or search results.
///
/// A search term wins over a category id; with neither, the category list
/// is returned.
pub async fn directory(ctx: &dyn ActionContext, endpoints: &Endpoints, input: &DirectoryRequest) -> Result<DirectoryResponse> {
    let key = CacheKey::new([
        input.region.as_str(),
        input.search.as_deref().unwrap_or(""),
        input.id.as_deref().unwrap_or(""),
    ]);
    ctx.request_cache(key, directory_cache_options()).await?;

    // Empty strings count as absent.
    let search = input.search.as_deref().filter(|s| !s.is_empty());
    let id = input.id.as_deref().filter(|s| !s.is_empty());

    if let Some(term) = search {
        let entries: Vec<RawCatalogEntry> = fetch_api(ctx, &endpoints.search(term)?).await?;
        debug!(term, results = entries.len(), "search");
        return Ok(DirectoryResponse { options: None, items: normalize_listing(entries)?, next_cursor: None });
    }

    if let Some(id) = id {
        let offset = input.cursor.unwrap_or(0);
        let content: ContainerContent = fetch_api(ctx, &endpoints.container_content(id, offset)?).await?;
        let next_cursor = content.next_cursor(id);
        debug!(container = id, offset, results = content.contents.len(), ?next_cursor, "container content");
        let items = normalize_listing(content.contents.into_values())?;
        return Ok(DirectoryResponse { options: None, items, next_cursor });
    }

    let list: ContainerList = fetch_api(ctx, &endpoints.containers()?).await?;
    let items = list
        .hash
        .into_values()
        .map(|c| CatalogItem::Directory(directory_item_from(c)))
        .collect();
    Ok(DirectoryResponse {
        options: Some(DirectoryOptions { image_shape: ImageShape::Landscape, display_name: true }),
        items,
        next_cursor: None,
    })
}

/// Single movie or series with its episodes.
pub async fn item(ctx: &dyn ActionContext, endpoints: &Endpoints, input: &ItemRequest) -> Result<PlayableItem> {
    let key = CacheKey::new([input.region.as_str(), input.item_type.as_str(), input.ids.id.as_str()]);
    ctx.request_cache(key, CacheOptions::default()).await?;

    let url = endpoints.video_content(input.item_type, &input.ids.id)?;
    let entry: RawCatalogEntry = fetch_api(ctx, &url).await?;
    playable_item_from(entry)
}

// Records of a kind this addon does not serve are left out of listings;
// everything else that fails to normalize fails the listing.
fn normalize_listing(entries: impl IntoIterator<Item = RawCatalogEntry>) -> Result<Vec<CatalogItem>> {
    let mut items = Vec::new();
    for entry in entries {
        let id = entry.id.clone();
        match playable_item_from(entry) {
            Ok(item) => items.push(CatalogItem::Playable(item)),
            Err(Error::UnknownItemType(code)) => warn!(id = %id, code = %code, "skipping record of unsupported type"),
            Err(e) => return Err(e),
        }
    }
    Ok(items)
}
