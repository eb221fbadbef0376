use serde::Serialize;
use tracing::info;

use crate::context::ActionContext;
use crate::endpoints::Endpoints;
use crate::error::{Error, Result};
use crate::handlers;
use crate::types::{DirectoryRequest, DirectoryResponse, ItemRequest, ItemType, PlayableItem};

#[derive(Debug, Clone, Serialize)]
pub struct FeatureToggle {
    pub enabled: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct DirectoryFeatures {
    pub search: FeatureToggle,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Regions {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub forbidden: Vec<String>,
}

/// What the addon declares to the host when it registers.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddonManifest {
    pub id: String,
    pub name: String,
    pub version: String,
    pub icon: String,
    pub poster: String,
    pub item_types: Vec<ItemType>,
    pub default_directory_features: DirectoryFeatures,
    pub regions: Regions,
}

impl Default for AddonManifest {
    fn default() -> Self {
        Self {
            id: "tubitv.com".to_string(),
            name: "tubi".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            icon: "https://tubitv.com/favicon.ico".to_string(),
            poster: "https://cdn.adrise.tv/web/android-chrome-192x192.png".to_string(),
            item_types: vec![ItemType::Movie, ItemType::Series],
            default_directory_features: DirectoryFeatures { search: FeatureToggle { enabled: true } },
            regions: Regions { forbidden: vec!["de".to_string()] },
        }
    }
}

impl AddonManifest {
    pub fn region_allowed(&self, region: &str) -> bool {
        !self.regions.forbidden.iter().any(|r| r.eq_ignore_ascii_case(region))
    }
}

/// Dispatches the `directory` and `item` actions.
#[derive(Debug, Clone, Default)]
pub struct Addon {
    manifest: AddonManifest,
    endpoints: Endpoints,
}

impl Addon {
    pub fn new(endpoints: Endpoints) -> Self {
        Self { manifest: AddonManifest::default(), endpoints }
    }

    pub fn manifest(&self) -> &AddonManifest { &self.manifest }
    pub fn endpoints(&self) -> &Endpoints { &self.endpoints }

    fn check_region(&self, region: &str) -> Result<()> {
        if self.manifest.region_allowed(region) { Ok(()) } else { Err(Error::RegionForbidden(region.to_string())) }
    }

    pub async fn directory(&self, ctx: &dyn ActionContext, input: &DirectoryRequest) -> Result<DirectoryResponse> {
        self.check_region(&input.region)?;
        info!(region = %input.region, id = ?input.id, search = ?input.search, cursor = ?input.cursor, "directory");
        handlers::directory(ctx, &self.endpoints, input).await
    }

    pub async fn item(&self, ctx: &dyn ActionContext, input: &ItemRequest) -> Result<PlayableItem> {
        self.check_region(&input.region)?;
        info!(region = %input.region, item_type = %input.item_type, id = %input.ids.id, "item");
        handlers::item(ctx, &self.endpoints, input).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifest_declares_capabilities() {
        let m = serde_json::to_value(AddonManifest::default()).unwrap();
        assert_eq!(m["id"], "tubitv.com");
        assert_eq!(m["itemTypes"], serde_json::json!(["movie", "series"]));
        assert_eq!(m["defaultDirectoryFeatures"]["search"]["enabled"], true);
        assert_eq!(m["regions"]["forbidden"], serde_json::json!(["de"]));
    }

    #[test]
    fn germany_is_forbidden() {
        let m = AddonManifest::default();
        assert!(!m.region_allowed("de"));
        assert!(!m.region_allowed("DE"));
        assert!(m.region_allowed("us"));
    }
}
