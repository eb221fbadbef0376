//! Typed schema for the `tubitv.com/oz` JSON responses.
//!
//! Only the fields the addon reads are declared; anything else upstream sends
//! is dropped at decode time. Maps keyed by id are decoded into [`IndexMap`]
//! so listings keep the order the API returned them in.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer};

/// Single-character content type code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeCode {
    /// `v`: a standalone video (movie).
    Video,
    /// `s`: a series with seasons of episodes.
    Series,
    Other(String),
}

impl From<String> for TypeCode {
    fn from(code: String) -> Self {
        match code.as_str() {
            "v" => TypeCode::Video,
            "s" => TypeCode::Series,
            _ => TypeCode::Other(code),
        }
    }
}

impl Default for TypeCode {
    fn default() -> Self {
        TypeCode::Other(String::new())
    }
}

impl<'de> Deserialize<'de> for TypeCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<String>::deserialize(deserializer).map(|c| c.map(TypeCode::from).unwrap_or_default())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawCatalogEntry {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(rename = "type", default)]
    pub type_code: TypeCode,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub year: Option<u32>,
    /// Seconds.
    #[serde(default)]
    pub duration: Option<u64>,
    #[serde(default)]
    pub directors: Option<Vec<String>>,
    #[serde(default)]
    pub actors: Option<Vec<String>>,
    #[serde(default)]
    pub posterarts: Option<Vec<String>>,
    #[serde(default)]
    pub backgrounds: Option<Vec<String>>,
    #[serde(default)]
    pub logo: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub children: Option<Vec<RawSeason>>,
    #[serde(default)]
    pub video_resources: Option<Vec<VideoResource>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSeason {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub children: Vec<RawEpisode>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawEpisode {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub video_resources: Option<Vec<VideoResource>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VideoResource {
    /// Container / protocol tag, e.g. `hlsv3`.
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    pub manifest: Manifest,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Manifest {
    pub url: String,
}

/// `GET /oz/containers?expand=0`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContainerList {
    #[serde(default)]
    pub hash: IndexMap<String, RawContainer>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawContainer {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub backgrounds: Vec<String>,
    #[serde(default)]
    pub logo: Option<String>,
}

/// `GET /oz/containers/{id}/content`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContainerContent {
    #[serde(default)]
    pub contents: IndexMap<String, RawCatalogEntry>,
    #[serde(rename = "containersHash", default)]
    pub containers_hash: IndexMap<String, ContainerCursor>,
}

impl ContainerContent {
    /// Next page offset for `container_id`; a zero cursor means the end.
    pub fn next_cursor(&self, container_id: &str) -> Option<u64> {
        self.containers_hash
            .get(container_id)
            .and_then(|c| c.cursor)
            .filter(|c| *c != 0)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContainerCursor {
    #[serde(default)]
    pub cursor: Option<u64>,
}

/// Ids show up as strings on most endpoints and as bare numbers on a few.
fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(u64),
    }
    Ok(match Id::deserialize(deserializer)? {
        Id::Text(s) => s,
        Id::Number(n) => n.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_codes_map_exhaustively() {
        let e: RawCatalogEntry = serde_json::from_str(r#"{"id":"1","type":"v"}"#).unwrap();
        assert_eq!(e.type_code, TypeCode::Video);
        let e: RawCatalogEntry = serde_json::from_str(r#"{"id":"1","type":"s"}"#).unwrap();
        assert_eq!(e.type_code, TypeCode::Series);
        let e: RawCatalogEntry = serde_json::from_str(r#"{"id":"1","type":"l"}"#).unwrap();
        assert_eq!(e.type_code, TypeCode::Other("l".into()));
        let e: RawCatalogEntry = serde_json::from_str(r#"{"id":"1"}"#).unwrap();
        assert_eq!(e.type_code, TypeCode::Other(String::new()));
    }

    #[test]
    fn numeric_ids_are_stringified() {
        let e: RawCatalogEntry = serde_json::from_str(r#"{"id":300123,"type":"v"}"#).unwrap();
        assert_eq!(e.id, "300123");
    }

    #[test]
    fn container_contents_keep_upstream_order() {
        let body = r#"{
            "contents": {
                "9": {"id": "9", "type": "v", "title": "Nine"},
                "1": {"id": "1", "type": "v", "title": "One"},
                "5": {"id": "5", "type": "s", "title": "Five"}
            },
            "containersHash": {"featured": {"cursor": 100}}
        }"#;
        let c: ContainerContent = serde_json::from_str(body).unwrap();
        let ids: Vec<_> = c.contents.values().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, ["9", "1", "5"]);
        assert_eq!(c.next_cursor("featured"), Some(100));
        assert_eq!(c.next_cursor("other"), None);
    }

    #[test]
    fn zero_or_null_cursor_means_no_more_pages() {
        let c: ContainerContent =
            serde_json::from_str(r#"{"contents":{},"containersHash":{"a":{"cursor":0},"b":{"cursor":null}}}"#).unwrap();
        assert_eq!(c.next_cursor("a"), None);
        assert_eq!(c.next_cursor("b"), None);
    }
}
