use url::Url;

use crate::error::Result;
use crate::types::ItemType;

pub const DEFAULT_HOST: &str = "tubitv.com";

/// Page size requested from the container-content endpoint.
pub const DIRECTORY_LIMIT: u64 = 100;

/// URL builders for the `/oz` API on one host.
#[derive(Debug, Clone)]
pub struct Endpoints {
    host: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self::new(DEFAULT_HOST)
    }
}

impl Endpoints {
    pub fn new(host: impl Into<String>) -> Self {
        Self { host: host.into() }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    fn https(&self, path: &str) -> Result<Url> {
        Ok(Url::parse(&format!("https://{}{}", self.host, path))?)
    }

    pub fn containers(&self) -> Result<Url> {
        self.https("/oz/containers?expand=0")
    }

    /// The term is percent-encoded as a single path segment.
    pub fn search(&self, term: &str) -> Result<Url> {
        let mut url = self.https("/oz/search")?;
        url.path_segments_mut()
            .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
            .push(term);
        Ok(url)
    }

    pub fn container_content(&self, container_id: &str, offset: u64) -> Result<Url> {
        let mut url = self.https("/oz/containers")?;
        url.path_segments_mut()
            .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
            .push(container_id)
            .push("content");
        // `parentId` is sent bare, without a value.
        url.set_query(Some(&format!("parentId&cursor={offset}&limit={DIRECTORY_LIMIT}")));
        Ok(url)
    }

    /// Movies are served over HTTPS; series detail only answers on plain
    /// HTTP and expects the id with a leading `0`.
    pub fn video_content(&self, item_type: ItemType, id: &str) -> Result<Url> {
        let (mut url, segment) = match item_type {
            ItemType::Movie => (self.https("/oz/videos")?, id.to_string()),
            ItemType::Series => (Url::parse(&format!("http://{}/oz/videos", self.host))?, format!("0{id}")),
        };
        url.path_segments_mut()
            .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
            .push(&segment)
            .push("content");
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn container_list_url() {
        assert_eq!(Endpoints::default().containers().unwrap().as_str(), "https://tubitv.com/oz/containers?expand=0");
    }

    #[test]
    fn search_term_is_escaped() {
        let e = Endpoints::default();
        assert_eq!(e.search("batman").unwrap().as_str(), "https://tubitv.com/oz/search/batman");
        assert_eq!(e.search("star wars/2").unwrap().as_str(), "https://tubitv.com/oz/search/star%20wars%2F2");
        assert_eq!(e.search("a?b#c").unwrap().as_str(), "https://tubitv.com/oz/search/a%3Fb%23c");
    }

    #[test]
    fn container_content_url_carries_offset_and_limit() {
        let url = Endpoints::default().container_content("main-category", 200).unwrap();
        assert_eq!(
            url.as_str(),
            "https://tubitv.com/oz/containers/main-category/content?parentId&cursor=200&limit=100"
        );
    }

    #[test]
    fn detail_urls_keep_protocol_asymmetry() {
        let e = Endpoints::default();
        assert_eq!(e.video_content(ItemType::Movie, "123").unwrap().as_str(), "https://tubitv.com/oz/videos/123/content");
        assert_eq!(e.video_content(ItemType::Series, "123").unwrap().as_str(), "http://tubitv.com/oz/videos/0123/content");
        assert_eq!(
            e.video_content(ItemType::Movie, "12?x=1#f").unwrap().as_str(),
            "https://tubitv.com/oz/videos/12%3Fx=1%23f/content"
        );
        assert_eq!(
            e.video_content(ItemType::Series, "a/b").unwrap().as_str(),
            "http://tubitv.com/oz/videos/0a%2Fb/content"
        );
    }

    #[test]
    fn host_is_configurable() {
        let e = Endpoints::new("staging.tubitv.com");
        assert_eq!(e.containers().unwrap().host_str(), Some("staging.tubitv.com"));
    }
}
