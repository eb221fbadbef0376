//! Capabilities the host runtime lends to an action while it runs.
//!
//! Handlers never talk to the network or a cache directly; they go through
//! [`ActionContext`]. The host decides how requests are sent, retried and
//! memoized.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::error::{Error, Result};

/// Identifies a cached action result. Parts are joined with `|`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(Vec<String>);

impl CacheKey {
    pub fn new<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(parts.into_iter().map(Into::into).collect())
    }

    pub fn parts(&self) -> &[String] {
        &self.0
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0.join("|"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ttl {
    Forever,
    For(Duration),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheOptions {
    pub ttl: Ttl,
    /// How long a stored result counts as fresh before it is fetched again.
    pub refresh_interval: Option<Duration>,
}

impl Default for CacheOptions {
    fn default() -> Self {
        Self { ttl: Ttl::For(Duration::from_secs(3600)), refresh_interval: None }
    }
}

/// Raw upstream answer as handed back by the fetch capability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl FetchResponse {
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self { status: 200, body: body.into() }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait]
pub trait ActionContext: Send + Sync {
    /// Register a cache entry for the current action. Called before the
    /// fetch; the handler does not depend on what it returns.
    async fn request_cache(&self, key: CacheKey, options: CacheOptions) -> Result<()>;

    /// Perform one GET. The host may answer from its cache.
    async fn fetch(&self, url: &Url) -> Result<FetchResponse>;
}

/// Fetch `url` and decode the body into `T`.
///
/// A 404 or a `{"code": "NotFound"}` body becomes [`Error::NotFound`]; other
/// non-success statuses become [`Error::Status`].
pub async fn fetch_api<T: DeserializeOwned>(ctx: &dyn ActionContext, url: &Url) -> Result<T> {
    debug!(%url, "fetching");
    let res = ctx.fetch(url).await?;
    if res.status == 404 {
        return Err(Error::NotFound { url: url.to_string() });
    }
    if !res.is_success() {
        return Err(Error::Status { url: url.to_string(), status: res.status });
    }
    // Bodies that are not an object (search returns an array) carry no code.
    let code = serde_json::from_slice::<ApiCode>(&res.body).ok().and_then(|c| c.code);
    if code.as_deref() == Some("NotFound") {
        return Err(Error::NotFound { url: url.to_string() });
    }
    // Decoded straight from the bytes so map fields keep upstream key order.
    Ok(serde_json::from_slice(&res.body)?)
}

#[derive(Deserialize)]
struct ApiCode {
    #[serde(default)]
    code: Option<String>,
}
