//! Local stand-in for the host's fetch and request-cache capabilities.
//!
//! [`HttpRuntime`] is shared across actions; every action gets its own
//! [`HttpContext`], which remembers the cache entry the handler registered and
//! applies it to the fetch that follows.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};
use url::Url;

use crate::config::Config;
use crate::context::{ActionContext, CacheKey, CacheOptions, FetchResponse, Ttl};
use crate::error::{Error, Result};
use crate::storage::{CachedPayload, Storage, NEVER_EXPIRES};

pub struct HttpRuntime {
    client: reqwest::Client,
    storage: Option<Arc<dyn Storage>>,
}

impl HttpRuntime {
    pub fn new(config: &Config, storage: Option<Arc<dyn Storage>>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self::with_client(client, storage))
    }

    pub fn with_client(client: reqwest::Client, storage: Option<Arc<dyn Storage>>) -> Self {
        Self { client, storage }
    }

    pub fn storage(&self) -> Option<&Arc<dyn Storage>> { self.storage.as_ref() }

    /// Fresh context for one action invocation.
    pub fn context(&self) -> HttpContext<'_> {
        HttpContext { runtime: self, registration: Mutex::new(None) }
    }

    async fn get(&self, url: &Url) -> Result<FetchResponse> {
        let res = self.client.get(url.clone()).send().await?;
        let status = res.status().as_u16();
        let body = res.bytes().await?.to_vec();
        debug!(%url, status, bytes = body.len(), "upstream response");
        Ok(FetchResponse { status, body })
    }
}

pub struct HttpContext<'a> {
    runtime: &'a HttpRuntime,
    registration: Mutex<Option<(CacheKey, CacheOptions)>>,
}

impl<'a> HttpContext<'a> {
    fn registration(&self) -> Option<(CacheKey, CacheOptions)> {
        self.registration.lock().ok().and_then(|r| r.clone())
    }
}

#[async_trait]
impl<'a> ActionContext for HttpContext<'a> {
    async fn request_cache(&self, key: CacheKey, options: CacheOptions) -> Result<()> {
        debug!(%key, ?options, "cache registered");
        let mut slot = self
            .registration
            .lock()
            .map_err(|_| Error::Cache(anyhow::anyhow!("cache registration poisoned")))?;
        *slot = Some((key, options));
        Ok(())
    }

    async fn fetch(&self, url: &Url) -> Result<FetchResponse> {
        let (Some(storage), Some((key, options))) = (self.runtime.storage.as_ref(), self.registration()) else {
            return self.runtime.get(url).await;
        };

        let storage_key = format!("{key}|{url}");
        let now = current_epoch();
        let cached = storage.get_cache(&storage_key, now).await.map_err(Error::Cache)?;
        if let Some(entry) = &cached {
            if is_fresh(entry, &options, now) {
                debug!(key = %storage_key, "cache hit");
                return Ok(FetchResponse::ok(entry.payload.clone()));
            }
        }

        let outcome = self.runtime.get(url).await;
        if let Ok(res) = &outcome {
            if res.is_success() {
                if let Ok(payload) = String::from_utf8(res.body.clone()) {
                    let entry = CachedPayload {
                        key: storage_key,
                        payload,
                        stored_at: now,
                        expires_at: expires_at(options.ttl, now),
                    };
                    if let Err(e) = storage.put_cache(&entry).await {
                        warn!(error = %e, "failed to store response");
                    }
                }
            }
        }
        or_stale(url, outcome, cached)
    }
}

/// Falls back to a stale entry when upstream is unreachable or answers with
/// a server error. Client errors such as 404 are passed through.
fn or_stale(url: &Url, outcome: Result<FetchResponse>, stale: Option<CachedPayload>) -> Result<FetchResponse> {
    let Some(entry) = stale else {
        return outcome;
    };
    match outcome {
        Ok(res) if res.status >= 500 => {
            warn!(%url, status = res.status, "upstream error; serving stale cached response");
            Ok(FetchResponse::ok(entry.payload))
        }
        Err(e) => {
            warn!(%url, error = %e, "upstream failed; serving stale cached response");
            Ok(FetchResponse::ok(entry.payload))
        }
        ok => ok,
    }
}

fn is_fresh(entry: &CachedPayload, options: &CacheOptions, now: i64) -> bool {
    match options.refresh_interval {
        Some(interval) => now.saturating_sub(entry.stored_at) < interval.as_secs() as i64,
        None => true,
    }
}

fn expires_at(ttl: Ttl, now: i64) -> i64 {
    match ttl {
        Ttl::Forever => NEVER_EXPIRES,
        Ttl::For(d) => now.saturating_add(d.as_secs() as i64),
    }
}

fn current_epoch() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    // Nothing listens on the discard port, so any real request fails fast.
    fn unreachable_url() -> Url {
        Url::parse("http://127.0.0.1:9/oz/containers?expand=0").unwrap()
    }

    fn runtime(storage: Arc<MemoryStorage>) -> HttpRuntime {
        let storage: Arc<dyn Storage> = storage;
        let client = reqwest::Client::builder().no_proxy().build().unwrap();
        HttpRuntime::with_client(client, Some(storage))
    }

    fn options() -> CacheOptions {
        CacheOptions { ttl: Ttl::Forever, refresh_interval: Some(Duration::from_secs(60)) }
    }

    #[test]
    fn freshness_follows_refresh_interval() {
        let entry = CachedPayload { key: "k".into(), payload: "{}".into(), stored_at: 1_000, expires_at: NEVER_EXPIRES };
        assert!(is_fresh(&entry, &options(), 1_059));
        assert!(!is_fresh(&entry, &options(), 1_060));
        assert!(is_fresh(&entry, &CacheOptions::default(), 999_999));
    }

    #[test]
    fn ttl_forever_never_expires() {
        assert_eq!(expires_at(Ttl::Forever, 5), NEVER_EXPIRES);
        assert_eq!(expires_at(Ttl::For(Duration::from_secs(10)), 5), 15);
    }

    #[tokio::test]
    async fn fresh_entry_is_served_without_network() {
        let storage = Arc::new(MemoryStorage::new());
        let key = CacheKey::new(["us", "", ""]);
        let url = unreachable_url();
        storage
            .put_cache(&CachedPayload {
                key: format!("{key}|{url}"),
                payload: r#"{"hash":{}}"#.into(),
                stored_at: current_epoch(),
                expires_at: NEVER_EXPIRES,
            })
            .await
            .unwrap();

        let rt = runtime(storage);
        let ctx = rt.context();
        ctx.request_cache(key, options()).await.unwrap();
        let res = ctx.fetch(&url).await.unwrap();
        assert_eq!(res, FetchResponse::ok(r#"{"hash":{}}"#));
    }

    #[tokio::test]
    async fn stale_entry_covers_upstream_failure() {
        let storage = Arc::new(MemoryStorage::new());
        let key = CacheKey::new(["us", "", ""]);
        let url = unreachable_url();
        storage
            .put_cache(&CachedPayload {
                key: format!("{key}|{url}"),
                payload: "[]".into(),
                stored_at: current_epoch() - 3_600,
                expires_at: NEVER_EXPIRES,
            })
            .await
            .unwrap();

        let rt = runtime(storage);
        let ctx = rt.context();
        ctx.request_cache(key, options()).await.unwrap();
        assert_eq!(ctx.fetch(&url).await.unwrap().body, b"[]");
    }

    fn stale() -> Option<CachedPayload> {
        Some(CachedPayload { key: "k".into(), payload: "[]".into(), stored_at: 0, expires_at: NEVER_EXPIRES })
    }

    #[test]
    fn stale_entry_covers_server_errors_only() {
        let url = unreachable_url();
        let busy = Ok(FetchResponse { status: 503, body: b"busy".to_vec() });
        assert_eq!(or_stale(&url, busy, stale()).unwrap(), FetchResponse::ok("[]"));

        let gone = FetchResponse { status: 404, body: Vec::new() };
        assert_eq!(or_stale(&url, Ok(gone.clone()), stale()).unwrap(), gone);

        let fresh = FetchResponse::ok("[1]");
        assert_eq!(or_stale(&url, Ok(fresh.clone()), stale()).unwrap(), fresh);

        let busy = FetchResponse { status: 500, body: Vec::new() };
        assert_eq!(or_stale(&url, Ok(busy.clone()), None).unwrap(), busy);
    }

    #[tokio::test]
    async fn unregistered_fetch_skips_the_cache() {
        let storage = Arc::new(MemoryStorage::new());
        let url = unreachable_url();
        storage
            .put_cache(&CachedPayload {
                key: format!("us|||{url}"),
                payload: "[]".into(),
                stored_at: current_epoch(),
                expires_at: NEVER_EXPIRES,
            })
            .await
            .unwrap();

        let rt = runtime(storage);
        let err = rt.context().fetch(&url).await.unwrap_err();
        assert!(matches!(err, Error::Http(_)));
    }
}
