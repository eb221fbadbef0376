use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;

/// `expires_at` value for entries that never expire.
pub const NEVER_EXPIRES: i64 = i64::MAX;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedPayload {
    pub key: String,
    pub payload: String,
    /// Unix seconds when the payload was fetched.
    pub stored_at: i64,
    /// Unix seconds after which the payload must not be served.
    pub expires_at: i64,
}

#[async_trait]
pub trait Storage: Send + Sync {
    /// Entry for `key` that has not expired at `now`.
    async fn get_cache(&self, key: &str, now: i64) -> Result<Option<CachedPayload>>;
    async fn put_cache(&self, entry: &CachedPayload) -> Result<()>;
    /// Drop entries whose key starts with `prefix`, or everything.
    async fn clear_cache_prefix(&self, prefix: Option<&str>) -> Result<u64>;
}

/// Process-local storage.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, CachedPayload>>,
}

impl MemoryStorage {
    pub fn new() -> Self { Self::default() }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool { self.len() == 0 }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn get_cache(&self, key: &str, now: i64) -> Result<Option<CachedPayload>> {
        let entries = self.entries.lock().map_err(|_| anyhow::anyhow!("memory cache poisoned"))?;
        Ok(entries.get(key).filter(|e| e.expires_at > now).cloned())
    }

    async fn put_cache(&self, entry: &CachedPayload) -> Result<()> {
        let mut entries = self.entries.lock().map_err(|_| anyhow::anyhow!("memory cache poisoned"))?;
        entries.retain(|_, e| e.expires_at > entry.stored_at);
        entries.insert(entry.key.clone(), entry.clone());
        Ok(())
    }

    async fn clear_cache_prefix(&self, prefix: Option<&str>) -> Result<u64> {
        let mut entries = self.entries.lock().map_err(|_| anyhow::anyhow!("memory cache poisoned"))?;
        let before = entries.len();
        match prefix {
            Some(p) => entries.retain(|k, _| !k.starts_with(p)),
            None => entries.clear(),
        }
        Ok((before - entries.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(key: &str, expires_at: i64) -> CachedPayload {
        CachedPayload { key: key.into(), payload: "{}".into(), stored_at: 0, expires_at }
    }

    #[tokio::test]
    async fn expired_entries_are_not_returned() {
        let s = MemoryStorage::new();
        s.put_cache(&payload("a", 100)).await.unwrap();
        assert!(s.get_cache("a", 99).await.unwrap().is_some());
        assert!(s.get_cache("a", 100).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn expired_entries_are_pruned_on_write() {
        let s = MemoryStorage::new();
        s.put_cache(&payload("old", 10)).await.unwrap();
        s.put_cache(&CachedPayload { stored_at: 20, ..payload("new", NEVER_EXPIRES) }).await.unwrap();
        assert_eq!(s.len(), 1);
        assert!(s.get_cache("new", 21).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn clear_by_prefix() {
        let s = MemoryStorage::new();
        s.put_cache(&payload("us|a", NEVER_EXPIRES)).await.unwrap();
        s.put_cache(&payload("us|b", NEVER_EXPIRES)).await.unwrap();
        s.put_cache(&payload("ca|a", NEVER_EXPIRES)).await.unwrap();
        assert_eq!(s.clear_cache_prefix(Some("us|")).await.unwrap(), 2);
        assert_eq!(s.len(), 1);
        assert_eq!(s.clear_cache_prefix(None).await.unwrap(), 1);
        assert!(s.is_empty());
    }
}
