//! Verification Cache
//!
//! Memoizes scoring results per raw email to bound DNS cost. The cache is a
//! cost-control layer only: a miss or a backend failure falls through to a
//! full recomputation.

use crate::config::{CacheBackend, CacheConfig};
use crate::error::Result;
use crate::models::VerificationResult;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};

pub mod redis;

pub use self::redis::RedisCache;

#[async_trait]
pub trait ResultCache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<VerificationResult>>;

    async fn set(&self, key: &str, value: &VerificationResult, ttl: Duration) -> Result<()>;
}

struct CacheEntry {
    value: VerificationResult,
    expires_at: Instant,
}

type Entries = Arc<RwLock<HashMap<String, CacheEntry>>>;

/// Process-local TTL cache with an optional background sweeper.
#[derive(Default)]
pub struct MemoryCache {
    entries: Entries,
    sweeper: Mutex<Option<JoinHandle<()>>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Evicts expired entries, returning how many were removed.
    pub async fn sweep(&self) -> usize {
        sweep_entries(&self.entries).await
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Starts the periodic sweep. Restarting replaces the running task.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start_sweeper(&self, interval: Duration) {
        let entries = Arc::clone(&self.entries);
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                let removed = sweep_entries(&entries).await;
                if removed > 0 {
                    debug!("Cache sweep evicted {} expired entries", removed);
                }
            }
        });

        let mut sweeper = self.sweeper.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = sweeper.replace(handle) {
            previous.abort();
        }
        info!("Cache sweeper started with {:?} interval", interval);
    }

    pub fn stop_sweeper(&self) {
        let mut sweeper = self.sweeper.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = sweeper.take() {
            handle.abort();
            debug!("Cache sweeper stopped");
        }
    }

    pub fn is_sweeping(&self) -> bool {
        self.sweeper
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for MemoryCache {
    fn drop(&mut self) {
        self.stop_sweeper();
    }
}

async fn sweep_entries(entries: &Entries) -> usize {
    let now = Instant::now();
    let mut entries = entries.write().await;
    let before = entries.len();
    entries.retain(|_, entry| entry.expires_at > now);
    before - entries.len()
}

#[async_trait]
impl ResultCache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<VerificationResult>> {
        let entries = self.entries.read().await;
        Ok(entries
            .get(key)
            .filter(|entry| entry.expires_at > Instant::now())
            .map(|entry| entry.value.clone()))
    }

    async fn set(&self, key: &str, value: &VerificationResult, ttl: Duration) -> Result<()> {
        self.entries.write().await.insert(
            key.to_string(),
            CacheEntry {
                value: value.clone(),
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }
}

/// Builds the configured cache. The in-memory variant starts its sweeper.
///
/// # Errors
/// [`crate::error::Error::Cache`] when the Redis URL is malformed.
pub fn build(config: &CacheConfig) -> Result<Arc<dyn ResultCache>> {
    match &config.backend {
        CacheBackend::Memory => {
            let cache = MemoryCache::new();
            cache.start_sweeper(config.sweep_interval);
            Ok(Arc::new(cache))
        }
        CacheBackend::Redis { url } => {
            info!("Using Redis verification cache");
            Ok(Arc::new(RedisCache::new(url)?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(email: &str) -> VerificationResult {
        VerificationResult {
            email: email.to_string(),
            is_temp_email: false,
            trust_score: 95,
            domain_age: "Mature (1-5 years)".to_string(),
            has_mx_records: true,
            pattern_match: "Known legitimate email provider".to_string(),
        }
    }

    #[tokio::test]
    async fn test_get_after_set() {
        let cache = MemoryCache::new();
        let value = result("a@yahoo.com");
        cache
            .set("a@yahoo.com", &value, Duration::from_secs(60))
            .await
            .unwrap();

        assert_eq!(cache.get("a@yahoo.com").await.unwrap(), Some(value));
        assert_eq!(cache.get("b@yahoo.com").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_expired_entries_are_ignored_and_swept() {
        let cache = MemoryCache::new();
        cache
            .set("old@x.com", &result("old@x.com"), Duration::ZERO)
            .await
            .unwrap();
        cache
            .set("new@x.com", &result("new@x.com"), Duration::from_secs(60))
            .await
            .unwrap();

        assert_eq!(cache.get("old@x.com").await.unwrap(), None);
        assert_eq!(cache.sweep().await, 1);
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_sweeper_lifecycle() {
        let cache = MemoryCache::new();
        cache
            .set("gone@x.com", &result("gone@x.com"), Duration::ZERO)
            .await
            .unwrap();

        cache.start_sweeper(Duration::from_millis(10));
        assert!(cache.is_sweeping());

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(cache.is_empty().await);

        cache.stop_sweeper();
        assert!(!cache.is_sweeping());
    }

    #[tokio::test]
    async fn test_build_memory_cache() {
        let cache = build(&CacheConfig::default()).unwrap();
        assert!(cache.get("missing@x.com").await.unwrap().is_none());
    }
}
