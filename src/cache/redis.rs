use super::ResultCache;
use crate::error::Result;
use crate::models::VerificationResult;
use async_trait::async_trait;
use redis::{AsyncCommands, Client};
use std::sync::Arc;
use std::time::Duration;

const KEY_PREFIX: &str = "email:verification:";

// Redis client wrapper; connections are multiplexed per call
#[derive(Clone)]
pub struct RedisCache {
    client: Arc<Client>,
}

impl RedisCache {
    /// Opens a client for `redis_url`. No connection is made until first use.
    ///
    /// # Arguments
    /// * `redis_url` - Connection URL, e.g. `redis://127.0.0.1:6379`
    ///
    /// # Errors
    /// [`crate::error::Error::Cache`] if the URL cannot be parsed.
    pub fn new(redis_url: &str) -> Result<Self> {
        let client = Client::open(redis_url)?;
        Ok(Self {
            client: Arc::new(client),
        })
    }

    fn cache_key(email: &str) -> String {
        format!("{KEY_PREFIX}{email}")
    }
}

#[async_trait]
impl ResultCache for RedisCache {
    /// Reads the JSON result stored under the prefixed key.
    ///
    /// # Returns
    /// * `Ok(Some(result))` on a hit
    /// * `Ok(None)` if the key is absent or has expired
    ///
    /// # Errors
    /// A connection or command failure, or a stored value that is not a
    /// valid result document.
    async fn get(&self, key: &str) -> Result<Option<VerificationResult>> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let cached: Option<String> = conn.get(Self::cache_key(key)).await?;
        match cached {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    /// Stores `value` as JSON with `SETEX`. Sub-second TTLs round up to one
    /// second.
    async fn set(&self, key: &str, value: &VerificationResult, ttl: Duration) -> Result<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let json = serde_json::to_string(value)?;
        let _: () = conn
            .set_ex(Self::cache_key(key), json, ttl.as_secs().max(1))
            .await?;
        Ok(())
    }
}
