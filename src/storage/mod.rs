//! Persistence for the temp-domain registry, the reputation ledger and the
//! verification audit log.
//!
//! Two interchangeable backends implement [`Store`]: [`InMemoryStore`] and
//! [`MongoStore`]. One is selected at startup from [`StorageConfig`] and used
//! for the whole process lifetime.

use crate::config::{StorageBackend, StorageConfig};
use crate::error::Result;
use crate::models::{EmailReputation, TempDomain, Verification};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

pub mod memory;
pub mod mongo;

pub use memory::InMemoryStore;
pub use mongo::MongoStore;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Store: Send + Sync {
    /// Short backend name reported by the health endpoint.
    fn backend_name(&self) -> &'static str;

    /// Entry whose domain equals `domain` (already lowercased).
    async fn find_temp_domain(&self, domain: &str) -> Result<Option<TempDomain>>;

    async fn get_temp_domain(&self, id: &str) -> Result<Option<TempDomain>>;

    /// Inserts a new entry.
    ///
    /// # Errors
    /// [`crate::error::Error::Conflict`] when the domain is already registered.
    async fn insert_temp_domain(&self, entry: TempDomain) -> Result<TempDomain>;

    /// Changes the domain of an existing entry. `Ok(None)` for an unknown id.
    ///
    /// # Errors
    /// [`crate::error::Error::Conflict`] when another entry holds `domain`.
    async fn rename_temp_domain(&self, id: &str, domain: &str) -> Result<Option<TempDomain>>;

    /// Removes an entry; `false` when the id is unknown.
    async fn delete_temp_domain(&self, id: &str) -> Result<bool>;

    /// Entries newest-first, with the total count.
    async fn list_temp_domains(&self, offset: u64, limit: u32) -> Result<(Vec<TempDomain>, u64)>;

    async fn record_verification(&self, row: Verification) -> Result<()>;

    /// Audit rows newest-first, optionally restricted to one user.
    async fn list_verifications(
        &self,
        user_id: Option<String>,
        offset: u64,
        limit: u32,
    ) -> Result<(Vec<Verification>, u64)>;

    async fn find_reputation(
        &self,
        target: &str,
        is_full_email: bool,
    ) -> Result<Option<EmailReputation>>;

    /// Inserts or replaces the row keyed by `(email, is_full_email)`.
    async fn save_reputation(&self, row: &EmailReputation) -> Result<()>;

    /// Rows ordered by `total_reports` descending, with the total count.
    async fn most_reported(&self, offset: u64, limit: u32)
    -> Result<(Vec<EmailReputation>, u64)>;
}

/// Opens the configured backend.
///
/// # Errors
/// Returns [`crate::error::Error::Storage`] when MongoDB cannot be reached or
/// its indexes cannot be created.
pub async fn connect(config: &StorageConfig) -> Result<Arc<dyn Store>> {
    match &config.backend {
        StorageBackend::Memory => {
            info!("Using in-memory storage");
            Ok(Arc::new(InMemoryStore::new()))
        }
        StorageBackend::MongoDb { uri, database } => {
            info!("Connecting to MongoDB database '{}'", database);
            let store = MongoStore::connect(uri, database).await?;
            Ok(Arc::new(store))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_connect_memory_backend() {
        let store = connect(&StorageConfig::default()).await.unwrap();
        assert_eq!(store.backend_name(), "memory");
    }
}
