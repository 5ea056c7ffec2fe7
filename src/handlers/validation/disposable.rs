use crate::error::{Error, Result};
use crate::handlers::validation::patterns::PatternMatcher;
use crate::handlers::validation::syntax::normalize_domain;
use crate::models::{DomainSource, Page, PageRequest, TempDomain};
use crate::storage::Store;
use std::sync::Arc;
use tracing::{debug, info};

/// Disposable providers seeded into every registry at startup.
pub const BUILTIN_TEMP_DOMAINS: &[&str] = &[
    "mailinator.com",
    "guerrillamail.com",
    "10minutemail.com",
    "tempmail.com",
    "temp-mail.org",
    "yopmail.com",
    "throwawaymail.com",
    "trashmail.com",
    "getnada.com",
    "dispostable.com",
    "maildrop.cc",
    "fakeinbox.com",
    "mohmal.com",
    "emailondeck.com",
    "mintemail.com",
    "spamgourmet.com",
    "mailnesia.com",
    "trash-mail.com",
    "tempail.com",
    "burnermail.io",
];

/// Known disposable-email domains, backed by a [`Store`].
///
/// A domain is temporary when it has an explicit entry or, failing that, when
/// it matches one of the domain keyword patterns.
#[derive(Clone)]
pub struct TempDomainRegistry {
    store: Arc<dyn Store>,
    patterns: Arc<PatternMatcher>,
}

impl TempDomainRegistry {
    pub fn new(store: Arc<dyn Store>, patterns: Arc<PatternMatcher>) -> Self {
        Self { store, patterns }
    }

    /// Inserts builtin entries that are not present yet.
    ///
    /// # Returns
    /// Number of newly inserted entries; re-running the seed returns 0.
    pub async fn seed_builtin(&self, domains: &[&str]) -> Result<usize> {
        let mut inserted = 0;
        for domain in domains {
            let domain = normalize_domain(domain)?;
            if self.store.find_temp_domain(&domain).await?.is_some() {
                continue;
            }
            match self
                .store
                .insert_temp_domain(TempDomain::new(domain, DomainSource::Builtin))
                .await
            {
                Ok(_) => inserted += 1,
                // Another instance seeded it concurrently.
                Err(Error::Conflict(_)) => {}
                Err(e) => return Err(e),
            }
        }
        info!("Seeded {} builtin temp domains", inserted);
        Ok(inserted)
    }

    /// Checks whether a domain is a known or pattern-matched temporary domain.
    ///
    /// # Arguments
    /// * `domain` - Domain to check, any case
    pub async fn is_temp_domain(&self, domain: &str) -> Result<bool> {
        let domain = domain.trim().to_lowercase();
        if self.is_listed(&domain).await? {
            return Ok(true);
        }
        let matched = self.patterns.matches_domain(&domain);
        if matched {
            debug!("Domain {} matched a temporary domain pattern", domain);
        }
        Ok(matched)
    }

    /// Whether `domain` has an explicit registry entry.
    pub async fn is_listed(&self, domain: &str) -> Result<bool> {
        let domain = domain.trim().to_lowercase();
        Ok(self.store.find_temp_domain(&domain).await?.is_some())
    }

    /// Registers a domain.
    ///
    /// # Errors
    /// * [`Error::InvalidInput`] for empty or malformed domains
    /// * [`Error::Conflict`] when the domain is already registered
    pub async fn add(&self, domain: &str, source: DomainSource) -> Result<TempDomain> {
        let domain = normalize_domain(domain)?;
        let entry = self
            .store
            .insert_temp_domain(TempDomain::new(domain, source))
            .await?;
        info!("Registered temp domain {} ({:?})", entry.domain, entry.source);
        Ok(entry)
    }

    /// Renames a user entry.
    ///
    /// # Errors
    /// * [`Error::NotFound`] for an unknown id
    /// * [`Error::Forbidden`] for builtin entries
    /// * [`Error::Conflict`] when `new_domain` belongs to another entry
    pub async fn update(&self, id: &str, new_domain: &str) -> Result<TempDomain> {
        let entry = self.existing_user_entry(id).await?;
        let new_domain = normalize_domain(new_domain)?;
        let updated = self
            .store
            .rename_temp_domain(&entry.id, &new_domain)
            .await?
            .ok_or_else(|| Error::NotFound(format!("temp domain '{id}'")))?;
        info!("Renamed temp domain {} -> {}", entry.domain, updated.domain);
        Ok(updated)
    }

    /// Removes a user entry.
    ///
    /// # Errors
    /// * [`Error::NotFound`] for an unknown id
    /// * [`Error::Forbidden`] for builtin entries
    pub async fn delete(&self, id: &str) -> Result<()> {
        let entry = self.existing_user_entry(id).await?;
        if !self.store.delete_temp_domain(&entry.id).await? {
            return Err(Error::NotFound(format!("temp domain '{id}'")));
        }
        info!("Removed temp domain {}", entry.domain);
        Ok(())
    }

    /// Entries newest-first.
    pub async fn list(&self, request: &PageRequest) -> Result<Page<TempDomain>> {
        let (items, total) = self
            .store
            .list_temp_domains(request.offset(), request.limit())
            .await?;
        Ok(Page::new(items, total, request))
    }

    async fn existing_user_entry(&self, id: &str) -> Result<TempDomain> {
        let entry = self
            .store
            .get_temp_domain(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("temp domain '{id}'")))?;
        if entry.is_builtin() {
            return Err(Error::Forbidden(format!(
                "builtin domain '{}' cannot be modified",
                entry.domain
            )));
        }
        Ok(entry)
    }
}
