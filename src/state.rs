use crate::cache::{self, ResultCache};
use crate::config::AppConfig;
use crate::error::Result;
use crate::handlers::reputation::ReputationLedger;
use crate::handlers::scoring::{ScoringEngine, ScoringSettings};
use crate::handlers::validation::disposable::{BUILTIN_TEMP_DOMAINS, TempDomainRegistry};
use crate::handlers::validation::dnsmx::{DeliverabilityChecker, DnsMxResolver, MxResolver};
use crate::handlers::validation::patterns::PatternMatcher;
use crate::models::{Page, PageRequest, Verification, VerificationResult};
use crate::storage::{self, Store};
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// Shared services handed to every request handler.
///
/// Built once at startup and cloned cheaply into actix `web::Data` and the
/// GraphQL schema.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<ScoringEngine>,
    pub registry: TempDomainRegistry,
    pub ledger: Arc<ReputationLedger>,
    pub store: Arc<dyn Store>,
}

impl AppState {
    /// Connects the configured backends and seeds builtin temp domains.
    pub async fn from_config(config: &AppConfig) -> Result<Self> {
        let store = storage::connect(&config.storage).await?;
        let cache = cache::build(&config.cache)?;
        let resolver = Arc::new(DnsMxResolver::new(config.scoring.dns_timeout));

        Self::with_parts(
            store,
            resolver,
            config.scoring.dns_timeout,
            cache,
            ScoringSettings::from_config(&config.scoring, &config.cache),
        )
        .await
    }

    /// Assembles the services from explicit collaborators.
    pub async fn with_parts(
        store: Arc<dyn Store>,
        resolver: Arc<dyn MxResolver>,
        dns_timeout: Duration,
        cache: Arc<dyn ResultCache>,
        settings: ScoringSettings,
    ) -> Result<Self> {
        let patterns = Arc::new(PatternMatcher::new()?);
        let registry = TempDomainRegistry::new(Arc::clone(&store), Arc::clone(&patterns));
        registry.seed_builtin(BUILTIN_TEMP_DOMAINS).await?;

        let ledger = Arc::new(ReputationLedger::new(Arc::clone(&store)));
        let engine = Arc::new(ScoringEngine::new(
            registry.clone(),
            patterns,
            DeliverabilityChecker::new(resolver, dns_timeout),
            Arc::clone(&ledger),
            cache,
            settings,
        ));

        Ok(Self {
            engine,
            registry,
            ledger,
            store,
        })
    }

    /// Appends an audit row. Failures are logged and swallowed so that a
    /// verification is still returned.
    pub async fn record_verification(&self, result: &VerificationResult, user_id: Option<String>) {
        if let Err(e) = self
            .store
            .record_verification(Verification::record(result, user_id))
            .await
        {
            warn!("Failed to record verification of {}: {}", result.email, e);
        }
    }

    pub async fn verifications(
        &self,
        user_id: Option<String>,
        request: &PageRequest,
    ) -> Result<Page<Verification>> {
        let (items, total) = self
            .store
            .list_verifications(user_id, request.offset(), request.limit())
            .await?;
        Ok(Page::new(items, total, request))
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::handlers::validation::dnsmx::MockMxResolver;
    use crate::storage::InMemoryStore;

    /// In-memory state whose MX lookups always find one record.
    pub async fn memory_state() -> AppState {
        let mut resolver = MockMxResolver::new();
        resolver
            .expect_lookup_mx()
            .returning(|_| Ok(vec!["mx.mail.test".to_string()]));

        AppState::with_parts(
            Arc::new(InMemoryStore::new()),
            Arc::new(resolver),
            Duration::from_millis(500),
            Arc::new(MemoryCache::new()),
            ScoringSettings::default(),
        )
        .await
        .unwrap()
    }
}
