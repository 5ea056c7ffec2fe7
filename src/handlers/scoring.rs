//! Scoring Engine
//!
//! Turns an email address into a 0-100 trust score through a fixed sequence
//! of additive adjustments:
//!
//! 1. parse and lowercase `username@domain`
//! 2. return a cached result when present
//! 3. start from 100
//! 4. known temporary domain: -80
//! 5. first fixed pattern match over the full address: -40 (skips step 6)
//! 6. username entropy: -35 or -20
//! 7. MX deliverability: -30 or -20
//! 8. domain age: -15 or -5
//! 9. known legitimate provider: +10
//! 10. domain reputation: -25 or +15
//! 11. clamp to 0..=100
//! 12. classify as temporary below the threshold
//! 13. cache and return
//!
//! Collaborator failures (storage, cache) are logged and skipped; only a
//! malformed address fails a verification.

use crate::cache::ResultCache;
use crate::config::{CacheConfig, ScoringConfig};
use crate::error::{Error, Result};
use crate::handlers::community::apply_community_signal;
use crate::handlers::reputation::ReputationLedger;
use crate::handlers::validation::disposable::TempDomainRegistry;
use crate::handlers::validation::dnsmx::DeliverabilityChecker;
use crate::handlers::validation::domain_age::estimate_age;
use crate::handlers::validation::patterns::PatternMatcher;
use crate::handlers::validation::syntax::parse_email;
use crate::models::{BulkItem, EmailReputation, ItemError, VerificationResult};
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

pub const KNOWN_LEGITIMATE_PROVIDERS: &[&str] = &[
    "gmail.com",
    "outlook.com",
    "hotmail.com",
    "yahoo.com",
    "icloud.com",
    "protonmail.com",
    "aol.com",
    "zoho.com",
    "mail.com",
    "yandex.com",
    "tutanota.com",
];

pub const KNOWN_TEMP_DOMAIN_LABEL: &str = "Known temporary email domain";
pub const KNOWN_PROVIDER_LABEL: &str = "Known legitimate email provider";
pub const NO_PATTERN_LABEL: &str = "No patterns detected";

const TEMP_DOMAIN_PENALTY: i32 = 80;
const PATTERN_PENALTY: i32 = 40;
const PROVIDER_BONUS: i32 = 10;
const REPORTED_PENALTY: i32 = 25;
const VERIFIED_BONUS: i32 = 15;

/// Calls charged to the caller's quota for each verified address.
pub const CALLS_PER_VERIFICATION: u32 = 1;

/// Quota cost of verifying `emails` addresses.
pub fn call_cost(emails: usize) -> u32 {
    u32::try_from(emails)
        .unwrap_or(u32::MAX)
        .saturating_mul(CALLS_PER_VERIFICATION)
}

/// Checks that `remaining` calls cover a request for `emails` addresses.
///
/// # Returns
/// The cost of the request.
///
/// # Errors
/// [`Error::QuotaExceeded`] when the quota is insufficient.
pub fn ensure_quota(remaining: u32, emails: usize) -> Result<u32> {
    let required = call_cost(emails);
    if required > remaining {
        return Err(Error::QuotaExceeded {
            required,
            remaining,
        });
    }
    Ok(required)
}

/// Engine tuning.
#[derive(Debug, Clone, Copy)]
pub struct ScoringSettings {
    /// Scores strictly below this are temporary
    pub temp_threshold: i32,
    pub cache_ttl: Duration,
}

impl Default for ScoringSettings {
    fn default() -> Self {
        Self {
            temp_threshold: 40,
            cache_ttl: Duration::from_secs(15 * 60),
        }
    }
}

impl ScoringSettings {
    pub fn from_config(scoring: &ScoringConfig, cache: &CacheConfig) -> Self {
        Self {
            temp_threshold: scoring.temp_threshold,
            cache_ttl: cache.ttl,
        }
    }
}

fn append_note(pattern_match: &mut String, note: &str) {
    if !pattern_match.is_empty() {
        pattern_match.push_str("; ");
    }
    pattern_match.push_str(note);
}

pub struct ScoringEngine {
    registry: TempDomainRegistry,
    patterns: Arc<PatternMatcher>,
    deliverability: DeliverabilityChecker,
    ledger: Arc<ReputationLedger>,
    cache: Arc<dyn ResultCache>,
    settings: ScoringSettings,
}

impl ScoringEngine {
    pub fn new(
        registry: TempDomainRegistry,
        patterns: Arc<PatternMatcher>,
        deliverability: DeliverabilityChecker,
        ledger: Arc<ReputationLedger>,
        cache: Arc<dyn ResultCache>,
        settings: ScoringSettings,
    ) -> Self {
        Self {
            registry,
            patterns,
            deliverability,
            ledger,
            cache,
            settings,
        }
    }

    pub fn settings(&self) -> ScoringSettings {
        self.settings
    }

    /// Scores one address.
    ///
    /// Results are cached per trimmed address; a second call within the TTL
    /// returns the same result without another DNS lookup.
    ///
    /// # Errors
    /// [`Error::InvalidInput`] when the address has no `@` or an empty side.
    pub async fn verify(&self, email: &str) -> Result<VerificationResult> {
        let raw = email.trim();
        let parts = parse_email(raw)?;
        let (username, domain) = (parts.username.as_str(), parts.domain.as_str());

        match self.cache.get(raw).await {
            Ok(Some(hit)) => {
                debug!("Cache hit for {}", raw);
                return Ok(hit);
            }
            Ok(None) => {}
            Err(e) => warn!("Cache lookup failed for {}: {}", raw, e),
        }

        let mut score: i32 = 100;
        let mut pattern_match = String::new();

        let is_temp_domain = match self.registry.is_temp_domain(domain).await {
            Ok(is_temp) => is_temp,
            Err(e) => {
                warn!("Temp-domain registry unavailable for {}: {}", domain, e);
                self.patterns.matches_domain(domain)
            }
        };
        if is_temp_domain {
            score -= TEMP_DOMAIN_PENALTY;
            pattern_match.push_str(KNOWN_TEMP_DOMAIN_LABEL);
        }

        match self.patterns.first_match(username, domain) {
            Some(label) => {
                score -= PATTERN_PENALTY;
                append_note(&mut pattern_match, label);
            }
            None if pattern_match.is_empty() => {
                let verdict = self.patterns.username_entropy(username, domain);
                if let Some(label) = verdict.label {
                    score -= verdict.penalty;
                    pattern_match.push_str(label);
                }
            }
            None => {}
        }

        let mx = self.deliverability.check_mx(domain).await;
        score -= mx.penalty;

        let age = estimate_age(domain);
        score -= age.penalty();

        if KNOWN_LEGITIMATE_PROVIDERS.contains(&domain) {
            score = (score + PROVIDER_BONUS).min(100);
            if pattern_match.is_empty() {
                pattern_match.push_str(KNOWN_PROVIDER_LABEL);
            }
        }

        match self.ledger.get_by_domain(domain).await {
            Ok(Some(reputation)) => {
                score = apply_domain_reputation(score, &mut pattern_match, &reputation);
            }
            Ok(None) => {}
            Err(e) => warn!("Reputation lookup failed for {}: {}", domain, e),
        }

        let score = score.clamp(0, 100);
        if pattern_match.is_empty() {
            pattern_match.push_str(NO_PATTERN_LABEL);
        }

        let result = VerificationResult {
            email: raw.to_string(),
            is_temp_email: score < self.settings.temp_threshold,
            trust_score: score,
            domain_age: age.label().to_string(),
            has_mx_records: mx.has_mx,
            pattern_match,
        };

        debug!(
            "Scored {}: {} (temp: {}, mx: {:?})",
            raw, result.trust_score, result.is_temp_email, mx.outcome
        );

        if let Err(e) = self
            .cache
            .set(raw, &result, self.settings.cache_ttl)
            .await
        {
            warn!("Failed to cache verification of {}: {}", raw, e);
        }

        Ok(result)
    }

    /// Scores many addresses concurrently.
    ///
    /// The output has one item per input, in input order. A failing address
    /// carries its own error marker and never aborts the batch.
    pub async fn verify_many(&self, emails: &[String]) -> Vec<BulkItem> {
        let verifications = emails.iter().map(|email| async move {
            match self.verify(email).await {
                Ok(result) => BulkItem {
                    email: email.clone(),
                    result: Some(result),
                    error: None,
                },
                Err(e) => BulkItem {
                    email: email.clone(),
                    result: None,
                    error: Some(ItemError {
                        code: e.code().to_string(),
                        message: e.to_string(),
                    }),
                },
            }
        });
        join_all(verifications).await
    }

    /// Scores an address, then folds in community reports about it.
    ///
    /// The full-address row is preferred over the domain row.
    pub async fn verify_with_community(&self, email: &str) -> Result<VerificationResult> {
        let result = self.verify(email).await?;
        let reputation = self.community_reputation(&result.email).await;
        Ok(apply_community_signal(result, reputation.as_ref()))
    }

    async fn community_reputation(&self, email: &str) -> Option<EmailReputation> {
        match self.ledger.get_by_email(email).await {
            Ok(Some(row)) => return Some(row),
            Ok(None) => {}
            Err(e) => warn!("Reputation lookup failed for {}: {}", email, e),
        }

        let domain = parse_email(email).ok()?.domain;
        match self.ledger.get_by_domain(&domain).await {
            Ok(row) => row,
            Err(e) => {
                warn!("Reputation lookup failed for {}: {}", domain, e);
                None
            }
        }
    }
}

fn apply_domain_reputation(
    score: i32,
    pattern_match: &mut String,
    reputation: &EmailReputation,
) -> i32 {
    if !reputation.report_type.is_legitimate()
        && reputation.total_reports > 2
        && reputation.confidence_score > 50
    {
        append_note(
            pattern_match,
            &format!("Reported as {} by multiple users", reputation.report_type),
        );
        score - REPORTED_PENALTY
    } else if reputation.report_type.is_legitimate()
        && reputation.total_reports > 4
        && reputation.confidence_score > 75
    {
        append_note(pattern_match, "Verified as legitimate by multiple users");
        (score + VERIFIED_BONUS).min(100)
    } else {
        score
    }
}
