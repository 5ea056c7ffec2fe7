/// Splits and normalizes addresses and domains.
///
/// # Examples
/// ```
/// use email_trust::handlers::validation::syntax::parse_email;
///
/// let parts = parse_email("Someone@Gmail.com").unwrap();
/// assert_eq!(parts.domain, "gmail.com");
/// ```
pub mod syntax;

/// Ordered domain keyword and username shape patterns, plus the
/// username-entropy heuristic.
pub mod patterns;

/// Deterministic domain-age buckets.
///
/// # Examples
/// ```
/// use email_trust::handlers::validation::domain_age::{estimate_age, DomainAge};
///
/// assert_eq!(estimate_age("example.com"), DomainAge::Old);
/// ```
pub mod domain_age;

/// MX-record deliverability check bounded by a timeout.
///
/// A timeout or resolver failure never surfaces as an error; it is reported
/// as a soft "no MX" verdict with a smaller penalty.
pub mod dnsmx;

/// Registry of known disposable-email domains.
///
/// # Example
/// ```
/// # async fn example() -> email_trust::error::Result<()> {
/// use std::sync::Arc;
/// use email_trust::handlers::validation::disposable::{TempDomainRegistry, BUILTIN_TEMP_DOMAINS};
/// use email_trust::handlers::validation::patterns::PatternMatcher;
/// use email_trust::storage::InMemoryStore;
///
/// let registry = TempDomainRegistry::new(
///     Arc::new(InMemoryStore::new()),
///     Arc::new(PatternMatcher::new()?),
/// );
/// registry.seed_builtin(BUILTIN_TEMP_DOMAINS).await?;
/// assert!(registry.is_temp_domain("mailinator.com").await?);
/// # Ok(())
/// # }
/// ```
pub mod disposable;
