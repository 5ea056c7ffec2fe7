use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use trust_dns_resolver::{
    TokioAsyncResolver,
    config::{ResolverConfig, ResolverOpts},
    error::ResolveErrorKind,
};

/// Penalty when the domain answered but publishes no MX record.
pub const NO_MX_PENALTY: i32 = 30;
/// Penalty when the lookup timed out or failed.
pub const SOFT_FAILURE_PENALTY: i32 = 20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MxLookupError {
    /// The resolver answered and there are no MX records.
    NoRecords,
    /// Any other resolution failure.
    Failed(String),
}

/// Source of MX records for a domain.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MxResolver: Send + Sync {
    /// Exchange host names published for `domain`.
    async fn lookup_mx(&self, domain: &str) -> Result<Vec<String>, MxLookupError>;
}

/// MX resolver backed by the system DNS configuration.
pub struct DnsMxResolver {
    resolver: TokioAsyncResolver,
}

impl DnsMxResolver {
    /// Creates a DNS resolver with custom configuration
    ///
    /// Configures resolver with:
    /// - the given timeout per request
    /// - 2 retry attempts
    /// - Default resolver configuration
    pub fn new(timeout: Duration) -> Self {
        let mut opts = ResolverOpts::default();
        opts.timeout = timeout;
        opts.attempts = 2;

        Self {
            resolver: TokioAsyncResolver::tokio(ResolverConfig::default(), opts),
        }
    }
}

#[async_trait]
impl MxResolver for DnsMxResolver {
    async fn lookup_mx(&self, domain: &str) -> Result<Vec<String>, MxLookupError> {
        match self.resolver.mx_lookup(domain).await {
            Ok(lookup) => {
                let hosts: Vec<String> = lookup
                    .iter()
                    .map(|mx| mx.exchange().to_utf8())
                    .collect();
                if hosts.is_empty() {
                    Err(MxLookupError::NoRecords)
                } else {
                    Ok(hosts)
                }
            }
            Err(e) => match e.kind() {
                ResolveErrorKind::NoRecordsFound { .. } => Err(MxLookupError::NoRecords),
                _ => Err(MxLookupError::Failed(e.to_string())),
            },
        }
    }
}

/// How an MX check ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MxOutcome {
    Found(usize),
    NoRecords,
    TimedOut,
    Failed(String),
}

/// Deliverability verdict with the trust penalty it carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MxCheck {
    pub has_mx: bool,
    pub outcome: MxOutcome,
    pub penalty: i32,
}

impl From<MxOutcome> for MxCheck {
    fn from(outcome: MxOutcome) -> Self {
        let (has_mx, penalty) = match &outcome {
            MxOutcome::Found(_) => (true, 0),
            MxOutcome::NoRecords => (false, NO_MX_PENALTY),
            MxOutcome::TimedOut | MxOutcome::Failed(_) => (false, SOFT_FAILURE_PENALTY),
        };
        Self {
            has_mx,
            outcome,
            penalty,
        }
    }
}

/// Races MX lookups against a deadline.
#[derive(Clone)]
pub struct DeliverabilityChecker {
    resolver: Arc<dyn MxResolver>,
    timeout: Duration,
}

impl DeliverabilityChecker {
    pub fn new(resolver: Arc<dyn MxResolver>, timeout: Duration) -> Self {
        Self { resolver, timeout }
    }

    /// Checks whether `domain` publishes MX records.
    ///
    /// Never fails: a timeout or resolver error becomes a soft "no MX" verdict
    /// with a smaller penalty than a confirmed absence.
    pub async fn check_mx(&self, domain: &str) -> MxCheck {
        let outcome = match tokio::time::timeout(self.timeout, self.resolver.lookup_mx(domain)).await
        {
            Ok(Ok(hosts)) if !hosts.is_empty() => {
                debug!("Domain {} has {} MX record(s)", domain, hosts.len());
                MxOutcome::Found(hosts.len())
            }
            Ok(Ok(_)) | Ok(Err(MxLookupError::NoRecords)) => {
                debug!("Domain {} has no MX records", domain);
                MxOutcome::NoRecords
            }
            Ok(Err(MxLookupError::Failed(reason))) => {
                debug!("MX record lookup failed for {}: {}", domain, reason);
                MxOutcome::Failed(reason)
            }
            Err(_) => {
                warn!(
                    "MX lookup for {} exceeded {}ms",
                    domain,
                    self.timeout.as_millis()
                );
                MxOutcome::TimedOut
            }
        };

        MxCheck::from(outcome)
    }
}
