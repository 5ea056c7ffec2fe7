//! Reputation Ledger
//!
//! Crowd-sourced reports about full addresses and bare domains. Each report
//! is a read-modify-write of a single row; reports against the same row are
//! serialized with a per-key async lock so concurrent reports are never lost,
//! whichever storage backend is in use. A lock entry is released when its
//! [`RowLease`] drops, including when a report future is cancelled.

use crate::error::{Error, Result};
use crate::models::{EmailReputation, Page, PageRequest, ReportType};
use crate::storage::Store;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::Mutex as RowLock;
use tracing::{debug, info};

type RowKey = (String, bool);

pub struct ReputationLedger {
    store: Arc<dyn Store>,
    /// Per-row write locks, dropped once no report holds them
    locks: Mutex<HashMap<RowKey, Arc<RowLock<()>>>>,
}

/// Claim on one row's write lock; gives the map entry back on drop.
struct RowLease<'a> {
    locks: &'a Mutex<HashMap<RowKey, Arc<RowLock<()>>>>,
    key: RowKey,
    row: Arc<RowLock<()>>,
}

impl RowLease<'_> {
    async fn lock(&self) -> tokio::sync::MutexGuard<'_, ()> {
        self.row.lock().await
    }
}

impl Drop for RowLease<'_> {
    fn drop(&mut self) {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        // Only the map and this lease still reference the row lock.
        if Arc::strong_count(&self.row) == 2 {
            locks.remove(&self.key);
        }
    }
}

fn normalize_target(target: &str) -> Result<String> {
    let normalized = target.trim().to_lowercase();
    if normalized.is_empty() {
        return Err(Error::InvalidInput(
            "report target must not be empty".to_string(),
        ));
    }
    Ok(normalized)
}

impl ReputationLedger {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Row for an exact full address.
    pub async fn get_by_email(&self, email: &str) -> Result<Option<EmailReputation>> {
        let email = normalize_target(email)?;
        self.store.find_reputation(&email, true).await
    }

    /// Row for a bare domain.
    pub async fn get_by_domain(&self, domain: &str) -> Result<Option<EmailReputation>> {
        let domain = normalize_target(domain)?;
        self.store.find_reputation(&domain, false).await
    }

    /// Looks up a full address or a bare domain depending on whether the
    /// target contains `@`.
    pub async fn get(&self, target: &str) -> Result<Option<EmailReputation>> {
        if target.contains('@') {
            self.get_by_email(target).await
        } else {
            self.get_by_domain(target).await
        }
    }

    /// Records one report against `target` and returns the updated row.
    ///
    /// # Errors
    /// [`Error::InvalidInput`] for an empty target; storage errors otherwise.
    pub async fn report(
        &self,
        target: &str,
        report_type: ReportType,
        metadata: Option<String>,
    ) -> Result<EmailReputation> {
        let target = normalize_target(target)?;
        let key: RowKey = (target.clone(), target.contains('@'));

        let lease = self.lease(&key);
        let result = {
            let _guard = lease.lock().await;
            self.apply(&key, report_type, metadata).await
        };
        drop(lease);

        let row = result?;
        info!(
            "Reputation report for {}: {} (count {}/{}, confidence {})",
            row.email, row.report_type, row.report_count, row.total_reports, row.confidence_score
        );
        Ok(row)
    }

    /// Rows with the most reports first.
    pub async fn most_reported(&self, request: &PageRequest) -> Result<Page<EmailReputation>> {
        let (items, total) = self
            .store
            .most_reported(request.offset(), request.limit())
            .await?;
        Ok(Page::new(items, total, request))
    }

    async fn apply(
        &self,
        (target, is_full_email): &RowKey,
        report_type: ReportType,
        metadata: Option<String>,
    ) -> Result<EmailReputation> {
        let now = Utc::now();
        let row = match self.store.find_reputation(target, *is_full_email).await? {
            Some(mut existing) => {
                existing.apply_report(report_type, metadata, now);
                existing
            }
            None => {
                debug!("First reputation report for {}", target);
                EmailReputation::first_report(target, report_type, metadata, now)
            }
        };
        self.store.save_reputation(&row).await?;
        Ok(row)
    }

    fn lease(&self, key: &RowKey) -> RowLease<'_> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        let row = locks
            .entry(key.clone())
            .or_insert_with(|| Arc::new(RowLock::new(())))
            .clone();
        RowLease {
            locks: &self.locks,
            key: key.clone(),
            row,
        }
    }

    #[cfg(test)]
    fn held_locks(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryStore;
    use futures::future::join_all;
    use std::time::Duration;

    fn ledger() -> ReputationLedger {
        ReputationLedger::new(Arc::new(InMemoryStore::new()))
    }

    #[tokio::test]
    async fn test_repeated_reports_reach_full_confidence() {
        let ledger = ledger();
        let mut row = None;
        for _ in 0..4 {
            row = Some(
                ledger
                    .report("spamdomain.test", ReportType::Temporary, None)
                    .await
                    .unwrap(),
            );
        }
        let row = row.unwrap();

        assert!(!row.is_full_email);
        assert_eq!(row.total_reports, 4);
        assert_eq!(row.report_count, 4);
        assert_eq!(row.confidence_score, 100);
    }

    #[tokio::test]
    async fn test_conflicting_report() {
        let ledger = ledger();
        let first = ledger
            .report("x@example.com", ReportType::Legitimate, None)
            .await
            .unwrap();
        let second = ledger
            .report("x@example.com", ReportType::Spam, None)
            .await
            .unwrap();

        assert!(second.is_full_email);
        assert_eq!(second.total_reports, 2);
        assert_eq!(second.report_count, 1);
        assert_eq!(
            second.confidence_score,
            (first.confidence_score - 30).max(30)
        );
        assert_eq!(second.confidence_score, 30);
    }

    #[tokio::test]
    async fn test_targets_are_normalized() {
        let ledger = ledger();
        ledger
            .report("  Foo@Bar.COM ", ReportType::Phishing, Some("link".to_string()))
            .await
            .unwrap();

        let row = ledger.get("foo@bar.com").await.unwrap().unwrap();
        assert_eq!(row.email, "foo@bar.com");
        assert_eq!(row.metadata.as_deref(), Some("link"));

        // A full-address row is not a domain row.
        assert!(ledger.get_by_domain("bar.com").await.unwrap().is_none());
        assert!(ledger.get_by_email("bar.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_empty_target_rejected() {
        let ledger = ledger();
        let result = ledger.report("   ", ReportType::Spam, None).await;
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_concurrent_reports_are_not_lost() {
        let ledger = Arc::new(ledger());
        let reports = (0..20).map(|_| {
            let ledger = Arc::clone(&ledger);
            async move { ledger.report("busy.test", ReportType::Spam, None).await }
        });
        let results = join_all(reports).await;
        assert!(results.iter().all(|r| r.is_ok()));

        let row = ledger.get_by_domain("busy.test").await.unwrap().unwrap();
        assert_eq!(row.total_reports, 20);
        assert_eq!(row.report_count, 20);
        assert!(row.report_count <= row.total_reports);
        assert_eq!(ledger.held_locks(), 0);
    }

    #[tokio::test]
    async fn test_cancelled_report_releases_lock() {
        let ledger = ledger();
        let key: RowKey = ("slow.test".to_string(), false);

        let lease = ledger.lease(&key);
        let held = lease.lock().await;

        // Parks on the row lock until the deadline, then stays pending.
        let mut pending = Box::pin(ledger.report("slow.test", ReportType::Spam, None));
        let timed_out = tokio::time::timeout(Duration::from_millis(20), &mut pending).await;
        assert!(timed_out.is_err());

        drop(held);
        drop(lease);
        assert_eq!(ledger.held_locks(), 1);

        drop(pending);
        assert_eq!(ledger.held_locks(), 0);

        let row = ledger
            .report("slow.test", ReportType::Spam, None)
            .await
            .unwrap();
        assert_eq!(row.total_reports, 1);
        assert_eq!(ledger.held_locks(), 0);
    }

    #[tokio::test]
    async fn test_mixed_report_sequence() {
        let ledger = ledger();
        let mut rows = Vec::new();
        for report_type in [
            ReportType::Legitimate,
            ReportType::Spam,
            ReportType::Spam,
            ReportType::Legitimate,
        ] {
            let row = ledger
                .report("mixed@example.com", report_type, None)
                .await
                .unwrap();
            assert!(row.report_count <= row.total_reports);
            rows.push(row);
        }

        let totals: Vec<u32> = rows.iter().map(|row| row.total_reports).collect();
        assert_eq!(totals, vec![1, 2, 3, 4]);

        let last = ledger.get_by_email("mixed@example.com").await.unwrap().unwrap();
        assert_eq!(last.total_reports, 4);
        assert_eq!(last.report_type, ReportType::Legitimate);
        assert_eq!(last.report_count, 1);
        assert!(last.report_count <= last.total_reports);
    }

    #[tokio::test]
    async fn test_most_reported_order() {
        let ledger = ledger();
        ledger.report("once.test", ReportType::Spam, None).await.unwrap();
        for _ in 0..3 {
            ledger.report("thrice.test", ReportType::Spam, None).await.unwrap();
        }

        let page = ledger.most_reported(&PageRequest::default()).await.unwrap();
        assert_eq!(page.total, 2);
        assert_eq!(page.items[0].email, "thrice.test");
        assert_eq!(page.items[1].email, "once.test");
    }
}
