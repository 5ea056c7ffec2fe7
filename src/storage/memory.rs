use super::Store;
use crate::error::{Error, Result};
use crate::models::{EmailReputation, TempDomain, Verification};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Default)]
struct DomainTable {
    /// Ids in insertion order
    order: Vec<String>,
    by_id: HashMap<String, TempDomain>,
    /// domain -> id
    by_name: HashMap<String, String>,
}

/// Process-local store; contents are lost on restart.
#[derive(Default)]
pub struct InMemoryStore {
    domains: RwLock<DomainTable>,
    verifications: RwLock<Vec<Verification>>,
    reputations: RwLock<HashMap<(String, bool), EmailReputation>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn page_of<T: Clone>(rows: impl Iterator<Item = T>, offset: u64, limit: u32) -> Vec<T> {
    rows.skip(offset as usize).take(limit as usize).collect()
}

#[async_trait]
impl Store for InMemoryStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn find_temp_domain(&self, domain: &str) -> Result<Option<TempDomain>> {
        let table = self.domains.read().await;
        Ok(table
            .by_name
            .get(domain)
            .and_then(|id| table.by_id.get(id))
            .cloned())
    }

    async fn get_temp_domain(&self, id: &str) -> Result<Option<TempDomain>> {
        Ok(self.domains.read().await.by_id.get(id).cloned())
    }

    async fn insert_temp_domain(&self, entry: TempDomain) -> Result<TempDomain> {
        let mut table = self.domains.write().await;
        if table.by_name.contains_key(&entry.domain) {
            return Err(Error::Conflict(format!(
                "domain '{}' is already registered",
                entry.domain
            )));
        }
        table.order.push(entry.id.clone());
        table.by_name.insert(entry.domain.clone(), entry.id.clone());
        table.by_id.insert(entry.id.clone(), entry.clone());
        Ok(entry)
    }

    async fn rename_temp_domain(&self, id: &str, domain: &str) -> Result<Option<TempDomain>> {
        let mut table = self.domains.write().await;
        let Some(current) = table.by_id.get(id).map(|entry| entry.domain.clone()) else {
            return Ok(None);
        };
        if current == domain {
            return Ok(table.by_id.get(id).cloned());
        }
        if table.by_name.contains_key(domain) {
            return Err(Error::Conflict(format!(
                "domain '{domain}' is already registered"
            )));
        }

        table.by_name.remove(&current);
        table.by_name.insert(domain.to_string(), id.to_string());
        let updated = table.by_id.get_mut(id).map(|entry| {
            entry.domain = domain.to_string();
            entry.clone()
        });
        Ok(updated)
    }

    async fn delete_temp_domain(&self, id: &str) -> Result<bool> {
        let mut table = self.domains.write().await;
        let Some(entry) = table.by_id.remove(id) else {
            return Ok(false);
        };
        table.by_name.remove(&entry.domain);
        table.order.retain(|existing| existing != id);
        Ok(true)
    }

    async fn list_temp_domains(&self, offset: u64, limit: u32) -> Result<(Vec<TempDomain>, u64)> {
        let table = self.domains.read().await;
        let rows = table
            .order
            .iter()
            .rev()
            .filter_map(|id| table.by_id.get(id).cloned());
        Ok((page_of(rows, offset, limit), table.order.len() as u64))
    }

    async fn record_verification(&self, row: Verification) -> Result<()> {
        self.verifications.write().await.push(row);
        Ok(())
    }

    async fn list_verifications(
        &self,
        user_id: Option<String>,
        offset: u64,
        limit: u32,
    ) -> Result<(Vec<Verification>, u64)> {
        let rows = self.verifications.read().await;
        let matching: Vec<&Verification> = rows
            .iter()
            .rev()
            .filter(|row| match &user_id {
                Some(user) => row.user_id.as_deref() == Some(user.as_str()),
                None => true,
            })
            .collect();
        let total = matching.len() as u64;
        Ok((page_of(matching.into_iter().cloned(), offset, limit), total))
    }

    async fn find_reputation(
        &self,
        target: &str,
        is_full_email: bool,
    ) -> Result<Option<EmailReputation>> {
        Ok(self
            .reputations
            .read()
            .await
            .get(&(target.to_string(), is_full_email))
            .cloned())
    }

    async fn save_reputation(&self, row: &EmailReputation) -> Result<()> {
        self.reputations
            .write()
            .await
            .insert((row.email.clone(), row.is_full_email), row.clone());
        Ok(())
    }

    async fn most_reported(
        &self,
        offset: u64,
        limit: u32,
    ) -> Result<(Vec<EmailReputation>, u64)> {
        let rows = self.reputations.read().await;
        let mut sorted: Vec<&EmailReputation> = rows.values().collect();
        sorted.sort_by(|a, b| {
            b.total_reports
                .cmp(&a.total_reports)
                .then_with(|| b.last_reported_at.cmp(&a.last_reported_at))
                .then_with(|| a.email.cmp(&b.email))
        });
        let total = sorted.len() as u64;
        Ok((page_of(sorted.into_iter().cloned(), offset, limit), total))
    }
}
