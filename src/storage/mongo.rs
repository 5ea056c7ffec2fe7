use super::Store;
use crate::error::{Error, Result};
use crate::models::{EmailReputation, TempDomain, Verification};
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{Document, doc};
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::{IndexOptions, ReturnDocument};
use mongodb::{Client, Collection, IndexModel};
use tracing::debug;

const TEMP_DOMAINS: &str = "temp_domains";
const VERIFICATIONS: &str = "verifications";
const REPUTATIONS: &str = "reputations";

const DUPLICATE_KEY: i32 = 11000;

/// Store backed by a MongoDB database.
///
/// Rows are stored with the same camelCase field names the REST surface
/// uses. Newest-first listings sort on the generated `_id`.
pub struct MongoStore {
    temp_domains: Collection<TempDomain>,
    verifications: Collection<Verification>,
    reputations: Collection<EmailReputation>,
}

impl MongoStore {
    /// Connects and makes sure the unique indexes exist.
    ///
    /// # Arguments
    /// * `uri` - MongoDB connection string, e.g. `mongodb://localhost:27017`
    /// * `database` - Name of the database holding the three collections
    ///
    /// # Returns
    /// * `Ok(MongoStore)` once the client is up and the indexes are in place
    /// * `Err` if the URI is invalid or index creation fails
    ///
    /// # Errors
    /// [`Error::Storage`] for any driver failure.
    pub async fn connect(uri: &str, database: &str) -> Result<Self> {
        let client = Client::with_uri_str(uri).await?;
        let db = client.database(database);

        let store = Self {
            temp_domains: db.collection(TEMP_DOMAINS),
            verifications: db.collection(VERIFICATIONS),
            reputations: db.collection(REPUTATIONS),
        };
        store.ensure_indexes().await?;
        Ok(store)
    }

    async fn ensure_indexes(&self) -> Result<()> {
        let unique = || IndexOptions::builder().unique(true).build();

        self.temp_domains
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "domain": 1 })
                    .options(unique())
                    .build(),
            )
            .await?;
        self.temp_domains
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "id": 1 })
                    .options(unique())
                    .build(),
            )
            .await?;
        self.reputations
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "email": 1, "isFullEmail": 1 })
                    .options(unique())
                    .build(),
            )
            .await?;
        self.reputations
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "totalReports": -1 })
                    .build(),
            )
            .await?;
        self.verifications
            .create_index(IndexModel::builder().keys(doc! { "userId": 1 }).build())
            .await?;

        debug!("MongoDB indexes ensured");
        Ok(())
    }
}

/// Whether a driver error is a unique-index violation, whether it surfaced
/// from a plain write or from a `findAndModify` command.
fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(e)) => e.code == DUPLICATE_KEY,
        ErrorKind::Command(e) => e.code == DUPLICATE_KEY,
        _ => false,
    }
}

fn conflict(domain: &str) -> Error {
    Error::Conflict(format!("domain '{domain}' is already registered"))
}

#[async_trait]
impl Store for MongoStore {
    fn backend_name(&self) -> &'static str {
        "mongodb"
    }

    async fn find_temp_domain(&self, domain: &str) -> Result<Option<TempDomain>> {
        Ok(self
            .temp_domains
            .find_one(doc! { "domain": domain })
            .await?)
    }

    async fn get_temp_domain(&self, id: &str) -> Result<Option<TempDomain>> {
        Ok(self.temp_domains.find_one(doc! { "id": id }).await?)
    }

    /// Inserts a registry entry.
    ///
    /// # Errors
    /// [`Error::Conflict`] when the unique `domain` index rejects the row.
    async fn insert_temp_domain(&self, entry: TempDomain) -> Result<TempDomain> {
        match self.temp_domains.insert_one(&entry).await {
            Ok(_) => Ok(entry),
            Err(e) if is_duplicate_key(&e) => Err(conflict(&entry.domain)),
            Err(e) => Err(e.into()),
        }
    }

    /// Renames an entry in place and returns it as stored afterwards.
    ///
    /// # Returns
    /// * `Ok(Some(entry))` with the new name
    /// * `Ok(None)` if no entry has `id`
    ///
    /// # Errors
    /// [`Error::Conflict`] when another entry already uses `domain`.
    async fn rename_temp_domain(&self, id: &str, domain: &str) -> Result<Option<TempDomain>> {
        let result = self
            .temp_domains
            .find_one_and_update(doc! { "id": id }, doc! { "$set": { "domain": domain } })
            .return_document(ReturnDocument::After)
            .await;

        match result {
            Ok(updated) => Ok(updated),
            Err(e) if is_duplicate_key(&e) => Err(conflict(domain)),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete_temp_domain(&self, id: &str) -> Result<bool> {
        let result = self.temp_domains.delete_one(doc! { "id": id }).await?;
        Ok(result.deleted_count > 0)
    }

    async fn list_temp_domains(&self, offset: u64, limit: u32) -> Result<(Vec<TempDomain>, u64)> {
        let total = self.temp_domains.count_documents(doc! {}).await?;
        let items = self
            .temp_domains
            .find(doc! {})
            .sort(doc! { "_id": -1 })
            .skip(offset)
            .limit(i64::from(limit))
            .await?
            .try_collect()
            .await?;
        Ok((items, total))
    }

    async fn record_verification(&self, row: Verification) -> Result<()> {
        self.verifications.insert_one(&row).await?;
        Ok(())
    }

    async fn list_verifications(
        &self,
        user_id: Option<String>,
        offset: u64,
        limit: u32,
    ) -> Result<(Vec<Verification>, u64)> {
        let filter: Document = match user_id {
            Some(user) => doc! { "userId": user },
            None => doc! {},
        };
        let total = self.verifications.count_documents(filter.clone()).await?;
        let items = self
            .verifications
            .find(filter)
            .sort(doc! { "_id": -1 })
            .skip(offset)
            .limit(i64::from(limit))
            .await?
            .try_collect()
            .await?;
        Ok((items, total))
    }

    async fn find_reputation(
        &self,
        target: &str,
        is_full_email: bool,
    ) -> Result<Option<EmailReputation>> {
        Ok(self
            .reputations
            .find_one(doc! { "email": target, "isFullEmail": is_full_email })
            .await?)
    }

    /// Upserts the row keyed by `(email, isFullEmail)`.
    async fn save_reputation(&self, row: &EmailReputation) -> Result<()> {
        self.reputations
            .replace_one(
                doc! { "email": row.email.as_str(), "isFullEmail": row.is_full_email },
                row,
            )
            .upsert(true)
            .await?;
        Ok(())
    }

    async fn most_reported(
        &self,
        offset: u64,
        limit: u32,
    ) -> Result<(Vec<EmailReputation>, u64)> {
        let total = self.reputations.count_documents(doc! {}).await?;
        let items = self
            .reputations
            .find(doc! {})
            .sort(doc! { "totalReports": -1, "lastReportedAt": -1 })
            .skip(offset)
            .limit(i64::from(limit))
            .await?
            .try_collect()
            .await?;
        Ok((items, total))
    }
}
