use crate::error::Error;
use crate::models::{
    BulkItem, EmailReputation, ItemError, Page, PageRequest, ReportType, VerificationResult,
};
use crate::models::email::BulkEmailResponse;
use crate::state::AppState;
use async_graphql::{Context, Enum, ErrorExtensions, Object, Result, SimpleObject};
use chrono::{DateTime, Utc};

fn gql(err: Error) -> async_graphql::Error {
    err.extend()
}

/// Scoring outcome for one address
#[derive(SimpleObject, Clone, Debug, PartialEq)]
pub struct TrustResult {
    pub email: String,
    pub is_temp_email: bool,
    /// 0 (certainly disposable) to 100 (certainly legitimate)
    pub trust_score: i32,
    pub domain_age: String,
    pub has_mx_records: bool,
    pub pattern_match: String,
}

impl From<VerificationResult> for TrustResult {
    fn from(result: VerificationResult) -> Self {
        Self {
            email: result.email,
            is_temp_email: result.is_temp_email,
            trust_score: result.trust_score,
            domain_age: result.domain_age,
            has_mx_records: result.has_mx_records,
            pattern_match: result.pattern_match,
        }
    }
}

#[derive(SimpleObject, Clone, Debug)]
pub struct TrustError {
    /// Error code such as INVALID_INPUT
    pub code: String,
    pub message: String,
}

impl From<ItemError> for TrustError {
    fn from(error: ItemError) -> Self {
        Self {
            code: error.code,
            message: error.message,
        }
    }
}

/// One entry of a bulk verification, carrying either a result or an error
#[derive(SimpleObject)]
pub struct BulkTrustItem {
    pub email: String,
    pub result: Option<TrustResult>,
    pub error: Option<TrustError>,
}

impl From<BulkItem> for BulkTrustItem {
    fn from(item: BulkItem) -> Self {
        Self {
            email: item.email,
            result: item.result.map(TrustResult::from),
            error: item.error.map(TrustError::from),
        }
    }
}

#[derive(SimpleObject)]
pub struct BulkTrustResponse {
    pub results: Vec<BulkTrustItem>,
    pub temp_count: i32,
    pub failed_count: i32,
}

impl From<BulkEmailResponse> for BulkTrustResponse {
    fn from(response: BulkEmailResponse) -> Self {
        Self {
            results: response.results.into_iter().map(BulkTrustItem::from).collect(),
            temp_count: i32::try_from(response.temp_count).unwrap_or(i32::MAX),
            failed_count: i32::try_from(response.failed_count).unwrap_or(i32::MAX),
        }
    }
}

#[derive(Enum, Copy, Clone, Debug, Eq, PartialEq)]
pub enum ReportKind {
    Legitimate,
    Temporary,
    Suspicious,
    Phishing,
    Spam,
}

impl From<ReportKind> for ReportType {
    fn from(kind: ReportKind) -> Self {
        match kind {
            ReportKind::Legitimate => ReportType::Legitimate,
            ReportKind::Temporary => ReportType::Temporary,
            ReportKind::Suspicious => ReportType::Suspicious,
            ReportKind::Phishing => ReportType::Phishing,
            ReportKind::Spam => ReportType::Spam,
        }
    }
}

impl From<ReportType> for ReportKind {
    fn from(report_type: ReportType) -> Self {
        match report_type {
            ReportType::Legitimate => ReportKind::Legitimate,
            ReportType::Temporary => ReportKind::Temporary,
            ReportType::Suspicious => ReportKind::Suspicious,
            ReportType::Phishing => ReportKind::Phishing,
            ReportType::Spam => ReportKind::Spam,
        }
    }
}

/// Crowd-sourced reputation of an address or domain
#[derive(SimpleObject)]
pub struct Reputation {
    pub email: String,
    pub is_full_email: bool,
    pub report_type: ReportKind,
    pub report_count: u32,
    pub total_reports: u32,
    pub confidence_score: i32,
    pub first_reported_at: DateTime<Utc>,
    pub last_reported_at: DateTime<Utc>,
    pub metadata: Option<String>,
}

impl From<EmailReputation> for Reputation {
    fn from(row: EmailReputation) -> Self {
        Self {
            email: row.email,
            is_full_email: row.is_full_email,
            report_type: row.report_type.into(),
            report_count: row.report_count,
            total_reports: row.total_reports,
            confidence_score: row.confidence_score,
            first_reported_at: row.first_reported_at,
            last_reported_at: row.last_reported_at,
            metadata: row.metadata,
        }
    }
}

#[derive(SimpleObject)]
pub struct ReputationPage {
    pub items: Vec<Reputation>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
}

impl From<Page<EmailReputation>> for ReputationPage {
    fn from(page: Page<EmailReputation>) -> Self {
        let page = page.map(Reputation::from);
        Self {
            items: page.items,
            total: page.total,
            page: page.page,
            limit: page.limit,
        }
    }
}

/// Verification, temp-domain and reputation queries
#[derive(Default)]
pub struct TrustQuery;

#[Object]
impl TrustQuery {
    /// Scores one address. With `community` set, community reports are
    /// folded into the result.
    async fn verify_email(
        &self,
        ctx: &Context<'_>,
        email: String,
        community: Option<bool>,
    ) -> Result<TrustResult> {
        let state = ctx.data::<AppState>()?;
        let result = if community.unwrap_or(false) {
            state.engine.verify_with_community(&email).await
        } else {
            state.engine.verify(&email).await
        }
        .map_err(gql)?;

        state.record_verification(&result, None).await;
        Ok(result.into())
    }

    /// Scores many addresses; malformed ones carry an error instead of a
    /// result.
    async fn verify_emails(
        &self,
        ctx: &Context<'_>,
        emails: Vec<String>,
    ) -> Result<BulkTrustResponse> {
        let state = ctx.data::<AppState>()?;
        let items = state.engine.verify_many(&emails).await;
        for result in items.iter().filter_map(|item| item.result.as_ref()) {
            state.record_verification(result, None).await;
        }
        Ok(BulkEmailResponse::from_items(items).into())
    }

    async fn is_temp_domain(&self, ctx: &Context<'_>, domain: String) -> Result<bool> {
        let state = ctx.data::<AppState>()?;
        state.registry.is_temp_domain(&domain).await.map_err(gql)
    }

    /// Reputation row for a full address or bare domain, null when unreported
    async fn reputation(&self, ctx: &Context<'_>, target: String) -> Result<Option<Reputation>> {
        let state = ctx.data::<AppState>()?;
        let row = state.ledger.get(&target).await.map_err(gql)?;
        Ok(row.map(Reputation::from))
    }

    async fn most_reported(
        &self,
        ctx: &Context<'_>,
        page: Option<u32>,
        limit: Option<u32>,
    ) -> Result<ReputationPage> {
        let state = ctx.data::<AppState>()?;
        let page = state
            .ledger
            .most_reported(&PageRequest { page, limit })
            .await
            .map_err(gql)?;
        Ok(page.into())
    }
}

#[derive(Default)]
pub struct TrustMutation;

#[Object]
impl TrustMutation {
    /// Records one community report and returns the updated row
    async fn report_email(
        &self,
        ctx: &Context<'_>,
        target: String,
        report_type: ReportKind,
        metadata: Option<String>,
    ) -> Result<Reputation> {
        let state = ctx.data::<AppState>()?;
        let row = state
            .ledger
            .report(&target, report_type.into(), metadata)
            .await
            .map_err(gql)?;
        Ok(row.into())
    }
}
