use crate::models::reputation::ReportType;
use crate::models::verification::BulkItem;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct EmailRequest {
    pub email: String,
}

#[derive(Deserialize, ToSchema)]
pub struct BulkEmailRequest {
    pub emails: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct BulkEmailResponse {
    pub results: Vec<BulkItem>,
    /// Items classified as temporary
    pub temp_count: usize,
    /// Items that could not be scored
    pub failed_count: usize,
}

impl BulkEmailResponse {
    pub fn from_items(results: Vec<BulkItem>) -> Self {
        let temp_count = results
            .iter()
            .filter(|item| item.result.as_ref().is_some_and(|r| r.is_temp_email))
            .count();
        let failed_count = results.iter().filter(|item| !item.is_ok()).count();
        Self {
            results,
            temp_count,
            failed_count,
        }
    }
}

#[derive(Deserialize, ToSchema)]
pub struct DomainRequest {
    pub domain: String,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DomainCheckResponse {
    pub domain: String,
    pub is_temp: bool,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportRequest {
    /// Full address or bare domain
    pub target: String,
    pub report_type: ReportType,
    pub metadata: Option<String>,
}
