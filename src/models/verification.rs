use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Outcome of scoring a single email address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerificationResult {
    pub email: String,
    pub is_temp_email: bool,
    /// 0 (certainly disposable) to 100 (certainly legitimate)
    pub trust_score: i32,
    pub domain_age: String,
    pub has_mx_records: bool,
    /// Human-readable reason behind the dominant score adjustments
    pub pattern_match: String,
}

/// Append-only audit row written for each persisted scoring invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Verification {
    pub id: String,
    pub email: String,
    pub is_temp_email: bool,
    pub trust_score: i32,
    pub domain_age: String,
    pub has_mx_records: bool,
    pub pattern_match: String,
    pub user_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Verification {
    pub fn record(result: &VerificationResult, user_id: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: result.email.clone(),
            is_temp_email: result.is_temp_email,
            trust_score: result.trust_score,
            domain_age: result.domain_age.clone(),
            has_mx_records: result.has_mx_records,
            pattern_match: result.pattern_match.clone(),
            user_id,
            created_at: Utc::now(),
        }
    }
}

/// Per-item error marker in a bulk verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ItemError {
    pub code: String,
    pub message: String,
}

/// One entry of a bulk verification: either a result or an error marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BulkItem {
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<VerificationResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ItemError>,
}

impl BulkItem {
    pub fn is_ok(&self) -> bool {
        self.result.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_result() -> VerificationResult {
        VerificationResult {
            email: "user@example.com".to_string(),
            is_temp_email: false,
            trust_score: 90,
            domain_age: "Old (5+ years)".to_string(),
            has_mx_records: true,
            pattern_match: "No patterns detected".to_string(),
        }
    }

    #[test]
    fn test_result_field_names() {
        let value = serde_json::to_value(sample_result()).unwrap();
        assert_eq!(value["isTempEmail"], false);
        assert_eq!(value["trustScore"], 90);
        assert_eq!(value["hasMxRecords"], true);
        assert_eq!(value["patternMatch"], "No patterns detected");
    }

    #[test]
    fn test_record_copies_result() {
        let result = sample_result();
        let row = Verification::record(&result, Some("user-1".to_string()));

        assert_eq!(row.email, result.email);
        assert_eq!(row.trust_score, 90);
        assert_eq!(row.user_id.as_deref(), Some("user-1"));

        let value = serde_json::to_value(&row).unwrap();
        assert_eq!(value["userId"], "user-1");
        assert!(value["createdAt"].is_string());
    }

    #[test]
    fn test_bulk_item_omits_empty_side() {
        let item = BulkItem {
            email: "broken".to_string(),
            result: None,
            error: Some(ItemError {
                code: "INVALID_INPUT".to_string(),
                message: "missing '@'".to_string(),
            }),
        };
        let value = serde_json::to_value(&item).unwrap();
        assert!(value.get("result").is_none());
        assert_eq!(value["error"]["code"], "INVALID_INPUT");
        assert!(!item.is_ok());
    }
}
