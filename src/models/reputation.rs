use crate::error::Error;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

/// Confidence assigned to a freshly created reputation row.
pub const INITIAL_CONFIDENCE: i32 = 60;
/// Floor applied when a report contradicts the stored type.
pub const MIN_CONFLICT_CONFIDENCE: i32 = 30;
const CONFLICT_PENALTY: i32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ReportType {
    Legitimate,
    Temporary,
    Suspicious,
    Phishing,
    Spam,
}

impl ReportType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportType::Legitimate => "legitimate",
            ReportType::Temporary => "temporary",
            ReportType::Suspicious => "suspicious",
            ReportType::Phishing => "phishing",
            ReportType::Spam => "spam",
        }
    }

    pub fn is_legitimate(&self) -> bool {
        matches!(self, ReportType::Legitimate)
    }
}

impl fmt::Display for ReportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "legitimate" => Ok(ReportType::Legitimate),
            "temporary" => Ok(ReportType::Temporary),
            "suspicious" => Ok(ReportType::Suspicious),
            "phishing" => Ok(ReportType::Phishing),
            "spam" => Ok(ReportType::Spam),
            other => Err(Error::InvalidInput(format!(
                "unknown report type '{other}'"
            ))),
        }
    }
}

/// Crowd-sourced reputation of a full address or a bare domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmailReputation {
    pub id: String,
    /// Normalized target: a full address or a bare domain
    pub email: String,
    pub is_full_email: bool,
    /// Current dominant report type
    pub report_type: ReportType,
    /// Consecutive reports agreeing with `report_type`
    pub report_count: u32,
    pub total_reports: u32,
    pub confidence_score: i32,
    pub first_reported_at: DateTime<Utc>,
    pub last_reported_at: DateTime<Utc>,
    pub metadata: Option<String>,
}

impl EmailReputation {
    /// Row created by the first report against `target`.
    pub fn first_report(
        target: &str,
        report_type: ReportType,
        metadata: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: target.to_string(),
            is_full_email: target.contains('@'),
            report_type,
            report_count: 1,
            total_reports: 1,
            confidence_score: INITIAL_CONFIDENCE,
            first_reported_at: now,
            last_reported_at: now,
            metadata: metadata.filter(|m| !m.trim().is_empty()),
        }
    }

    /// Folds one more report into the row.
    ///
    /// An agreeing report raises confidence to the agreement ratio. A
    /// contradicting one switches the stored type, restarts `report_count`
    /// and drops confidence by 30 with a floor of 30.
    pub fn apply_report(
        &mut self,
        report_type: ReportType,
        metadata: Option<String>,
        now: DateTime<Utc>,
    ) {
        self.total_reports += 1;

        if report_type == self.report_type {
            self.report_count += 1;
            let ratio = self.report_count as f64 / self.total_reports as f64;
            self.confidence_score = ((ratio * 100.0).round() as i32).min(100);
        } else {
            self.report_type = report_type;
            self.report_count = 1;
            self.confidence_score =
                (self.confidence_score - CONFLICT_PENALTY).max(MIN_CONFLICT_CONFIDENCE);
        }

        self.last_reported_at = now;

        if let Some(extra) = metadata.filter(|m| !m.trim().is_empty()) {
            self.metadata = Some(match self.metadata.take() {
                Some(existing) => format!("{existing},{extra}"),
                None => extra,
            });
        }
    }
}
