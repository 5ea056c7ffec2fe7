use crate::models::{EmailReputation, VerificationResult};

const FLAGGED_PENALTY: i32 = 20;
const FLAGGED_FLOOR: i32 = 10;
const CONFIRMED_BONUS: i32 = 10;

/// Folds community reports into an already computed result.
///
/// A non-legitimate row with more than 3 reports and confidence above 70
/// forces the result to temporary and lowers the score by 20, never below
/// 10. A legitimate row with more than 5 reports and confidence above 80
/// raises the score by 10. Anything else leaves the result untouched.
pub fn apply_community_signal(
    mut result: VerificationResult,
    reputation: Option<&EmailReputation>,
) -> VerificationResult {
    let Some(reputation) = reputation else {
        return result;
    };

    let note = if !reputation.report_type.is_legitimate()
        && reputation.total_reports > 3
        && reputation.confidence_score > 70
    {
        result.is_temp_email = true;
        result.trust_score = (result.trust_score - FLAGGED_PENALTY).max(FLAGGED_FLOOR);
        format!("Flagged as {} by community reports", reputation.report_type)
    } else if reputation.report_type.is_legitimate()
        && reputation.total_reports > 5
        && reputation.confidence_score > 80
    {
        result.trust_score = (result.trust_score + CONFIRMED_BONUS).min(100);
        "Confirmed legitimate by community reports".to_string()
    } else {
        return result;
    };

    result.pattern_match = match result.pattern_match.as_str() {
        "" | "No patterns detected" => note,
        existing => format!("{existing}; {note}"),
    };
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ReportType;
    use chrono::Utc;

    fn scored(score: i32, is_temp: bool) -> VerificationResult {
        VerificationResult {
            email: "someone@example.com".to_string(),
            is_temp_email: is_temp,
            trust_score: score,
            domain_age: "Old (5+ years)".to_string(),
            has_mx_records: true,
            pattern_match: "No patterns detected".to_string(),
        }
    }

    fn reputation(report_type: ReportType, reports: u32) -> EmailReputation {
        let now = Utc::now();
        let mut row = EmailReputation::first_report("someone@example.com", report_type, None, now);
        for _ in 1..reports {
            row.apply_report(report_type, None, now);
        }
        row
    }

    #[test]
    fn test_no_reputation_is_identity() {
        assert_eq!(apply_community_signal(scored(90, false), None), scored(90, false));
    }

    #[test]
    fn test_flagged_by_community() {
        let row = reputation(ReportType::Phishing, 4);
        let adjusted = apply_community_signal(scored(90, false), Some(&row));

        assert!(adjusted.is_temp_email);
        assert_eq!(adjusted.trust_score, 70);
        assert_eq!(
            adjusted.pattern_match,
            "Flagged as phishing by community reports"
        );
    }

    #[test]
    fn test_flagged_score_floor() {
        let row = reputation(ReportType::Spam, 4);
        let adjusted = apply_community_signal(scored(15, true), Some(&row));
        assert_eq!(adjusted.trust_score, 10);
    }

    #[test]
    fn test_confirmed_by_community() {
        let row = reputation(ReportType::Legitimate, 6);
        let mut base = scored(85, false);
        base.pattern_match = "Known legitimate email provider".to_string();
        let adjusted = apply_community_signal(base, Some(&row));

        assert_eq!(adjusted.trust_score, 95);
        assert_eq!(
            adjusted.pattern_match,
            "Known legitimate email provider; Confirmed legitimate by community reports"
        );
    }

    #[test]
    fn test_below_thresholds_untouched() {
        let few = reputation(ReportType::Spam, 3);
        assert_eq!(apply_community_signal(scored(90, false), Some(&few)), scored(90, false));

        let few_legit = reputation(ReportType::Legitimate, 5);
        assert_eq!(
            apply_community_signal(scored(90, false), Some(&few_legit)),
            scored(90, false)
        );
    }
}
