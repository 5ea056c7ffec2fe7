/// Address parsing, patterns, domain age, MX checks and the temp-domain
/// registry
pub mod validation;

/// # Reputation Ledger
///
/// Crowd-sourced reports keyed by full address or bare domain.
///
/// ## Confidence rules
/// - first report: confidence 60
/// - agreeing report: confidence = agreeing / total * 100
/// - contradicting report: type switches, count restarts at 1,
///   confidence drops by 30 (floor 30)
pub mod reputation;

/// Post-processing step that folds community reports into a result.
pub mod community;

/// # Scoring Engine
///
/// Orchestrates the registry, pattern matcher, deliverability check, domain
/// age estimate and reputation ledger into one trust score.
pub mod scoring;
