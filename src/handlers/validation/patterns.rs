//! Fixed email patterns and the username-entropy heuristic
//!
//! Patterns are evaluated in declaration order and the first match wins.
//! Keyword patterns come first and run over the whole `username@domain`
//! address, then username shape patterns run over the local part.

use crate::error::Result;
use regex::Regex;
use tracing::debug;

pub const RANDOM_USERNAME_LABEL: &str = "Username appears randomly generated";
pub const SUSPICIOUS_USERNAME_LABEL: &str = "Username has suspicious pattern";
pub const RANDOM_USERNAME_PENALTY: i32 = 35;
pub const SUSPICIOUS_USERNAME_PENALTY: i32 = 20;

/// Keywords that mark a disposable-mail address, with the regex that finds them.
const KEYWORDS: &[(&str, &str)] = &[
    ("temp", r"temp"),
    ("disposable", r"disposable"),
    ("throwaway", r"throwaway"),
    ("guerrilla", r"guerrilla"),
    ("mailinator", r"mailinator"),
    ("yopmail", r"yopmail"),
    ("10minute", r"10minute"),
    ("discard", r"discard"),
    ("nada", r"nada"),
];

/// Username shapes; every regex in a row must match.
const USERNAME_SHAPES: &[(&str, &[&str])] = &[
    ("Username contains a long digit sequence", &[r"\d{6,}"]),
    ("Username has a high digit ratio", &[r"^[a-z]{1,3}\d{5,}$"]),
    (
        "Username alternates letter and digit blocks",
        &[r"^(?:[a-z]+\d+){3,}[a-z]*$"],
    ),
    (
        "Username is a high-entropy alphanumeric string",
        &[r"^[a-z0-9]{10,}$", r"[a-z]", r"\d"],
    ),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternScope {
    /// Full address in [`PatternMatcher::first_match`], bare domain in
    /// [`PatternMatcher::matches_domain`]
    Keyword,
    /// Local part only
    Username,
}

/// One labelled entry of the ordered pattern list.
#[derive(Debug, Clone)]
pub struct Pattern {
    pub label: String,
    pub scope: PatternScope,
    rules: Vec<Regex>,
}

impl Pattern {
    fn new(label: String, scope: PatternScope, rules: &[&str]) -> Result<Self> {
        let rules = rules
            .iter()
            .map(|rule| Regex::new(rule))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Self {
            label,
            scope,
            rules,
        })
    }

    pub fn is_match(&self, subject: &str) -> bool {
        self.rules.iter().all(|rule| rule.is_match(subject))
    }
}

/// Entropy bonus for usernames of a given shape at a given provider.
#[derive(Debug, Clone)]
pub struct ProviderRule {
    pub domain: String,
    pub username_shape: Regex,
    pub bonus: u32,
}

impl ProviderRule {
    pub fn new(domain: &str, username_shape: &str, bonus: u32) -> Result<Self> {
        Ok(Self {
            domain: domain.to_lowercase(),
            username_shape: Regex::new(username_shape)?,
            bonus,
        })
    }

    /// Guerrilla Mail hands out `sharklasers.com` aliases made of a short word
    /// and optional digits.
    pub fn defaults() -> Result<Vec<Self>> {
        Ok(vec![Self::new("sharklasers.com", r"^[a-z]{6,12}\d*$", 5)?])
    }

    fn applies(&self, username: &str, domain: &str) -> bool {
        self.domain == domain && self.username_shape.is_match(username)
    }
}

/// Result of the username-entropy heuristic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntropyVerdict {
    pub score: u32,
    pub penalty: i32,
    pub label: Option<&'static str>,
}

pub struct PatternMatcher {
    patterns: Vec<Pattern>,
    provider_rules: Vec<ProviderRule>,
    digit_run: Regex,
}

impl PatternMatcher {
    /// Builds the matcher with the fixed pattern list and default provider rules.
    ///
    /// # Errors
    /// [`crate::error::Error::Pattern`] if a regex fails to compile.
    pub fn new() -> Result<Self> {
        Self::with_provider_rules(ProviderRule::defaults()?)
    }

    pub fn with_provider_rules(provider_rules: Vec<ProviderRule>) -> Result<Self> {
        let mut patterns = Vec::with_capacity(KEYWORDS.len() + USERNAME_SHAPES.len());
        for (keyword, regex) in KEYWORDS {
            patterns.push(Pattern::new(
                format!("Matches known temporary email pattern ({keyword})"),
                PatternScope::Keyword,
                &[*regex],
            )?);
        }
        for (label, rules) in USERNAME_SHAPES {
            patterns.push(Pattern::new(
                label.to_string(),
                PatternScope::Username,
                rules,
            )?);
        }

        debug!(
            "Pattern matcher initialized with {} patterns and {} provider rules",
            patterns.len(),
            provider_rules.len()
        );

        Ok(Self {
            patterns,
            provider_rules,
            digit_run: Regex::new(r"\d{4,}")?,
        })
    }

    /// Label of the first pattern matching the address, if any.
    ///
    /// Keyword patterns see the full `username@domain` address, so a keyword
    /// in either part counts.
    ///
    /// # Arguments
    /// * `username` - Lowercased local part
    /// * `domain` - Lowercased domain
    ///
    /// # Returns
    /// The label of the first matching pattern in declaration order.
    pub fn first_match(&self, username: &str, domain: &str) -> Option<&str> {
        let email = format!("{username}@{domain}");
        self.patterns
            .iter()
            .find(|pattern| match pattern.scope {
                PatternScope::Keyword => pattern.is_match(&email),
                PatternScope::Username => pattern.is_match(username),
            })
            .map(|pattern| pattern.label.as_str())
    }

    /// Whether any keyword pattern matches the bare `domain`.
    pub fn matches_domain(&self, domain: &str) -> bool {
        self.patterns
            .iter()
            .filter(|pattern| pattern.scope == PatternScope::Keyword)
            .any(|pattern| pattern.is_match(domain))
    }

    /// Scores how random a username looks.
    ///
    /// Length, letter/digit mixing, digit density and digit runs each add
    /// points, plus any matching provider rule bonus. A score of 5 or more is
    /// treated as randomly generated, 3 or 4 as suspicious.
    pub fn username_entropy(&self, username: &str, domain: &str) -> EntropyVerdict {
        let length = username.chars().count();
        let digits = username.chars().filter(|c| c.is_ascii_digit()).count();
        let has_letters = username.chars().any(|c| c.is_alphabetic());

        let mut score = 0;

        if length > 12 {
            score += 2;
        } else if length > 8 {
            score += 1;
        }

        if has_letters && digits > 0 {
            score += 2;
        }

        if length > 0 && digits as f64 / length as f64 > 0.4 {
            score += 2;
        } else if digits >= 4 {
            score += 1;
        }

        if self.digit_run.is_match(username) {
            score += 3;
        }

        score += self
            .provider_rules
            .iter()
            .filter(|rule| rule.applies(username, domain))
            .map(|rule| rule.bonus)
            .sum::<u32>();

        let (penalty, label) = match score {
            s if s >= 5 => (RANDOM_USERNAME_PENALTY, Some(RANDOM_USERNAME_LABEL)),
            3 | 4 => (SUSPICIOUS_USERNAME_PENALTY, Some(SUSPICIOUS_USERNAME_LABEL)),
            _ => (0, None),
        };

        EntropyVerdict {
            score,
            penalty,
            label,
        }
    }
}
