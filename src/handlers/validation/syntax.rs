use crate::error::{Error, Result};

/// Lowercased username and domain of an address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailParts {
    pub username: String,
    pub domain: String,
}

/// Splits an address into username and domain.
///
/// The input is trimmed and split on the **last** `@`, so quoted local parts
/// containing `@` keep their domain. Both halves are lowercased.
///
/// # Examples
/// ```
/// use email_trust::handlers::validation::syntax::parse_email;
///
/// let parts = parse_email("  John.Doe@Example.COM ").unwrap();
/// assert_eq!(parts.username, "john.doe");
/// assert_eq!(parts.domain, "example.com");
/// assert!(parse_email("no-at-sign").is_err());
/// ```
///
/// # Errors
/// [`Error::InvalidInput`] when the `@` is missing or either side is empty.
pub fn parse_email(email: &str) -> Result<EmailParts> {
    let trimmed = email.trim();
    let (username, domain) = trimmed
        .rsplit_once('@')
        .ok_or_else(|| Error::InvalidInput("Invalid email format: missing '@'".to_string()))?;

    if username.is_empty() {
        return Err(Error::InvalidInput(
            "Invalid email format: empty username".to_string(),
        ));
    }
    if domain.is_empty() {
        return Err(Error::InvalidInput(
            "Invalid email format: empty domain".to_string(),
        ));
    }

    Ok(EmailParts {
        username: username.to_lowercase(),
        domain: domain.to_lowercase(),
    })
}

/// Trims and lowercases a domain and checks it is a plausible host name.
///
/// # Errors
/// [`Error::InvalidInput`] for empty or malformed domains.
pub fn normalize_domain(domain: &str) -> Result<String> {
    let normalized = domain.trim().trim_end_matches('.').to_lowercase();
    if normalized.is_empty() {
        return Err(Error::InvalidInput("domain must not be empty".to_string()));
    }
    if !is_valid_domain_name(&normalized) {
        return Err(Error::InvalidInput(format!(
            "'{normalized}' is not a valid domain"
        )));
    }
    Ok(normalized)
}

/// Validates internationalized domain names per RFC 5890 and RFC 6531.
///
/// At least two labels are required; each label is 1-63 characters of
/// letters, digits or inner hyphens.
pub fn is_valid_domain_name(domain: &str) -> bool {
    if domain.len() > 253 {
        return false;
    }
    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2
        && labels.iter().all(|label| {
            !label.is_empty()
                && label.chars().count() <= 63
                && !label.starts_with('-')
                && !label.ends_with('-')
                && label.chars().all(|c| c.is_alphanumeric() || c == '-')
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_last_at() {
        let parts = parse_email("\"odd@local\"@example.com").unwrap();
        assert_eq!(parts.username, "\"odd@local\"");
        assert_eq!(parts.domain, "example.com");
    }

    #[test]
    fn lowercases_both_halves() {
        let parts = parse_email("User.Name@Mailinator.COM").unwrap();
        assert_eq!(parts.username, "user.name");
        assert_eq!(parts.domain, "mailinator.com");
    }

    #[test]
    fn invalid_missing_at() {
        assert!(matches!(
            parse_email("missing.example.com"),
            Err(Error::InvalidInput(_))
        ));
        assert!(parse_email("missing@").is_err());
        assert!(parse_email("@missing.com").is_err());
        assert!(parse_email("   ").is_err());
        assert!(parse_email("@").is_err());
    }

    #[test]
    fn valid_domains() {
        assert!(is_valid_domain_name("example.com"));
        assert!(is_valid_domain_name("mail.example.co.uk"));
        assert!(is_valid_domain_name("10minutemail.com"));
        assert!(is_valid_domain_name("exämple.中国"));
    }

    #[test]
    fn invalid_domains() {
        assert!(!is_valid_domain_name("localhost"));
        assert!(!is_valid_domain_name("-hyphenstart.com"));
        assert!(!is_valid_domain_name("hyphenend-.com"));
        assert!(!is_valid_domain_name(".leadingdot.com"));
        assert!(!is_valid_domain_name("double..dot.com"));
        assert!(!is_valid_domain_name("_invalidchar.com"));
        assert!(!is_valid_domain_name(&format!("{}.com", "a".repeat(64))));
    }

    #[test]
    fn normalize_trims_and_lowercases() {
        assert_eq!(normalize_domain("  TrashMail.COM. ").unwrap(), "trashmail.com");
        assert!(matches!(normalize_domain(""), Err(Error::InvalidInput(_))));
        assert!(matches!(
            normalize_domain("not a domain"),
            Err(Error::InvalidInput(_))
        ));
    }
}
