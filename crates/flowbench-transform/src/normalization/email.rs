//! Email validation and normalization.

use serde::Serialize;

/// Consumer mail providers; their domains say nothing about a lead's company.
pub const FREE_EMAIL_PROVIDERS: &[&str] = &[
    "aol.com",
    "gmail.com",
    "gmx.com",
    "gmx.de",
    "googlemail.com",
    "hotmail.co.uk",
    "hotmail.com",
    "icloud.com",
    "live.com",
    "mac.com",
    "mail.com",
    "me.com",
    "msn.com",
    "outlook.com",
    "proton.me",
    "protonmail.com",
    "yahoo.co.uk",
    "yahoo.com",
    "yandex.com",
    "zoho.com",
];

const MAX_LOCAL_PART_LEN: usize = 64;
const MAX_DOMAIN_LEN: usize = 253;

/// Why an address failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EmailIssue {
    Empty,
    MissingAt,
    MultipleAt,
    InvalidLocalPart,
    InvalidDomain,
}

impl EmailIssue {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Empty => "empty email",
            Self::MissingAt => "missing @",
            Self::MultipleAt => "more than one @",
            Self::InvalidLocalPart => "invalid local part",
            Self::InvalidDomain => "invalid domain",
        }
    }
}

/// Outcome of validating one address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailCheck {
    pub is_valid: bool,
    /// Trimmed and lowercased input.
    pub normalized: String,
    pub domain: Option<String>,
    /// The domain, unless the address is invalid or uses a free provider.
    pub company_domain: Option<String>,
    /// Present iff the address is invalid.
    pub reason: Option<EmailIssue>,
}

/// Trims and lowercases an address. Idempotent.
pub fn normalize_email(value: &str) -> String {
    value.trim().to_lowercase()
}

pub fn is_free_provider(domain: &str) -> bool {
    FREE_EMAIL_PROVIDERS.contains(&domain)
}

/// Validates an address and derives its company domain.
pub fn validate_email(value: &str) -> EmailCheck {
    let normalized = normalize_email(value);
    match check_address(&normalized) {
        Ok(domain) => {
            let company_domain = (!is_free_provider(domain)).then(|| domain.to_string());
            EmailCheck {
                is_valid: true,
                domain: Some(domain.to_string()),
                company_domain,
                reason: None,
                normalized,
            }
        }
        Err(issue) => EmailCheck {
            is_valid: false,
            domain: normalized
                .rsplit_once('@')
                .map(|(_, domain)| domain.to_string())
                .filter(|domain| !domain.is_empty()),
            company_domain: None,
            reason: Some(issue),
            normalized,
        },
    }
}

/// Returns the domain of a normalized address.
fn check_address(address: &str) -> Result<&str, EmailIssue> {
    if address.is_empty() {
        return Err(EmailIssue::Empty);
    }
    let mut parts = address.split('@');
    let (Some(local), Some(domain)) = (parts.next(), parts.next()) else {
        return Err(EmailIssue::MissingAt);
    };
    if parts.next().is_some() {
        return Err(EmailIssue::MultipleAt);
    }
    if !is_valid_local_part(local) {
        return Err(EmailIssue::InvalidLocalPart);
    }
    if !is_valid_domain(domain) {
        return Err(EmailIssue::InvalidDomain);
    }
    Ok(domain)
}

fn is_valid_local_part(local: &str) -> bool {
    const ALLOWED_SYMBOLS: &str = ".!#$%&'*+/=?^_`{|}~-";
    !local.is_empty()
        && local.len() <= MAX_LOCAL_PART_LEN
        && !local.starts_with('.')
        && !local.ends_with('.')
        && !local.contains("..")
        && local
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || ALLOWED_SYMBOLS.contains(c))
}

fn is_valid_domain(domain: &str) -> bool {
    if domain.is_empty() || domain.len() > MAX_DOMAIN_LEN || !domain.contains('.') {
        return false;
    }
    let labels: Vec<&str> = domain.split('.').collect();
    let labels_ok = labels.iter().all(|label| {
        !label.is_empty()
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    });
    let tld_ok = labels
        .last()
        .is_some_and(|tld| tld.len() >= 2 && tld.chars().all(|c| c.is_ascii_alphabetic()));
    labels_ok && tld_ok
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn free_provider_has_no_company_domain() {
        let check = validate_email("  JOHN@GMAIL.COM ");
        assert!(check.is_valid);
        assert_eq!(check.normalized, "john@gmail.com");
        assert_eq!(check.domain.as_deref(), Some("gmail.com"));
        assert_eq!(check.company_domain, None);
        assert_eq!(check.reason, None);
    }

    #[test]
    fn business_domain_is_company_domain() {
        let check = validate_email("ana@acme.io");
        assert_eq!(check.company_domain.as_deref(), Some("acme.io"));
    }

    #[test]
    fn invalid_addresses_carry_reason() {
        let cases = [
            ("", EmailIssue::Empty),
            ("john.example.com", EmailIssue::MissingAt),
            ("a@b@c.com", EmailIssue::MultipleAt),
            (".john@acme.com", EmailIssue::InvalidLocalPart),
            ("jo hn@acme.com", EmailIssue::InvalidLocalPart),
            ("john@acme", EmailIssue::InvalidDomain),
            ("john@-acme.com", EmailIssue::InvalidDomain),
            ("john@acme..com", EmailIssue::InvalidDomain),
            ("john@acme.c0m", EmailIssue::InvalidDomain),
        ];
        for (input, expected) in cases {
            let check = validate_email(input);
            assert!(!check.is_valid, "{input} should be invalid");
            assert_eq!(check.reason, Some(expected), "{input}");
            assert_eq!(check.company_domain, None);
        }
    }

    #[test]
    fn normalization_is_idempotent() {
        let once = normalize_email(" Mixed.Case@Example.COM ");
        assert_eq!(normalize_email(&once), once);
    }
}
