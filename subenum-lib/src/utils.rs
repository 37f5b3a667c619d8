//! Utility functions for target-domain handling.

use crate::error::SubenumError;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref DOMAIN_RE: Regex =
        Regex::new(r"^[a-z0-9]([a-z0-9-]{0,61}[a-z0-9])?(\.[a-z0-9]([a-z0-9-]{0,61}[a-z0-9])?)+$")
            .expect("domain regex is valid");
}

/// Normalize a target domain as typed by the user.
///
/// Trims whitespace, lower-cases, and drops a trailing root dot.
pub fn normalize_domain(input: &str) -> String {
    input.trim().trim_end_matches('.').to_lowercase()
}

/// Validate a target domain.
///
/// The target must be a multi-label name made of letters, digits and
/// hyphens (`example.com`, `corp.example.co.uk`). Expects a normalized
/// domain; see [`normalize_domain`].
pub fn validate_domain(domain: &str) -> Result<(), SubenumError> {
    if domain.is_empty() {
        return Err(SubenumError::invalid_domain(
            domain,
            "Domain name cannot be empty",
        ));
    }

    if domain.len() > 253 {
        return Err(SubenumError::invalid_domain(
            domain,
            "Domain name exceeds 253 characters",
        ));
    }

    if !domain.contains('.') {
        return Err(SubenumError::invalid_domain(
            domain,
            "Expected a registered domain such as 'example.com'",
        ));
    }

    if !DOMAIN_RE.is_match(domain) {
        return Err(SubenumError::invalid_domain(
            domain,
            "Labels may only contain letters, digits and inner hyphens",
        ));
    }

    Ok(())
}
