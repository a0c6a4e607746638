//! Input validation at the HTTP boundary

use once_cell::sync::Lazy;
use regex::Regex;

use quorum_core::{QuorumError, Result};

pub const MAX_EMAIL_LENGTH: usize = 320; // RFC 5321

/// Email validation regex (RFC 5322 simplified)
static EMAIL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap());

/// Syntactic email validation. Deliverability is the mail layer's problem.
pub fn validate_email(value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(QuorumError::validation("Email is required"));
    }
    if value.len() > MAX_EMAIL_LENGTH {
        return Err(QuorumError::validation("Email is too long"));
    }
    if !EMAIL_REGEX.is_match(value) {
        return Err(QuorumError::validation("Invalid email format"));
    }
    Ok(())
}
