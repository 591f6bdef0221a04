use std::sync::LazyLock;

use regex::Regex;

use crate::coordination::errors::CoordinationError;

pub const MIN_PASSWORD_LENGTH: usize = 8;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap_or_else(|e| panic!("email regex: {e}"))
});

/// Accepts `local@domain.tld` with no whitespace and a single `@`.
pub fn validate_email(email: &str) -> Result<(), CoordinationError> {
    if EMAIL_RE.is_match(email) {
        Ok(())
    } else {
        Err(CoordinationError::Validation(
            "Invalid email format".to_string(),
        ))
    }
}
