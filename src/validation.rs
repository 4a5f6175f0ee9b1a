use regex::Regex;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("name is empty")]
    Empty,
    #[error("name too long (max 255 bytes)")]
    TooLong,
    #[error("name contains control characters")]
    ControlCharacters,
}

lazy_static::lazy_static! {
    /// Any C0/C1 control character
    static ref CONTROL_RE: Regex = Regex::new(r"[\p{Cc}]").unwrap();
    /// Decimal identifiers as accepted by import
    static ref DECIMAL_ID_RE: Regex = Regex::new(r"^\+?[0-9]+$").unwrap();
}

/// Names are opaque to us; uniqueness and syntax are the remote's business.
/// This only rejects values the remote could never accept.
pub fn validate_resource_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::Empty);
    }
    if name.len() > 255 {
        return Err(ValidationError::TooLong);
    }
    if CONTROL_RE.is_match(name) {
        return Err(ValidationError::ControlCharacters);
    }

    Ok(())
}

/// Parse an external identifier handed to an import. Zero and negative
/// values are never assigned by the remote, so they are rejected too.
pub fn parse_import_id(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    if !DECIMAL_ID_RE.is_match(trimmed) {
        return None;
    }
    trimmed.parse::<i64>().ok().filter(|id| *id > 0)
}
