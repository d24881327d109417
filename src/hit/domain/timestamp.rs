//! Normalization of marketplace timestamp strings.

use super::HitDomainError;
use chrono::{DateTime, NaiveDateTime, Utc};

/// Timestamp layout used by the marketplace API.
pub const MARKETPLACE_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Parses a marketplace timestamp into UTC.
///
/// Accepts the marketplace layout (`2015-04-01T17:23:09Z`) and falls back to
/// RFC 3339 with offsets or fractional seconds.
///
/// # Errors
///
/// Returns [`HitDomainError::InvalidTimestamp`] when neither layout matches.
pub fn parse_marketplace_timestamp(value: &str) -> Result<DateTime<Utc>, HitDomainError> {
    let trimmed = value.trim();
    if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, MARKETPLACE_TIMESTAMP_FORMAT) {
        return Ok(naive.and_utc());
    }
    DateTime::parse_from_rfc3339(trimmed)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|_| HitDomainError::InvalidTimestamp(value.to_owned()))
}

/// Parses an optional marketplace timestamp.
///
/// # Errors
///
/// Returns [`HitDomainError::InvalidTimestamp`] when a present value is
/// malformed.
pub fn parse_optional_timestamp(
    value: Option<&str>,
) -> Result<Option<DateTime<Utc>>, HitDomainError> {
    value.map(parse_marketplace_timestamp).transpose()
}

/// Formats a UTC timestamp in the marketplace layout.
#[must_use]
pub fn format_marketplace_timestamp(value: DateTime<Utc>) -> String {
    value.format(MARKETPLACE_TIMESTAMP_FORMAT).to_string()
}
