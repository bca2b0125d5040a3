use chrono::{DateTime, SubsecRound, Utc};
use uuid::Uuid;

use crate::error::{AppError, Result};

pub type Id = Uuid;

pub fn generate_id() -> Id {
    Uuid::new_v4()
}

/// Parse a path/body identifier, reporting `InvalidInput` naming the field.
pub fn parse_id(value: &str, what: &str) -> Result<Id> {
    Uuid::parse_str(value.trim()).map_err(|_| AppError::invalid(format!("invalid {} format", what)))
}

/// A closed set of string literals stored and transmitted as-is.
///
/// Request payloads carry these as plain strings so that validation can
/// report every mismatch together; entities hold the typed value.
pub trait LiteralEnum: Sized + Copy + 'static {
    const FIELD: &'static str;
    const ALL: &'static [Self];

    fn as_str(&self) -> &'static str;

    fn parse(value: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|v| v.as_str() == value)
    }

    fn allowed() -> String {
        Self::ALL
            .iter()
            .map(|v| format!("'{}'", v.as_str()))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Parse or fail with an `InvalidInput` listing the allowed set.
    fn parse_or_invalid(value: &str) -> Result<Self> {
        Self::parse(value).ok_or_else(|| AppError::invalid(Self::mismatch_message()))
    }

    fn mismatch_message() -> String {
        format!("{} must be one of {}", Self::FIELD, Self::allowed())
    }
}

/// Current time at microsecond precision, the resolution PostgreSQL stores.
pub fn timestamp_now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Treat an empty (or whitespace-only) optional create field as not supplied.
pub fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use chrono::Timelike;

    use super::*;

    #[test]
    fn test_timestamps_have_microsecond_precision() {
        for _ in 0..100 {
            assert_eq!(timestamp_now().nanosecond() % 1_000, 0);
        }
    }

    #[test]
    fn test_parse_id_accepts_uuid_and_rejects_garbage() {
        let id = generate_id();
        assert_eq!(parse_id(&id.to_string(), "pet ID").unwrap(), id);

        let err = parse_id("not-a-uuid", "pet ID").unwrap_err();
        assert!(err.is_invalid_input());
        assert_eq!(err.to_string(), "invalid pet ID format");
    }

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty(Some("  ".to_string())), None);
        assert_eq!(non_empty(None), None);
        assert_eq!(non_empty(Some("x".to_string())), Some("x".to_string()));
    }
}
