use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::error::{AppError, Result};

/// One accepted textual date layout.
#[derive(Debug, Clone, PartialEq)]
pub enum DateFormat {
    /// Full timestamp with offset, e.g. `2026-01-25T10:00:00+09:00`.
    Rfc3339,
    /// `strftime` layout carrying a time of day, read as UTC.
    DateTime(String),
    /// `strftime` layout for a bare calendar date, read as midnight UTC.
    Date(String),
}

impl DateFormat {
    /// Build from a configuration entry: `rfc3339` or a `strftime` pattern.
    pub fn from_config(entry: &str) -> Self {
        let entry = entry.trim();
        if entry.eq_ignore_ascii_case("rfc3339") {
            DateFormat::Rfc3339
        } else if entry.contains("%H") || entry.contains("%T") {
            DateFormat::DateTime(entry.to_string())
        } else {
            DateFormat::Date(entry.to_string())
        }
    }

    fn parse(&self, value: &str) -> Option<DateTime<Utc>> {
        match self {
            DateFormat::Rfc3339 => DateTime::parse_from_rfc3339(value)
                .ok()
                .map(|dt| dt.with_timezone(&Utc)),
            DateFormat::DateTime(pattern) => NaiveDateTime::parse_from_str(value, pattern)
                .ok()
                .map(|dt| dt.and_utc()),
            DateFormat::Date(pattern) => NaiveDate::parse_from_str(value, pattern)
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|dt| dt.and_utc()),
        }
    }
}

pub const DEFAULT_DATE_FORMATS: &[&str] = &["rfc3339", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d"];

/// Ordered list of accepted formats; the first one that parses wins.
#[derive(Debug, Clone, PartialEq)]
pub struct DateParser {
    formats: Vec<DateFormat>,
}

impl Default for DateParser {
    fn default() -> Self {
        Self::from_config(DEFAULT_DATE_FORMATS.iter().copied())
    }
}

impl DateParser {
    pub fn new(formats: Vec<DateFormat>) -> Self {
        Self { formats }
    }

    pub fn from_config<'a>(entries: impl IntoIterator<Item = &'a str>) -> Self {
        let formats: Vec<DateFormat> = entries.into_iter().map(DateFormat::from_config).collect();
        if formats.is_empty() {
            return Self::default();
        }
        Self { formats }
    }

    pub fn formats(&self) -> &[DateFormat] {
        &self.formats
    }

    pub fn try_parse(&self, value: &str) -> Option<DateTime<Utc>> {
        let value = value.trim();
        self.formats.iter().find_map(|f| f.parse(value))
    }

    /// Parse or fail with `InvalidInput` naming the field.
    pub fn parse(&self, value: &str, field: &str) -> Result<DateTime<Utc>> {
        self.try_parse(value).ok_or_else(|| AppError::invalid(self.format_message(field)))
    }

    pub fn parse_date(&self, value: &str, field: &str) -> Result<NaiveDate> {
        self.parse(value, field).map(|dt| dt.date_naive())
    }

    pub fn format_message(&self, field: &str) -> String {
        let accepted = self
            .formats
            .iter()
            .map(|f| match f {
                DateFormat::Rfc3339 => "RFC3339".to_string(),
                DateFormat::DateTime(p) | DateFormat::Date(p) => p.clone(),
            })
            .collect::<Vec<_>>()
            .join(", ");
        format!("{} must be a valid date ({})", field, accepted)
    }
}

/// Birth dates are calendar dates only.
pub fn parse_birth_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::invalid("invalid birth date format, expected YYYY-MM-DD"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_three_formats_land_on_same_day() {
        let parser = DateParser::default();
        let expected = NaiveDate::from_ymd_opt(2026, 1, 25).unwrap();

        for input in ["2026-01-25", "2026-01-25 10:00:00", "2026-01-25T10:00:00Z"] {
            let parsed = parser.parse(input, "visit_date").unwrap();
            assert_eq!(parsed.date_naive(), expected, "input {}", input);
        }
    }

    #[test]
    fn test_rejects_day_first_layout() {
        let parser = DateParser::default();
        let err = parser.parse("25/01/2026", "visit_date").unwrap_err();
        assert!(err.is_invalid_input());
        assert!(err.to_string().starts_with("visit_date must be a valid date"));
    }

    #[test]
    fn test_offset_is_normalized_to_utc() {
        let parser = DateParser::default();
        let parsed = parser.parse("2026-01-25T10:00:00+09:00", "visit_date").unwrap();
        assert_eq!(parsed.to_rfc3339(), "2026-01-25T01:00:00+00:00");
    }

    #[test]
    fn test_configured_formats_extend_accepted_inputs() {
        let parser = DateParser::from_config(["rfc3339", "%Y-%m-%d", "%d/%m/%Y"]);
        assert_eq!(parser.formats().len(), 3);
        assert_eq!(
            parser.parse_date("25/01/2026", "visit_date").unwrap(),
            NaiveDate::from_ymd_opt(2026, 1, 25).unwrap()
        );
    }

    #[test]
    fn test_empty_config_falls_back_to_defaults() {
        let parser = DateParser::from_config(Vec::<&str>::new());
        assert_eq!(parser, DateParser::default());
    }

    #[test]
    fn test_birth_date_is_date_only() {
        assert!(parse_birth_date("2020-02-29").is_ok());
        assert!(parse_birth_date("2020-02-30").is_err());
        assert!(parse_birth_date("2020-02-01 10:00:00").is_err());
    }
}
