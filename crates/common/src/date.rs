//! Travel dates.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Accepted input formats, tried in order. The first is canonical.
const FORMATS: &[&str] = &["%Y-%m-%d", "%d-%m-%Y", "%Y/%m/%d"];

/// Error returned when a caller-supplied date string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized travel date: {input} (expected YYYY-MM-DD)")]
pub struct DateParseError {
    /// The rejected input.
    pub input: String,
}

/// Calendar date a schedule runs on.
///
/// Callers supply dates as strings; `parse` normalizes them so that the
/// same day always produces the same schedule key regardless of the
/// format it arrived in. Displays as ISO `YYYY-MM-DD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TravelDate(NaiveDate);

impl TravelDate {
    /// Parses a caller-supplied date string.
    pub fn parse(input: &str) -> Result<Self, DateParseError> {
        let trimmed = input.trim();
        FORMATS
            .iter()
            .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
            .map(Self)
            .ok_or_else(|| DateParseError {
                input: input.to_string(),
            })
    }

    /// Creates a travel date from an already-validated calendar date.
    pub fn from_naive(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Returns the underlying calendar date.
    pub fn as_naive(&self) -> NaiveDate {
        self.0
    }
}

impl std::fmt::Display for TravelDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl std::str::FromStr for TravelDate {
    type Err = DateParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<NaiveDate> for TravelDate {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_iso_format() {
        let date = TravelDate::parse("2024-06-01").unwrap();
        assert_eq!(date.to_string(), "2024-06-01");
    }

    #[test]
    fn parses_day_first_format() {
        let date = TravelDate::parse("01-06-2024").unwrap();
        assert_eq!(date.to_string(), "2024-06-01");
    }

    #[test]
    fn parses_slash_format() {
        let date = TravelDate::parse("2024/06/01").unwrap();
        assert_eq!(date.to_string(), "2024-06-01");
    }

    #[test]
    fn same_day_normalizes_to_same_key() {
        let a = TravelDate::parse("2024-06-01").unwrap();
        let b = TravelDate::parse("01-06-2024").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn rejects_garbage() {
        let err = TravelDate::parse("next tuesday").unwrap_err();
        assert_eq!(err.input, "next tuesday");
    }

    #[test]
    fn rejects_out_of_range_day() {
        assert!(TravelDate::parse("2024-02-31").is_err());
    }

    #[test]
    fn trims_whitespace() {
        assert!(TravelDate::parse("  2024-06-01 ").is_ok());
    }

    #[test]
    fn from_str_roundtrip() {
        let date: TravelDate = "2024-06-01".parse().unwrap();
        let again: TravelDate = date.to_string().parse().unwrap();
        assert_eq!(date, again);
    }
}
