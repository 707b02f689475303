//! Human-assigned string codes for stops, cabs, and agencies.

use serde::{Deserialize, Serialize};

/// Stable code identifying a stop.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StopCode(String);

impl StopCode {
    /// Creates a new stop code from a string.
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Returns the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for StopCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for StopCode {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for StopCode {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for StopCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Code identifying a cab within an agency's fleet.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CabCode(String);

impl CabCode {
    /// Creates a new cab code from a string.
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Returns the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CabCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for CabCode {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for CabCode {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for CabCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Code identifying a transport agency.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgencyCode(String);

impl AgencyCode {
    /// Creates a new agency code from a string.
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Returns the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AgencyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for AgencyCode {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for AgencyCode {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for AgencyCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stop_code_string_conversion() {
        let code = StopCode::new("BLR");
        assert_eq!(code.as_str(), "BLR");

        let code2: StopCode = "MYS".into();
        assert_eq!(code2.as_str(), "MYS");
    }

    #[test]
    fn stop_codes_order_lexically() {
        let mut codes = vec![StopCode::new("MYS"), StopCode::new("BLR")];
        codes.sort();
        assert_eq!(codes[0].as_str(), "BLR");
    }

    #[test]
    fn cab_code_display() {
        assert_eq!(CabCode::new("KA-01-1234").to_string(), "KA-01-1234");
    }

    #[test]
    fn agency_code_serialization_is_transparent() {
        let code = AgencyCode::new("AG-42");
        let json = serde_json::to_string(&code).unwrap();
        assert_eq!(json, "\"AG-42\"");
    }
}
