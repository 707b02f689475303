//! Fare amounts.

use serde::{Deserialize, Serialize};

/// Fare for a trip, stored in cents to avoid floating point issues.
///
/// Fares are copied from the route definition onto trips and displayed to
/// travelers; the engine never computes on them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Fare {
    /// Amount in cents (e.g., 1000 = $10.00)
    cents: i64,
}

impl Fare {
    /// Creates a fare from cents.
    pub fn from_cents(cents: i64) -> Self {
        Self { cents }
    }

    /// Returns the amount in cents.
    pub fn cents(&self) -> i64 {
        self.cents
    }

    /// Returns true if the fare is greater than zero.
    pub fn is_positive(&self) -> bool {
        self.cents > 0
    }
}

impl std::fmt::Display for Fare {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "${}.{:02}", self.cents / 100, self.cents.abs() % 100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fare_from_cents() {
        let fare = Fare::from_cents(2550);
        assert_eq!(fare.cents(), 2550);
        assert!(fare.is_positive());
    }

    #[test]
    fn fare_display() {
        assert_eq!(Fare::from_cents(2550).to_string(), "$25.50");
        assert_eq!(Fare::from_cents(5).to_string(), "$0.05");
    }

    #[test]
    fn zero_fare_is_not_positive() {
        assert!(!Fare::from_cents(0).is_positive());
    }
}
