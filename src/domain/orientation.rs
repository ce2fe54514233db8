//! Band Orientation
//!
//! Where a price sits relative to a band (e.g. a Bollinger Band).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Location of a price relative to a band's lower, middle and upper lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BandOrientation {
    /// No usable price or statistics
    Invalid,
    /// Strictly above the upper band
    AboveUpper,
    /// Above the middle line, inside the band
    AboveMiddle,
    /// Exactly on the middle line
    OnMiddle,
    /// Below the middle line, inside the band
    BelowMiddle,
    /// Strictly below the lower band
    BelowLower,
}

impl BandOrientation {
    /// Returns true for every state except `Invalid`
    pub fn is_valid(&self) -> bool {
        !matches!(self, BandOrientation::Invalid)
    }

    /// Returns true if the price broke out of the band on either side
    pub fn is_breakout(&self) -> bool {
        matches!(self, BandOrientation::AboveUpper | BandOrientation::BelowLower)
    }
}

impl Default for BandOrientation {
    fn default() -> Self {
        BandOrientation::Invalid
    }
}

impl fmt::Display for BandOrientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BandOrientation::Invalid => "INVALID",
            BandOrientation::AboveUpper => "ABOVE_UPPER",
            BandOrientation::AboveMiddle => "ABOVE_MIDDLE",
            BandOrientation::OnMiddle => "ON_MIDDLE",
            BandOrientation::BelowMiddle => "BELOW_MIDDLE",
            BandOrientation::BelowLower => "BELOW_LOWER",
        };
        write!(f, "{}", label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_invalid() {
        assert_eq!(BandOrientation::default(), BandOrientation::Invalid);
        assert!(!BandOrientation::default().is_valid());
    }

    #[test]
    fn test_breakout_states() {
        assert!(BandOrientation::AboveUpper.is_breakout());
        assert!(BandOrientation::BelowLower.is_breakout());
        assert!(!BandOrientation::OnMiddle.is_breakout());
        assert!(!BandOrientation::Invalid.is_breakout());
    }

    #[test]
    fn test_display() {
        assert_eq!(BandOrientation::BelowLower.to_string(), "BELOW_LOWER");
        assert_eq!(BandOrientation::OnMiddle.to_string(), "ON_MIDDLE");
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&BandOrientation::AboveUpper).unwrap();
        assert_eq!(json, "\"AboveUpper\"");
    }
}
