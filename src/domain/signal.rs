//! Position Signal
//!
//! What a band orientation asks the position to do.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::BandOrientation;

/// Position taking signal derived from a band orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PositionSignal {
    /// Leave the market
    Invalid,
    /// Do nothing
    None,
    OpenLong,
    CloseLong,
    OpenShort,
    CloseShort,
}

impl From<BandOrientation> for PositionSignal {
    fn from(orientation: BandOrientation) -> Self {
        match orientation {
            BandOrientation::BelowLower => PositionSignal::OpenLong,
            BandOrientation::AboveUpper => PositionSignal::OpenShort,
            BandOrientation::BelowMiddle => PositionSignal::CloseShort,
            BandOrientation::AboveMiddle => PositionSignal::CloseLong,
            // edge case, price sits exactly on the mean
            BandOrientation::OnMiddle => PositionSignal::None,
            BandOrientation::Invalid => PositionSignal::Invalid,
        }
    }
}

impl fmt::Display for PositionSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PositionSignal::Invalid => write!(f, "Invalid"),
            PositionSignal::None => write!(f, "None"),
            PositionSignal::OpenLong => write!(f, "OpenLong"),
            PositionSignal::CloseLong => write!(f, "CloseLong"),
            PositionSignal::OpenShort => write!(f, "OpenShort"),
            PositionSignal::CloseShort => write!(f, "CloseShort"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orientation_mapping() {
        assert_eq!(PositionSignal::from(BandOrientation::BelowLower), PositionSignal::OpenLong);
        assert_eq!(PositionSignal::from(BandOrientation::AboveUpper), PositionSignal::OpenShort);
        assert_eq!(PositionSignal::from(BandOrientation::BelowMiddle), PositionSignal::CloseShort);
        assert_eq!(PositionSignal::from(BandOrientation::AboveMiddle), PositionSignal::CloseLong);
        assert_eq!(PositionSignal::from(BandOrientation::OnMiddle), PositionSignal::None);
        assert_eq!(PositionSignal::from(BandOrientation::Invalid), PositionSignal::Invalid);
    }

    #[test]
    fn test_mapping_is_one_to_one() {
        let all = [
            BandOrientation::Invalid,
            BandOrientation::AboveUpper,
            BandOrientation::AboveMiddle,
            BandOrientation::OnMiddle,
            BandOrientation::BelowMiddle,
            BandOrientation::BelowLower,
        ];
        let signals: std::collections::HashSet<PositionSignal> =
            all.iter().map(|o| PositionSignal::from(*o)).collect();
        assert_eq!(signals.len(), all.len());
    }
}
