//! Area comparison and status classification
//!
//! The core rule of the whole system: compare the satellite-measured area
//! against the registered (declared) area and classify the result.

use serde::{Deserialize, Serialize};

use iptu_types::Status;

/// Default tolerance before a property is flagged, in percent
pub const DEFAULT_TOLERANCE_PERCENT: f64 = 5.0;

/// Result of comparing measured vs declared area
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AreaComparison {
    /// Absolute difference in m²
    pub difference: f64,

    /// Signed percent difference relative to the declared area.
    /// Positive means measured > declared.
    pub percent_difference: f64,
}

/// Compare measured and declared areas.
///
/// A zero declared area yields a 0% difference; classification reports it
/// as an error separately.
pub fn compare_areas(measured_area: f64, registered_area: f64) -> AreaComparison {
    let difference = (measured_area - registered_area).abs();
    let percent_difference = if registered_area != 0.0 {
        (measured_area - registered_area) / registered_area * 100.0
    } else {
        0.0
    };

    AreaComparison {
        difference,
        percent_difference,
    }
}

/// Classify a measurement against the declared area.
///
/// Rules:
/// - declared area of zero is an error (no valid comparison)
/// - within +/- tolerance percent: compliant
/// - measured more than tolerance above declared: underdeclared
/// - measured more than tolerance below declared: overdeclared
pub fn classify(measured_area: f64, registered_area: f64, tolerance_percent: f64) -> Status {
    if registered_area == 0.0 {
        return Status::Error;
    }

    let percent_difference = (measured_area - registered_area) / registered_area * 100.0;

    if percent_difference.abs() <= tolerance_percent {
        Status::Compliant
    } else if percent_difference > tolerance_percent {
        Status::Underdeclared
    } else {
        Status::Overdeclared
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compliant_exact_match() {
        assert_eq!(classify(200.0, 200.0, DEFAULT_TOLERANCE_PERCENT), Status::Compliant);
    }

    #[test]
    fn test_compliant_at_tolerance_boundary() {
        // Exactly +5% is still compliant (inclusive boundary)
        assert_eq!(classify(210.0, 200.0, 5.0), Status::Compliant);
        // Exactly -5% as well
        assert_eq!(classify(190.0, 200.0, 5.0), Status::Compliant);
    }

    #[test]
    fn test_underdeclared() {
        // Measured well above declared: owner declared too little
        assert_eq!(classify(260.0, 200.0, 5.0), Status::Underdeclared);
    }

    #[test]
    fn test_overdeclared() {
        // Measured well below declared: owner declared too much
        assert_eq!(classify(150.0, 200.0, 5.0), Status::Overdeclared);
    }

    #[test]
    fn test_zero_declared_is_error() {
        assert_eq!(classify(150.0, 0.0, 5.0), Status::Error);
    }

    #[test]
    fn test_custom_tolerance() {
        // +8% is compliant with a 10% tolerance but not with 5%
        assert_eq!(classify(216.0, 200.0, 10.0), Status::Compliant);
        assert_eq!(classify(216.0, 200.0, 5.0), Status::Underdeclared);
    }

    #[test]
    fn test_compare_areas_signed_percent() {
        let cmp = compare_areas(250.0, 200.0);
        assert!((cmp.difference - 50.0).abs() < 1e-9);
        assert!((cmp.percent_difference - 25.0).abs() < 1e-9);

        let cmp = compare_areas(150.0, 200.0);
        assert!((cmp.difference - 50.0).abs() < 1e-9);
        assert!((cmp.percent_difference + 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_compare_areas_zero_declared() {
        let cmp = compare_areas(150.0, 0.0);
        assert!((cmp.difference - 150.0).abs() < 1e-9);
        assert_eq!(cmp.percent_difference, 0.0);
    }
}
