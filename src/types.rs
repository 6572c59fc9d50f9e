use std::fmt;

use geo::Point;
use serde::Serialize;

/// One contamination reading from the input dataset. Loaded once at
/// startup and never mutated afterwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplePoint {
    /// WGS84 degrees
    pub latitude: f64,
    /// WGS84 degrees
    pub longitude: f64,
    /// Severity score, expected within [0, 10]
    pub contamination_level: f64,
}

impl SamplePoint {
    /// Position as a geo point (x = longitude, y = latitude).
    pub fn position(&self) -> Point<f64> {
        Point::new(self.longitude, self.latitude)
    }
}

/// Risk category derived from a contamination level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RiskCategory {
    High,
    Medium,
    Low,
}

impl RiskCategory {
    /// Classify a contamination level. Total over all real inputs:
    /// >= 7 is High, [4, 7) is Medium, everything below (negatives
    /// included) is Low.
    pub fn from_level(level: f64) -> Self {
        if level >= 7.0 {
            RiskCategory::High
        } else if level >= 4.0 {
            RiskCategory::Medium
        } else {
            RiskCategory::Low
        }
    }

    /// Guidance text shown next to the assessment result.
    pub fn advisory(&self) -> &'static str {
        match self {
            RiskCategory::High => {
                "High Risk: this area has a high contamination level. Factors such as \
                 poor water quality, poor hygiene, and proximity to garbage disposal \
                 areas may contribute to higher risks of foodborne disease."
            }
            RiskCategory::Medium => {
                "Medium Risk: this area has a moderate contamination level. While \
                 conditions are relatively safe, factors like air contamination or \
                 temperature may increase food safety risks."
            }
            RiskCategory::Low => {
                "Low Risk: this area has a low contamination level and generally \
                 favorable environmental conditions for food safety."
            }
        }
    }
}

impl fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskCategory::High => write!(f, "High"),
            RiskCategory::Medium => write!(f, "Medium"),
            RiskCategory::Low => write!(f, "Low"),
        }
    }
}

/// Result of assessing a query location against the dataset.
#[derive(Debug, Clone, Serialize)]
pub struct Assessment {
    pub contamination_level: f64,
    /// level / 10 * 100
    pub percentage: f64,
    pub category: RiskCategory,
    pub nearest_latitude: f64,
    pub nearest_longitude: f64,
    pub distance_meters: f64,
}
