use geo::{Distance, Geodesic, Point};
use thiserror::Error;

use crate::types::{Assessment, RiskCategory, SamplePoint};

/// Contamination level corresponding to 100%.
const LEVEL_SCALE: f64 = 10.0;

#[derive(Debug, Error, PartialEq)]
pub enum LookupError {
    #[error("contamination dataset is empty")]
    EmptyDataset,
    #[error("coordinate out of range: latitude {lat}, longitude {lon}")]
    InvalidCoordinate { lat: f64, lon: f64 },
}

/// Find the sample nearest to `query` by geodesic distance and return
/// it with the distance in meters.
///
/// Linear scan; at this dataset scale a spatial index buys nothing.
/// Ties go to the first sample in dataset order (a later sample wins
/// only on a strictly smaller distance), so results are deterministic
/// for a fixed file.
pub fn nearest<'a>(
    query: Point<f64>,
    samples: &'a [SamplePoint],
) -> Result<(&'a SamplePoint, f64), LookupError> {
    let mut best: Option<(&SamplePoint, f64)> = None;

    for sample in samples {
        let d = Geodesic.distance(query, sample.position());
        match best {
            Some((_, best_d)) if d >= best_d => {}
            _ => best = Some((sample, d)),
        }
    }

    best.ok_or(LookupError::EmptyDataset)
}

/// Assess a query location: validate it, find the nearest reading and
/// derive the displayed values from its contamination level.
pub fn assess(lat: f64, lon: f64, samples: &[SamplePoint]) -> Result<Assessment, LookupError> {
    if !lat.is_finite() || !lon.is_finite() || lat.abs() > 90.0 || lon.abs() > 180.0 {
        return Err(LookupError::InvalidCoordinate { lat, lon });
    }

    let (sample, distance_meters) = nearest(Point::new(lon, lat), samples)?;
    let level = sample.contamination_level;

    Ok(Assessment {
        contamination_level: level,
        percentage: level / LEVEL_SCALE * 100.0,
        category: RiskCategory::from_level(level),
        nearest_latitude: sample.latitude,
        nearest_longitude: sample.longitude,
        distance_meters,
    })
}
