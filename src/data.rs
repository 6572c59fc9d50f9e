use crate::config::AppConfig;
use crate::lookup::LookupError;
use crate::types::SamplePoint;
use anyhow::{anyhow, Context, Result};
use csv::{ReaderBuilder, StringRecord};
use std::fs::File;
use std::io::Read;
use tracing::{info, warn};

const COL_LATITUDE: &str = "latitude";
const COL_LONGITUDE: &str = "longitude";
const COL_LEVEL: &str = "contamination_level";

/// Load the contamination dataset named by the config.
///
/// The file must have a header row with at least `latitude`,
/// `longitude` and `contamination_level` columns (any order, extra
/// columns ignored). Every row must parse; a zero-row file is an
/// error, since the nearest lookup is undefined on an empty dataset.
pub fn load_data(config: &AppConfig) -> Result<Vec<SamplePoint>> {
    let file = File::open(&config.input.data_csv)
        .with_context(|| format!("Failed to open data CSV: {:?}", config.input.data_csv))?;

    let samples = read_samples(file)
        .with_context(|| format!("Failed to load dataset: {:?}", config.input.data_csv))?;

    info!("Loaded {} contamination readings", samples.len());
    Ok(samples)
}

/// Parse sample points from any CSV source.
pub fn read_samples<R: Read>(source: R) -> Result<Vec<SamplePoint>> {
    let mut rdr = ReaderBuilder::new().from_reader(source);
    let headers = rdr.headers()?.clone();

    let lat_idx = column_index(&headers, COL_LATITUDE)?;
    let lon_idx = column_index(&headers, COL_LONGITUDE)?;
    let level_idx = column_index(&headers, COL_LEVEL)?;

    let mut samples = Vec::new();

    for (row, result) in rdr.records().enumerate() {
        let record = result?;
        // Row numbers in errors are 1-based and skip the header line
        let line = row + 2;

        let latitude = parse_field(&record, lat_idx, COL_LATITUDE, line)?;
        let longitude = parse_field(&record, lon_idx, COL_LONGITUDE, line)?;
        let contamination_level = parse_field(&record, level_idx, COL_LEVEL, line)?;

        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(anyhow!(
                "Line {}: coordinate ({}, {}) outside valid WGS84 range",
                line,
                latitude,
                longitude
            ));
        }

        if !(0.0..=10.0).contains(&contamination_level) {
            warn!(
                "Line {}: contamination_level {} outside the expected 0-10 range",
                line, contamination_level
            );
        }

        samples.push(SamplePoint {
            latitude,
            longitude,
            contamination_level,
        });
    }

    if samples.is_empty() {
        return Err(LookupError::EmptyDataset.into());
    }

    Ok(samples)
}

fn column_index(headers: &StringRecord, name: &str) -> Result<usize> {
    headers
        .iter()
        .position(|h| h == name)
        .ok_or_else(|| anyhow!("Column '{}' not found in CSV header", name))
}

fn parse_field(record: &StringRecord, idx: usize, name: &str, line: usize) -> Result<f64> {
    let raw = record
        .get(idx)
        .ok_or_else(|| anyhow!("Line {}: missing '{}' field", line, name))?;
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| anyhow!("Line {}: '{}' is not a number for '{}'", line, raw, name))?;
    if !value.is_finite() {
        return Err(anyhow!("Line {}: non-finite value for '{}'", line, name));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_valid_csv() {
        let csv = "latitude,longitude,contamination_level\n\
                   12.9716,77.5946,8.0\n\
                   12.9800,77.6000,3.0\n";
        let samples = read_samples(csv.as_bytes()).unwrap();
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].latitude, 12.9716);
        assert_eq!(samples[1].contamination_level, 3.0);
    }

    #[test]
    fn column_order_does_not_matter() {
        let csv = "contamination_level,longitude,latitude,site\n\
                   5.5,77.60,12.95,market\n";
        let samples = read_samples(csv.as_bytes()).unwrap();
        assert_eq!(samples[0].latitude, 12.95);
        assert_eq!(samples[0].longitude, 77.60);
        assert_eq!(samples[0].contamination_level, 5.5);
    }

    #[test]
    fn rejects_missing_column() {
        let csv = "latitude,longitude\n12.97,77.59\n";
        let err = read_samples(csv.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("contamination_level"));
    }

    #[test]
    fn rejects_non_numeric_field() {
        let csv = "latitude,longitude,contamination_level\n\
                   12.97,seventy-seven,4.0\n";
        let err = read_samples(csv.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("Line 2"));
    }

    #[test]
    fn rejects_out_of_range_coordinate() {
        let csv = "latitude,longitude,contamination_level\n\
                   95.0,77.59,4.0\n";
        assert!(read_samples(csv.as_bytes()).is_err());
    }

    #[test]
    fn empty_file_is_empty_dataset() {
        let csv = "latitude,longitude,contamination_level\n";
        let err = read_samples(csv.as_bytes()).unwrap_err();
        assert!(err.downcast_ref::<LookupError>() == Some(&LookupError::EmptyDataset));
    }
}
