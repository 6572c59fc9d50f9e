use crate::config::AppConfig;
use crate::types::SamplePoint;
use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Half-width of the box cluster centers scatter in, degrees.
const SPREAD_DEG: f64 = 0.08;
/// Jitter of readings around their cluster center, degrees.
const JITTER_DEG: f64 = 0.015;
/// Level noise around the cluster base severity.
const LEVEL_JITTER: f64 = 1.5;
const CLUSTERS: usize = 6;

/// Write a synthetic contamination dataset to `output`.
///
/// Readings group into a handful of hotspots around the configured
/// map center, so the rendered heatmap has visible structure instead
/// of uniform noise. Pass a seed to make the file reproducible.
pub fn write_synthetic_csv(
    config: &AppConfig,
    output: &Path,
    rows: usize,
    seed: Option<u64>,
) -> Result<()> {
    let mut rng = match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };

    let samples = generate_samples(&mut rng, config.map.center_lat, config.map.center_lon, rows);

    let file = std::fs::File::create(output)
        .with_context(|| format!("Failed to create output CSV: {:?}", output))?;
    write_samples(file, &samples)?;

    info!("Wrote {} synthetic readings to {:?}", samples.len(), output);
    Ok(())
}

/// Generate `rows` readings clustered around a center coordinate.
pub fn generate_samples<R: Rng>(
    rng: &mut R,
    center_lat: f64,
    center_lon: f64,
    rows: usize,
) -> Vec<SamplePoint> {
    let clusters: Vec<(f64, f64, f64)> = (0..CLUSTERS)
        .map(|_| {
            (
                center_lat + rng.gen_range(-SPREAD_DEG..SPREAD_DEG),
                center_lon + rng.gen_range(-SPREAD_DEG..SPREAD_DEG),
                // Base severity of the hotspot
                rng.gen_range(1.0..9.5),
            )
        })
        .collect();

    (0..rows)
        .map(|_| {
            let (clat, clon, base) = clusters[rng.gen_range(0..clusters.len())];
            SamplePoint {
                latitude: clat + rng.gen_range(-JITTER_DEG..JITTER_DEG),
                longitude: clon + rng.gen_range(-JITTER_DEG..JITTER_DEG),
                contamination_level: (base + rng.gen_range(-LEVEL_JITTER..LEVEL_JITTER))
                    .clamp(0.0, 10.0),
            }
        })
        .collect()
}

/// Write samples in the loader's schema.
pub fn write_samples<W: Write>(sink: W, samples: &[SamplePoint]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(sink);
    wtr.write_record(["latitude", "longitude", "contamination_level"])?;
    for s in samples {
        wtr.write_record(&[
            format!("{:.6}", s.latitude),
            format!("{:.6}", s.longitude),
            format!("{:.2}", s.contamination_level),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}
