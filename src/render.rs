use crate::config::AppConfig;
use crate::types::SamplePoint;
use anyhow::{Context, Result};
use image::{Rgba, RgbaImage};
use rayon::prelude::*;
use std::collections::HashMap;
use std::f64::consts::PI;
use std::fs;
use tracing::info;

const TILE_SIZE: u32 = 256;

/// Contamination level that maps to full heat intensity.
const MAX_LEVEL: f64 = 10.0;

/// Folium's default heatmap gradient: blue through cyan, lime and
/// yellow to red. Intensities below the first stop stay blue.
const GRADIENT: [(f64, [u8; 3]); 5] = [
    (0.4, [0, 0, 255]),
    (0.6, [0, 255, 255]),
    (0.7, [0, 255, 0]),
    (0.8, [255, 255, 0]),
    (1.0, [255, 0, 0]),
];

/// Render the heatmap tile pyramid for the dataset.
///
/// Tiles land at `tile_dir/{z}/{x}/{y}.png`. Tiles no sample reaches
/// are skipped entirely rather than written as blanks.
pub fn generate_tiles(config: &AppConfig, samples: &[SamplePoint]) -> Result<()> {
    info!(
        "Rendering heatmap tiles from zoom {} to {}...",
        config.output.min_zoom, config.output.max_zoom
    );

    (config.output.min_zoom..=config.output.max_zoom)
        .into_par_iter()
        .map(|z| render_zoom_level(config, z, samples))
        .collect::<Result<Vec<_>>>()?;

    Ok(())
}

fn render_zoom_level(config: &AppConfig, zoom: u8, samples: &[SamplePoint]) -> Result<()> {
    let radius = config.heatmap.radius_px as f64;
    let n_tiles = 1u32 << zoom;

    // Project every sample to global pixel space once, then bucket it
    // into each tile its kernel overlaps (border samples bleed into
    // the neighbouring tile).
    let splats: Vec<(f64, f64, f64)> = samples
        .iter()
        .map(|s| {
            let (gx, gy) = global_pixel(s.latitude, s.longitude, zoom);
            (gx, gy, (s.contamination_level / MAX_LEVEL).clamp(0.0, 1.0))
        })
        .collect();

    let mut by_tile: HashMap<(u32, u32), Vec<usize>> = HashMap::new();
    for (i, &(gx, gy, _)) in splats.iter().enumerate() {
        let (tx0, tx1) = tile_range(gx, radius, n_tiles);
        let (ty0, ty1) = tile_range(gy, radius, n_tiles);
        for tx in tx0..=tx1 {
            for ty in ty0..=ty1 {
                by_tile.entry((tx, ty)).or_default().push(i);
            }
        }
    }

    let z_dir = config.output.tile_dir.join(zoom.to_string());
    fs::create_dir_all(&z_dir).context("Failed to create zoom directory")?;

    by_tile.par_iter().for_each(|(&(tx, ty), indices)| {
        let img = render_tile(tx, ty, indices, &splats, radius);

        let x_dir = z_dir.join(tx.to_string());
        if !x_dir.exists() {
            let _ = fs::create_dir_all(&x_dir);
        }
        let path = x_dir.join(format!("{}.png", ty));

        if let Err(e) = img.save(&path) {
            eprintln!("Failed to save tile {:?}: {:?}", path, e);
        }
    });

    Ok(())
}

fn render_tile(tx: u32, ty: u32, indices: &[usize], splats: &[(f64, f64, f64)], radius: f64) -> RgbaImage {
    let origin_x = (tx * TILE_SIZE) as f64;
    let origin_y = (ty * TILE_SIZE) as f64;

    let mut intensity = vec![0.0f64; (TILE_SIZE * TILE_SIZE) as usize];

    for &i in indices {
        let (gx, gy, weight) = splats[i];
        let cx = gx - origin_x;
        let cy = gy - origin_y;

        let px0 = (cx - radius).floor().max(0.0) as u32;
        let px1 = (cx + radius).ceil().min((TILE_SIZE - 1) as f64) as u32;
        let py0 = (cy - radius).floor().max(0.0) as u32;
        let py1 = (cy + radius).ceil().min((TILE_SIZE - 1) as f64) as u32;

        for py in py0..=py1 {
            for px in px0..=px1 {
                let dx = px as f64 + 0.5 - cx;
                let dy = py as f64 + 0.5 - cy;
                let d = (dx * dx + dy * dy).sqrt();
                if d < radius {
                    // Linear radial falloff, accumulated across samples
                    intensity[(py * TILE_SIZE + px) as usize] += weight * (1.0 - d / radius);
                }
            }
        }
    }

    let mut img = RgbaImage::new(TILE_SIZE, TILE_SIZE);
    for (idx, &heat) in intensity.iter().enumerate() {
        if heat <= 0.0 {
            continue;
        }
        let px = (idx as u32) % TILE_SIZE;
        let py = (idx as u32) / TILE_SIZE;
        img.put_pixel(px, py, heat_color(heat.min(1.0)));
    }

    img
}

/// Inclusive range of tile indices a kernel centred at global pixel
/// `g` with the given radius can touch.
fn tile_range(g: f64, radius: f64, n_tiles: u32) -> (u32, u32) {
    let size = TILE_SIZE as f64;
    let lo = ((g - radius) / size).floor().max(0.0) as u32;
    let hi = (((g + radius) / size).floor() as u32).min(n_tiles - 1);
    (lo.min(n_tiles - 1), hi)
}

/// Web Mercator projection to global pixel coordinates at a zoom level.
fn global_pixel(lat: f64, lon: f64, zoom: u8) -> (f64, f64) {
    let n = 2.0_f64.powi(zoom as i32);
    let world = n * TILE_SIZE as f64;

    let x = (lon + 180.0) / 360.0 * world;
    let lat_rad = lat.to_radians();
    let y = (1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / PI) / 2.0 * world;

    (x, y)
}

fn heat_color(t: f64) -> Rgba<u8> {
    let alpha = (t * 255.0).round() as u8;

    let (first_stop, first_rgb) = GRADIENT[0];
    if t <= first_stop {
        let [r, g, b] = first_rgb;
        return Rgba([r, g, b, alpha]);
    }

    for window in GRADIENT.windows(2) {
        let (v0, c0) = window[0];
        let (v1, c1) = window[1];
        if t <= v1 {
            let f = (t - v0) / (v1 - v0);
            let lerp = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * f).round() as u8;
            return Rgba([lerp(c0[0], c1[0]), lerp(c0[1], c1[1]), lerp(c0[2], c1[2]), alpha]);
        }
    }

    let [r, g, b] = GRADIENT[GRADIENT.len() - 1].1;
    Rgba([r, g, b, alpha])
}
