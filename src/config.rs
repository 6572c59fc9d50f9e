use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub input: InputConfig,
    pub map: MapConfig,
    #[serde(default)]
    pub heatmap: HeatmapConfig,
    pub output: OutputConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct InputConfig {
    pub data_csv: PathBuf,
}

/// Where the front-end map opens (also the center the synthesizer
/// scatters clusters around).
#[derive(Debug, Deserialize, Clone)]
pub struct MapConfig {
    pub center_lat: f64,
    pub center_lon: f64,
    #[serde(default = "default_zoom")]
    pub default_zoom: u8,
}

#[derive(Debug, Deserialize, Clone)]
pub struct HeatmapConfig {
    /// Splat radius in tile pixels
    #[serde(default = "default_radius")]
    pub radius_px: u32,
}

impl Default for HeatmapConfig {
    fn default() -> Self {
        HeatmapConfig {
            radius_px: default_radius(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct OutputConfig {
    pub tile_dir: PathBuf,
    pub min_zoom: u8,
    pub max_zoom: u8,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

fn default_zoom() -> u8 {
    12
}

fn default_radius() -> u32 {
    12
}

impl AppConfig {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config: AppConfig = toml::from_str(&content)
            .with_context(|| "Failed to parse TOML configuration")?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_minimal_config() {
        let toml_src = r#"
            [input]
            data_csv = "data/readings.csv"

            [map]
            center_lat = 12.9716
            center_lon = 77.5946

            [output]
            tile_dir = "tiles"
            min_zoom = 11
            max_zoom = 14

            [server]
            port = 8080
        "#;
        let config: AppConfig = toml::from_str(toml_src).unwrap();
        assert_eq!(config.map.default_zoom, 12);
        assert_eq!(config.heatmap.radius_px, 12);
        assert_eq!(config.output.max_zoom, 14);
    }
}
