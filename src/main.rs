pub mod config;
pub mod data;
pub mod lookup;
pub mod render;
pub mod server;
pub mod synth;
pub mod types;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the heatmap tile pyramid from the dataset
    Generate {
        #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
        config: PathBuf,
    },
    /// Serve the map front-end and the assessment API
    Serve {
        #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
        config: PathBuf,
    },
    /// Write a synthetic contamination dataset
    Synthesize {
        #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
        config: PathBuf,
        /// Output CSV path
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
        /// Number of readings to generate
        #[arg(short, long, default_value_t = 200)]
        rows: usize,
        /// RNG seed for a reproducible dataset
        #[arg(short, long)]
        seed: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Generate { config } => {
            println!("Generating heatmap tiles with config: {:?}", config);
            let app_config = config::AppConfig::load_from_file(config)?;

            // 1. Load Data
            let samples = data::load_data(&app_config)?;

            // 2. Render Tiles
            render::generate_tiles(&app_config, &samples)?;

            println!("Generation complete!");
        }
        Commands::Serve { config } => {
            println!("Serving map with config: {:?}", config);
            let app_config = config::AppConfig::load_from_file(config)?;

            let samples = data::load_data(&app_config)?;

            server::start_server(app_config, samples).await?;
        }
        Commands::Synthesize {
            config,
            output,
            rows,
            seed,
        } => {
            let app_config = config::AppConfig::load_from_file(config)?;
            synth::write_synthetic_csv(&app_config, output, *rows, *seed)?;
        }
    }

    Ok(())
}
