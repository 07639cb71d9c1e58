//! stablecap CLI — fetch stablecoin market caps and write the chart data file.
//!
//! With no flags this fetches from DefiLlama using default settings and
//! writes `data.json` in the current directory.

use anyhow::{Context, Result};
use clap::Parser;
use stablecap_core::data::StablecoinSource;
use stablecap_core::{
    run_pipeline, write_output, Config, FileSource, LlamaProvider, LogProgress,
};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(
    name = "stablecap",
    about = "Stablecoin market-cap snapshot and monthly history for charting",
    version
)]
struct Cli {
    /// Path to a TOML config file. Defaults apply to anything not set.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output file. Overrides `output_path` from the config.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Read saved API responses from this directory instead of the network.
    #[arg(long)]
    offline_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error). RUST_LOG takes precedence.
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("stablecap={0},stablecap_core={0}", cli.log_level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    if let Some(output) = cli.output {
        config.output_path = output;
    }

    let source: Box<dyn StablecoinSource> = match cli.offline_dir {
        Some(dir) => Box::new(FileSource::new(dir)),
        None => Box::new(
            LlamaProvider::from_config(&config).context("failed to set up DefiLlama client")?,
        ),
    };

    let output = run_pipeline(source.as_ref(), &config, &LogProgress, chrono::Utc::now())
        .context("stablecoin pipeline failed")?;

    write_output(&config.output_path, &output)
        .with_context(|| format!("failed to save {}", config.output_path.display()))?;

    tracing::info!(
        path = %config.output_path.display(),
        pie_slices = output.pie_data.len(),
        historical_points = output.historical_data.len(),
        "done"
    );

    Ok(())
}
