//! stablecap core — stablecoin market-cap snapshot, ranking, and monthly history.
//!
//! This crate contains the whole pipeline behind the `stablecap` binary:
//! - Sources for the DefiLlama stablecoins API (live and from saved files)
//! - Ranking into top-N assets plus an aggregated others bucket
//! - Joining per-asset history onto the aggregate total series
//! - Monthly bucketing (latest datapoint per month)
//! - JSON output for the chart front end

pub mod aggregate;
pub mod config;
pub mod data;
pub mod domain;
pub mod output;
pub mod pipeline;
pub mod rank;

pub use config::{Config, ConfigError};
pub use data::{DataError, FileSource, LlamaProvider, LogProgress, StablecoinSource};
pub use domain::{Asset, MonthlyRecord, Output, PieSlice};
pub use output::{write_output, OutputError};
pub use pipeline::run_pipeline;
pub use rank::{rank_assets, RankedSet};
