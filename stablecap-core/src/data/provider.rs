//! Stablecoin source trait, structured error types, and progress reporting.
//!
//! The StablecoinSource trait abstracts over where the payloads come from (the
//! live DefiLlama API, a directory of saved responses) so the pipeline can be
//! driven offline and mocked in tests.

use crate::domain::{Asset, AssetHistory, TotalPoint};
use std::path::PathBuf;
use thiserror::Error;

/// Structured error types for fetching and parsing upstream data.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("network error: {0}")]
    Network(String),

    #[error("response format changed: {0}")]
    Parse(String),

    #[error("invalid data: {0}")]
    Invalid(String),

    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Trait for stablecoin data sources.
///
/// Implementations return parsed domain values. Filtering of non-positive
/// circulating values happens inside the implementations, so every source
/// yields only qualifying assets and positive totals.
pub trait StablecoinSource {
    /// Human-readable name of this source.
    fn name(&self) -> &str;

    /// Current circulating snapshot for all tracked assets.
    fn fetch_assets(&self) -> Result<Vec<Asset>, DataError>;

    /// Daily circulating history for one asset.
    fn fetch_asset_history(&self, asset_id: &str) -> Result<AssetHistory, DataError>;

    /// Daily circulating total across all assets.
    fn fetch_total_history(&self) -> Result<Vec<TotalPoint>, DataError>;
}

/// Progress callback for the per-asset history loop.
pub trait HistoryProgress {
    /// Called before requesting an asset's history.
    fn on_start(&self, symbol: &str, index: usize, total: usize);

    /// Called when an asset's request completes.
    fn on_complete(&self, symbol: &str, index: usize, total: usize, result: &Result<(), DataError>);

    /// Called when every asset has been attempted.
    fn on_batch_complete(&self, succeeded: usize, failed: usize, total: usize);
}

/// Progress reporter that emits `tracing` events.
pub struct LogProgress;

impl HistoryProgress for LogProgress {
    fn on_start(&self, symbol: &str, index: usize, total: usize) {
        tracing::info!("[{}/{}] fetching history for {symbol}", index + 1, total);
    }

    fn on_complete(
        &self,
        symbol: &str,
        _index: usize,
        _total: usize,
        result: &Result<(), DataError>,
    ) {
        match result {
            Ok(()) => tracing::debug!(symbol, "history fetched"),
            Err(e) => tracing::warn!(symbol, error = %e, "history unavailable, using empty series"),
        }
    }

    fn on_batch_complete(&self, succeeded: usize, failed: usize, total: usize) {
        tracing::info!(succeeded, failed, total, "per-asset history complete");
    }
}

/// Progress reporter that does nothing.
pub struct SilentProgress;

impl HistoryProgress for SilentProgress {
    fn on_start(&self, _symbol: &str, _index: usize, _total: usize) {}

    fn on_complete(
        &self,
        _symbol: &str,
        _index: usize,
        _total: usize,
        _result: &Result<(), DataError>,
    ) {
    }

    fn on_batch_complete(&self, _succeeded: usize, _failed: usize, _total: usize) {}
}
