//! History fetcher: per-asset series, one request at a time, spaced by a fixed delay.

use super::provider::{DataError, HistoryProgress, StablecoinSource};
use crate::domain::{Asset, AssetHistory, AssetSeries};
use std::time::Duration;

/// Fetch the history of each asset in order.
///
/// A failed asset is reported through `progress`, recorded in the summary and
/// contributes an empty series; it never aborts the batch.
pub fn fetch_histories(
    source: &dyn StablecoinSource,
    assets: &[Asset],
    delay: Duration,
    progress: &dyn HistoryProgress,
) -> HistoryBatch {
    let total = assets.len();
    let mut series = Vec::with_capacity(total);
    let mut succeeded = 0;
    let mut errors: Vec<(String, DataError)> = Vec::new();

    for (i, asset) in assets.iter().enumerate() {
        if i > 0 && !delay.is_zero() {
            std::thread::sleep(delay);
        }

        progress.on_start(&asset.symbol, i, total);

        let mut history = AssetHistory::new();
        let result = source
            .fetch_asset_history(&asset.id)
            .map(|fetched| history = fetched);
        progress.on_complete(&asset.symbol, i, total, &result);

        match result {
            Ok(()) => succeeded += 1,
            Err(e) => errors.push((asset.symbol.clone(), e)),
        }

        series.push(AssetSeries {
            symbol: asset.symbol.clone(),
            history,
        });
    }

    progress.on_batch_complete(succeeded, errors.len(), total);

    HistoryBatch { series, errors }
}

/// Result of the per-asset history loop.
#[derive(Debug)]
pub struct HistoryBatch {
    /// One entry per requested asset, in request order.
    pub series: Vec<AssetSeries>,
    pub errors: Vec<(String, DataError)>,
}

impl HistoryBatch {
    pub fn succeeded(&self) -> usize {
        self.series.len() - self.errors.len()
    }

    pub fn failed(&self) -> usize {
        self.errors.len()
    }
}
