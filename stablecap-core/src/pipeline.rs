//! Straight-line composition of the four stages: snapshot, rank, history, aggregate.

use crate::aggregate::aggregate;
use crate::config::Config;
use crate::data::history::fetch_histories;
use crate::data::{DataError, HistoryProgress, StablecoinSource};
use crate::domain::Output;
use crate::output::assemble_output;
use crate::rank::rank_assets;
use chrono::{DateTime, Utc};

/// Run the pipeline once against `source` and build the output document.
///
/// Snapshot and aggregate-history failures abort the run. Per-asset history
/// failures are logged and treated as empty series.
pub fn run_pipeline(
    source: &dyn StablecoinSource,
    config: &Config,
    progress: &dyn HistoryProgress,
    now: DateTime<Utc>,
) -> Result<Output, DataError> {
    tracing::info!(source = source.name(), "fetching current stablecoin snapshot");
    let assets = source.fetch_assets()?;

    let ranked = rank_assets(assets, config.top_n);
    tracing::info!(top = ?ranked.symbols(), others_total = ranked.others_total, "ranked assets");

    tracing::info!("fetching per-asset history");
    let batch = fetch_histories(source, &ranked.top, config.request_delay(), progress);
    if batch.failed() > 0 {
        tracing::warn!(
            failed = batch.failed(),
            succeeded = batch.succeeded(),
            "some asset histories are missing and count as zero"
        );
    }

    tracing::info!("fetching aggregate history");
    let totals = source.fetch_total_history()?;

    tracing::info!(points = totals.len(), "aggregating by month");
    let monthly = aggregate(&totals, &batch.series)?;

    Ok(assemble_output(&ranked, monthly, now))
}
