//! Wire formats of the DefiLlama stablecoins API and their conversion to domain types.
//!
//! The API is inconsistent about scalar types: asset ids arrive as strings or
//! numbers, and the aggregate chart encodes `date` as a decimal string while
//! per-asset series use a number. Everything is normalised here so downstream
//! joins compare like with like.

use super::provider::DataError;
use crate::domain::{Asset, AssetHistory, Timestamp, TotalPoint};
use serde::Deserialize;

/// `GET /stablecoins` response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SnapshotResponse {
    pegged_assets: Vec<PeggedAsset>,
}

#[derive(Debug, Deserialize)]
struct PeggedAsset {
    id: WireId,
    name: String,
    symbol: String,
    #[serde(default)]
    circulating: Option<PeggedAmounts>,
}

/// Nested amount object, e.g. `{"peggedUSD": 123.4}`.
#[derive(Debug, Default, Deserialize)]
struct PeggedAmounts {
    #[serde(rename = "peggedUSD", default)]
    pegged_usd: Option<f64>,
}

impl PeggedAmounts {
    /// USD amount of an optional amount object. Absent at either level means 0.
    fn usd_or_zero(amounts: Option<&PeggedAmounts>) -> f64 {
        amounts.and_then(|a| a.pegged_usd).unwrap_or(0.0)
    }
}

/// `GET /stablecoin/{id}` response.
#[derive(Debug, Deserialize)]
struct AssetHistoryResponse {
    #[serde(default)]
    tokens: Vec<HistoryEntry>,
}

#[derive(Debug, Deserialize)]
struct HistoryEntry {
    date: WireTimestamp,
    #[serde(default)]
    circulating: Option<PeggedAmounts>,
}

/// One element of `GET /stablecoincharts/all`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TotalEntry {
    date: WireTimestamp,
    #[serde(default)]
    total_circulating: Option<PeggedAmounts>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WireId {
    Text(String),
    Number(i64),
}

impl WireId {
    fn into_string(self) -> String {
        match self {
            WireId::Text(s) => s,
            WireId::Number(n) => n.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WireTimestamp {
    Int(i64),
    Float(f64),
    Text(String),
}

impl WireTimestamp {
    fn to_epoch(&self) -> Result<Timestamp, DataError> {
        match self {
            WireTimestamp::Int(ts) => Ok(*ts),
            WireTimestamp::Float(ts) if ts.is_finite() && ts.fract() == 0.0 => Ok(*ts as i64),
            WireTimestamp::Float(ts) => {
                Err(DataError::Invalid(format!("non-integral timestamp: {ts}")))
            }
            WireTimestamp::Text(s) => s
                .trim()
                .parse::<i64>()
                .map_err(|_| DataError::Invalid(format!("unparseable timestamp: {s:?}"))),
        }
    }
}

fn from_json<'a, T: Deserialize<'a>>(what: &str, body: &'a str) -> Result<T, DataError> {
    serde_json::from_str(body)
        .map_err(|e| DataError::Parse(format!("failed to parse {what}: {e}")))
}

/// Parse the snapshot payload, keeping only assets with positive circulating value.
pub fn parse_snapshot(body: &str) -> Result<Vec<Asset>, DataError> {
    let resp: SnapshotResponse = from_json("stablecoin snapshot", body)?;
    let listed = resp.pegged_assets.len();

    let assets: Vec<Asset> = resp
        .pegged_assets
        .into_iter()
        .map(|p| Asset {
            circulating: PeggedAmounts::usd_or_zero(p.circulating.as_ref()),
            id: p.id.into_string(),
            symbol: p.symbol,
            name: p.name,
        })
        .filter(|a| a.circulating > 0.0)
        .collect();

    tracing::debug!(listed, qualifying = assets.len(), "parsed snapshot");
    Ok(assets)
}

/// Parse one asset's history payload into a date → circulating mapping.
///
/// Entries without a circulating amount map to 0. A repeated date keeps the
/// last value seen.
pub fn parse_asset_history(body: &str) -> Result<AssetHistory, DataError> {
    let resp: AssetHistoryResponse = from_json("asset history", body)?;
    let mut history = AssetHistory::new();
    for entry in resp.tokens {
        let date = entry.date.to_epoch()?;
        history.insert(date, PeggedAmounts::usd_or_zero(entry.circulating.as_ref()));
    }
    Ok(history)
}

/// Parse the aggregate chart payload, dropping non-positive totals.
pub fn parse_total_history(body: &str) -> Result<Vec<TotalPoint>, DataError> {
    let entries: Vec<TotalEntry> = from_json("total history", body)?;
    let mut points = Vec::with_capacity(entries.len());
    for entry in entries {
        let total = PeggedAmounts::usd_or_zero(entry.total_circulating.as_ref());
        if total > 0.0 {
            points.push(TotalPoint {
                date: entry.date.to_epoch()?,
                total,
            });
        }
    }
    Ok(points)
}
