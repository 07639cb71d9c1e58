//! Domain types: assets, pie slices, per-date and per-month records, output document.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;

/// Epoch seconds, day granularity as delivered by the API.
pub type Timestamp = i64;

/// Label of the residual bucket, used both as pie slice name and record key.
pub const OTHERS_LABEL: &str = "기타";

/// Full display name of the residual pie slice.
pub const OTHERS_FULL_NAME: &str = "기타 스테이블코인";

/// Fixed keys of a serialized monthly record. A symbol with one of these
/// names cannot be stored alongside them.
pub const RESERVED_KEYS: [&str; 4] = ["date", "total", OTHERS_LABEL, "monthLabel"];

pub fn is_reserved_key(symbol: &str) -> bool {
    RESERVED_KEYS.iter().any(|key| *key == symbol)
}

/// A tracked stablecoin with its current circulating USD value.
#[derive(Debug, Clone, PartialEq)]
pub struct Asset {
    pub id: String,
    pub symbol: String,
    pub name: String,
    pub circulating: f64,
}

/// Circulating value per day for one asset. Sparse: only dates the API reports.
pub type AssetHistory = BTreeMap<Timestamp, f64>;

/// One point of the aggregate (all assets) circulating series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TotalPoint {
    pub date: Timestamp,
    pub total: f64,
}

/// Historical series fetched for one ranked asset.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetSeries {
    pub symbol: String,
    pub history: AssetHistory,
}

/// A pie chart slice.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PieSlice {
    pub name: String,
    pub value: f64,
    pub full_name: String,
}

/// Per-symbol values with explicit presence, kept in insertion order.
///
/// A symbol inserted twice keeps its first position and takes the new value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SymbolValues {
    entries: Vec<(String, f64)>,
}

impl SymbolValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, symbol: &str, value: f64) {
        match self.entries.iter_mut().find(|(s, _)| s == symbol) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((symbol.to_string(), value)),
        }
    }

    pub fn get(&self, symbol: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(s, _)| s == symbol)
            .map(|(_, v)| *v)
    }

    /// Sum of present values. Absent symbols contribute nothing.
    pub fn sum(&self) -> f64 {
        self.entries.iter().map(|(_, v)| v).sum()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(s, v)| (s.as_str(), *v))
    }
}

/// All data known for a single date of the aggregate series.
#[derive(Debug, Clone, PartialEq)]
pub struct DateRecord {
    pub date: Timestamp,
    pub total: f64,
    pub values: SymbolValues,
    /// `max(0, total - values.sum())`, filled in by the aggregator.
    pub others: f64,
}

impl DateRecord {
    pub fn new(date: Timestamp, total: f64) -> Self {
        Self {
            date,
            total,
            values: SymbolValues::new(),
            others: 0.0,
        }
    }

    /// Residual before clamping. Negative when the per-asset series exceed the total.
    pub fn raw_residual(&self) -> f64 {
        self.total - self.values.sum()
    }
}

/// The latest date record of a calendar month, labelled for display.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyRecord {
    pub record: DateRecord,
    pub month_label: String,
}

impl MonthlyRecord {
    pub fn date(&self) -> Timestamp {
        self.record.date
    }
}

// Flattened into one JSON object: date, total, symbols, others, monthLabel.
impl Serialize for MonthlyRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.record.values.len() + 4))?;
        map.serialize_entry("date", &self.record.date)?;
        map.serialize_entry("total", &self.record.total)?;
        for (symbol, value) in self.record.values.iter().filter(|(s, _)| !is_reserved_key(s)) {
            map.serialize_entry(symbol, &value)?;
        }
        map.serialize_entry(OTHERS_LABEL, &self.record.others)?;
        map.serialize_entry("monthLabel", &self.month_label)?;
        map.end()
    }
}

/// The JSON document consumed by the chart front end.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Output {
    pub last_updated: String,
    pub top_stablecoins: Vec<String>,
    pub pie_data: Vec<PieSlice>,
    pub historical_data: Vec<MonthlyRecord>,
}
