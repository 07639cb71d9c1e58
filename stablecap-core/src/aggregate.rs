//! Aggregator: join per-asset series onto the total series, derive the
//! residual bucket, and reduce to one record per calendar month.
//!
//! The aggregate total series defines the date domain. Asset values on dates
//! the total series does not cover are dropped. Months are computed in UTC.

use crate::data::DataError;
use crate::domain::{
    is_reserved_key, AssetSeries, DateRecord, MonthlyRecord, Timestamp, TotalPoint,
};
use chrono::{DateTime, Datelike, Utc};
use std::collections::BTreeMap;

/// Date-keyed join table.
pub type DateMap = BTreeMap<Timestamp, DateRecord>;

/// Seed the join table from the total series. Non-positive totals are skipped.
pub fn build_date_map(totals: &[TotalPoint]) -> DateMap {
    totals
        .iter()
        .filter(|p| p.total > 0.0)
        .map(|p| (p.date, DateRecord::new(p.date, p.total)))
        .collect()
}

/// Attach each asset's values under its symbol on dates already in the map.
///
/// Symbols are keys: when two series share a symbol, the later series
/// overwrites the earlier one's value on each date they both cover, and the
/// symbol is counted once in the residual. A symbol that collides with a
/// fixed record key (`date`, `total`, `기타`, `monthLabel`) is skipped, so
/// its value stays in others.
pub fn attach_series(date_map: &mut DateMap, series: &[AssetSeries]) {
    for s in series {
        if is_reserved_key(&s.symbol) {
            tracing::warn!(
                symbol = %s.symbol,
                "symbol collides with a record field; its history is left in others"
            );
            continue;
        }
        for (date, value) in &s.history {
            if let Some(record) = date_map.get_mut(date) {
                record.values.insert(&s.symbol, *value);
            }
        }
    }
}

/// Fill in `others = max(0, total - sum(values))` for every record.
///
/// Returns how many records had a negative residual, i.e. where the
/// per-asset series add up to more than the reported total.
pub fn fill_others(date_map: &mut DateMap) -> usize {
    let mut inconsistent = 0;
    for record in date_map.values_mut() {
        let residual = record.raw_residual();
        if residual < 0.0 {
            inconsistent += 1;
            tracing::debug!(
                date = record.date,
                total = record.total,
                excess = -residual,
                "top assets exceed total, clamping others to zero"
            );
        }
        record.others = residual.max(0.0);
    }
    inconsistent
}

fn to_datetime(ts: Timestamp) -> Result<DateTime<Utc>, DataError> {
    DateTime::from_timestamp(ts, 0)
        .ok_or_else(|| DataError::Invalid(format!("timestamp out of range: {ts}")))
}

/// `"Mar 2024"` style label for the month containing `ts`.
pub fn month_label(ts: Timestamp) -> Result<String, DataError> {
    Ok(to_datetime(ts)?.format("%b %Y").to_string())
}

/// Keep the latest record of each (year, month), sorted ascending by date.
pub fn bucket_monthly(date_map: DateMap) -> Result<Vec<MonthlyRecord>, DataError> {
    let mut by_month: BTreeMap<(i32, u32), DateRecord> = BTreeMap::new();

    for (date, record) in date_map {
        let dt = to_datetime(date)?;
        let key = (dt.year(), dt.month());
        let is_latest = by_month
            .get(&key)
            .map_or(true, |existing| existing.date < date);
        if is_latest {
            by_month.insert(key, record);
        }
    }

    let mut monthly = by_month
        .into_values()
        .map(|record| {
            Ok(MonthlyRecord {
                month_label: month_label(record.date)?,
                record,
            })
        })
        .collect::<Result<Vec<_>, DataError>>()?;

    monthly.sort_by_key(|m| m.date());
    Ok(monthly)
}

/// Full transform from raw series to monthly records.
pub fn aggregate(
    totals: &[TotalPoint],
    series: &[AssetSeries],
) -> Result<Vec<MonthlyRecord>, DataError> {
    let mut date_map = build_date_map(totals);
    attach_series(&mut date_map, series);

    let inconsistent = fill_others(&mut date_map);
    if inconsistent > 0 {
        tracing::warn!(
            dates = inconsistent,
            "top asset values exceed the aggregate total on some dates; others clamped to zero"
        );
    }

    let days = date_map.len();
    let monthly = bucket_monthly(date_map)?;
    tracing::debug!(days, months = monthly.len(), "aggregated history");
    Ok(monthly)
}
