//! Property tests for ranking and aggregation invariants.
//!
//! Uses proptest to verify:
//! 1. Ranking — top length, descending order, value conservation
//! 2. Residual — others == max(0, total - sum of present values)
//! 3. Monthly bucketing — one record per month, the latest one, ascending

use chrono::{DateTime, Datelike};
use proptest::prelude::*;
use stablecap_core::aggregate::{aggregate, attach_series, build_date_map, fill_others};
use stablecap_core::domain::{Asset, AssetHistory, AssetSeries, TotalPoint};
use stablecap_core::rank_assets;
use std::collections::{BTreeMap, HashSet};

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_value() -> impl Strategy<Value = f64> {
    (0.01..1.0e9_f64).prop_map(|v| (v * 100.0).round() / 100.0)
}

fn arb_assets() -> impl Strategy<Value = Vec<Asset>> {
    prop::collection::vec(arb_value(), 0..30).prop_map(|values| {
        values
            .into_iter()
            .enumerate()
            .map(|(i, circulating)| Asset {
                id: i.to_string(),
                symbol: format!("S{i}"),
                name: format!("Coin {i}"),
                circulating,
            })
            .collect()
    })
}

/// Day-aligned timestamps between 2018 and 2026.
fn arb_day() -> impl Strategy<Value = i64> {
    (17_532_i64..20_454).prop_map(|d| d * 86_400)
}

fn arb_totals() -> impl Strategy<Value = Vec<TotalPoint>> {
    prop::collection::vec((arb_day(), arb_value()), 1..120)
        .prop_map(|pts| pts.into_iter().map(|(date, total)| TotalPoint { date, total }).collect())
}

fn arb_series(dates: Vec<i64>) -> impl Strategy<Value = Vec<AssetSeries>> {
    let n = dates.len();
    prop::collection::vec(
        prop::collection::vec((prop::sample::select(dates), arb_value()), 0..n.max(1)),
        0..10,
    )
    .prop_map(|per_asset| {
        per_asset
            .into_iter()
            .enumerate()
            .map(|(i, points)| AssetSeries {
                symbol: format!("S{i}"),
                history: points.into_iter().collect::<AssetHistory>(),
            })
            .collect()
    })
}

fn arb_totals_and_series() -> impl Strategy<Value = (Vec<TotalPoint>, Vec<AssetSeries>)> {
    arb_totals().prop_flat_map(|totals| {
        let dates: Vec<i64> = totals.iter().map(|p| p.date).collect();
        (Just(totals), arb_series(dates))
    })
}

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-6 * a.abs().max(b.abs()).max(1.0)
}

// ── 1. Ranking ───────────────────────────────────────────────────────

proptest! {
    #[test]
    fn ranking_conserves_value(assets in arb_assets(), top_n in 1usize..15) {
        let all: f64 = assets.iter().map(|a| a.circulating).sum();
        let count = assets.len();
        let ranked = rank_assets(assets, top_n);

        prop_assert_eq!(ranked.top.len(), top_n.min(count));
        prop_assert!(ranked.top.windows(2).all(|w| w[0].circulating >= w[1].circulating));

        let top_sum: f64 = ranked.top.iter().map(|a| a.circulating).sum();
        prop_assert!(approx_eq(top_sum + ranked.others_total, all));

        let pie = ranked.pie_slices();
        prop_assert_eq!(pie.len(), ranked.top.len() + 1);
        prop_assert_eq!(pie.last().unwrap().name.as_str(), "기타");
    }
}

// ── 2. Residual ──────────────────────────────────────────────────────

proptest! {
    #[test]
    fn others_is_clamped_residual((totals, series) in arb_totals_and_series()) {
        let mut map = build_date_map(&totals);
        attach_series(&mut map, &series);
        fill_others(&mut map);

        for record in map.values() {
            prop_assert!(record.others >= 0.0);
            let expected = (record.total - record.values.sum()).max(0.0);
            prop_assert_eq!(record.others, expected);
        }
    }
}

// ── 3. Monthly bucketing ─────────────────────────────────────────────

proptest! {
    #[test]
    fn one_latest_record_per_month((totals, series) in arb_totals_and_series()) {
        let monthly = aggregate(&totals, &series).unwrap();

        let mut latest: BTreeMap<(i32, u32), i64> = BTreeMap::new();
        for p in &totals {
            let dt = DateTime::from_timestamp(p.date, 0).unwrap();
            let entry = latest.entry((dt.year(), dt.month())).or_insert(p.date);
            *entry = (*entry).max(p.date);
        }

        prop_assert_eq!(monthly.len(), latest.len());
        prop_assert!(monthly.windows(2).all(|w| w[0].date() < w[1].date()));

        let mut seen = HashSet::new();
        for m in &monthly {
            let dt = DateTime::from_timestamp(m.date(), 0).unwrap();
            let key = (dt.year(), dt.month());
            prop_assert!(seen.insert(key), "duplicate month {:?}", key);
            prop_assert_eq!(Some(&m.date()), latest.get(&key));
        }
    }
}
