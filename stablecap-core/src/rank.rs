//! Ranker: top-N assets by circulating value plus an aggregated remainder.

use crate::domain::{Asset, PieSlice, OTHERS_FULL_NAME, OTHERS_LABEL};

/// Default number of assets shown individually.
pub const DEFAULT_TOP_N: usize = 10;

/// Top assets in descending order and the summed value of everything else.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedSet {
    pub top: Vec<Asset>,
    pub others_total: f64,
}

impl RankedSet {
    /// Symbols of the top assets, in rank order.
    pub fn symbols(&self) -> Vec<String> {
        self.top.iter().map(|a| a.symbol.clone()).collect()
    }

    /// One slice per top asset, then a trailing others slice (always present).
    pub fn pie_slices(&self) -> Vec<PieSlice> {
        let mut slices: Vec<PieSlice> = self
            .top
            .iter()
            .map(|a| PieSlice {
                name: a.symbol.clone(),
                value: a.circulating,
                full_name: a.name.clone(),
            })
            .collect();

        slices.push(PieSlice {
            name: OTHERS_LABEL.to_string(),
            value: self.others_total,
            full_name: OTHERS_FULL_NAME.to_string(),
        });
        slices
    }
}

/// Sort descending by circulating value and split after `top_n`.
///
/// The sort is stable, so ties keep their input order. Fewer than `top_n`
/// assets is not an error: the top list is shorter and others is zero.
pub fn rank_assets(mut assets: Vec<Asset>, top_n: usize) -> RankedSet {
    assets.sort_by(|a, b| b.circulating.total_cmp(&a.circulating));

    let rest = assets.split_off(top_n.min(assets.len()));
    let others_total: f64 = rest.iter().map(|a| a.circulating).sum();

    RankedSet {
        top: assets,
        others_total,
    }
}
