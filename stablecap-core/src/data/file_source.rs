//! Offline source: saved API responses in a directory.
//!
//! Layout mirrors the API paths:
//! - `{dir}/stablecoins.json`
//! - `{dir}/stablecoin/{id}.json`
//! - `{dir}/stablecoincharts_all.json`

use super::provider::{DataError, StablecoinSource};
use super::schema;
use crate::domain::{Asset, AssetHistory, TotalPoint};
use std::path::PathBuf;

pub struct FileSource {
    dir: PathBuf,
}

impl FileSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn read(&self, path: PathBuf) -> Result<String, DataError> {
        std::fs::read_to_string(&path).map_err(|source| DataError::Io { path, source })
    }
}

impl StablecoinSource for FileSource {
    fn name(&self) -> &str {
        "files"
    }

    fn fetch_assets(&self) -> Result<Vec<Asset>, DataError> {
        let body = self.read(self.dir.join("stablecoins.json"))?;
        schema::parse_snapshot(&body)
    }

    fn fetch_asset_history(&self, asset_id: &str) -> Result<AssetHistory, DataError> {
        let body = self.read(self.dir.join("stablecoin").join(format!("{asset_id}.json")))?;
        schema::parse_asset_history(&body)
    }

    fn fetch_total_history(&self) -> Result<Vec<TotalPoint>, DataError> {
        let body = self.read(self.dir.join("stablecoincharts_all.json"))?;
        schema::parse_total_history(&body)
    }
}
