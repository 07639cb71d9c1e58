//! Output document assembly and export (JSON).
//!
//! The file is written to `{path}.tmp` and renamed into place, so a failed
//! run never leaves a truncated document behind.

use crate::domain::{MonthlyRecord, Output};
use crate::rank::RankedSet;
use chrono::{DateTime, Utc};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("failed to serialize output: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// `"2024-03-05 14:07 UTC"`
pub fn format_last_updated(now: DateTime<Utc>) -> String {
    now.format("%Y-%m-%d %H:%M UTC").to_string()
}

pub fn assemble_output(
    ranked: &RankedSet,
    historical_data: Vec<MonthlyRecord>,
    now: DateTime<Utc>,
) -> Output {
    Output {
        last_updated: format_last_updated(now),
        top_stablecoins: ranked.symbols(),
        pie_data: ranked.pie_slices(),
        historical_data,
    }
}

/// Indented JSON with non-ASCII characters written literally.
pub fn to_json(output: &Output) -> Result<String, OutputError> {
    Ok(serde_json::to_string_pretty(output)?)
}

pub fn write_output(path: &Path, output: &Output) -> Result<(), OutputError> {
    let json = to_json(output)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| OutputError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = PathBuf::from(tmp_name);

    fs::write(&tmp_path, json).map_err(|source| OutputError::Write {
        path: tmp_path.clone(),
        source,
    })?;

    fs::rename(&tmp_path, path).map_err(|source| {
        let _ = fs::remove_file(&tmp_path);
        OutputError::Write {
            path: path.to_path_buf(),
            source,
        }
    })?;

    Ok(())
}
