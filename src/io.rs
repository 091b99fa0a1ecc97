//! File helpers for sample input and JSON reports.
//!
//! - `load_samples_json`: read a JSON array of sample records.
//! - `write_json_file`: pretty-print a serializable value to disk.

use crate::error::{OverlayError, Result};
use crate::types::SampleRecord;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Reads a JSON array of [`SampleRecord`]s with native coordinates `N`.
pub fn load_samples_json<N: DeserializeOwned>(path: &Path) -> Result<Vec<SampleRecord<N>>> {
    let data = fs::read_to_string(path).map_err(|source| OverlayError::Io {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_str(&data).map_err(|source| OverlayError::Json {
        path: path.display().to_string(),
        source,
    })
}

/// Serialize a value as pretty JSON to `path`, creating parent directories.
pub fn write_json_file<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    ensure_parent_dir(path)?;
    let json = serde_json::to_string_pretty(value).map_err(|source| OverlayError::Json {
        path: path.display().to_string(),
        source,
    })?;
    fs::write(path, json).map_err(|source| OverlayError::Io {
        path: path.display().to_string(),
        source,
    })
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|source| OverlayError::Io {
                path: parent.display().to_string(),
                source,
            })?;
        }
    }
    Ok(())
}
