//! JSON files the CLI works with: UTXO pool snapshots, transaction batches and unsigned
//! transaction templates.

use crate::LedgerError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::Path;

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, LedgerError> {
    let data = fs::read_to_string(path).map_err(|source| LedgerError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&data).map_err(|source| LedgerError::Json {
        path: path.to_path_buf(),
        source,
    })
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), LedgerError> {
    let data = serde_json::to_string_pretty(value).map_err(|source| LedgerError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, data).map_err(|source| LedgerError::Io {
        path: path.to_path_buf(),
        source,
    })
}
