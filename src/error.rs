use crate::{CryptoError, Utxo};
use std::path::PathBuf;
use thiserror::Error;

/// Environment-level failures: encoding, key material, and the files the CLI reads and writes.
/// A transaction failing validation is not an error, see `Rejection`.
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Failed to encode transaction data: {0}")]
    Encoding(#[from] bincode::Error),

    #[error(transparent)]
    Crypto(#[from] CryptoError),

    #[error("Failed to access: {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Malformed JSON in: {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("UTXO: {0} is listed more than once")]
    DuplicateUtxo(Utxo),

    #[error("{0}")]
    InvalidArgument(String),
}
