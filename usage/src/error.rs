use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum UsageError {
    #[error("Catalog lookup failed: {0}")]
    Store(#[from] assetdex_catalog::CatalogError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse manifest {path}: {source}")]
    Manifest {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid usage configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, UsageError>;
