use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    /// Failure reported by the underlying database. The message is the
    /// store's own text so callers can show it verbatim.
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Catalog connection poisoned")]
    Poisoned,
}

pub type Result<T> = std::result::Result<T, CatalogError>;
