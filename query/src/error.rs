use thiserror::Error;

#[derive(Error, Debug)]
pub enum QueryError {
    /// The phrase asked for raw predicate mode but the configuration does
    /// not trust phrase input.
    #[error("Raw predicate search is disabled; enable allow_raw_predicates to use '=' phrases")]
    RawPredicateNotAllowed,

    #[error("{0}")]
    Store(#[from] assetdex_catalog::CatalogError),

    #[error("Invalid query configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, QueryError>;
