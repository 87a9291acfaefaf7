//! Running compiled queries against a store.
//!
//! Compile and store failures stop here: they come back as a page with no
//! rows and the failure message, never as an `Err`.

use crate::compiler::{Pagination, QueryCompiler};
use crate::error::Result;
use crate::filter::FilterState;
use crate::packages::PackageFilter;
use assetdex_catalog::{CatalogStore, FileRow, Package};
use serde::Serialize;
use tracing::{debug, warn};

/// One page of matches plus the total the filter can produce.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ResultPage<T> {
    pub rows: Vec<T>,
    pub total: u64,
    pub page: u32,
    /// 0 for unpaged listings.
    pub page_size: u32,
    /// Literal compiler or store message when the query failed.
    pub error: Option<String>,
}

impl<T> ResultPage<T> {
    pub fn failed(pagination: Pagination, message: impl Into<String>) -> Self {
        Self {
            rows: Vec::new(),
            total: 0,
            page: pagination.page,
            page_size: pagination.page_size,
            error: Some(message.into()),
        }
    }

    /// `ceil(total / page_size)`; an unpaged listing is one page when it has
    /// any rows.
    pub fn page_count(&self) -> u64 {
        if self.page_size == 0 {
            return u64::from(self.total > 0);
        }
        self.total.div_ceil(u64::from(self.page_size))
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Compiles `filter`, runs its count and page statements and returns the
/// page.
pub fn run_file_query<S>(
    compiler: &QueryCompiler,
    store: &S,
    filter: &FilterState,
) -> ResultPage<FileRow>
where
    S: CatalogStore + ?Sized,
{
    let requested = compiler.pagination(filter.page, filter.page_size);
    match fetch_files(compiler, store, filter) {
        Ok(page) => page,
        Err(e) => {
            warn!("File query failed: {e}");
            ResultPage::failed(requested, e.to_string())
        }
    }
}

fn fetch_files<S>(
    compiler: &QueryCompiler,
    store: &S,
    filter: &FilterState,
) -> Result<ResultPage<FileRow>>
where
    S: CatalogStore + ?Sized,
{
    let query = compiler.compile(filter)?;
    let pagination = query.pagination();

    let count = query.count_query();
    let total = u64::try_from(store.count(&count.sql, &count.params)?).unwrap_or(0);

    let page = query.page_query();
    debug!(sql = %page.sql, params = page.params.len(), "running file page query");
    Ok(ResultPage {
        rows: store.query_files(&page.sql, &page.params)?,
        total,
        page: pagination.page,
        page_size: pagination.page_size,
        error: None,
    })
}

/// Runs the package listing; the result is unpaged.
pub fn run_package_query<S>(
    compiler: &QueryCompiler,
    store: &S,
    filter: &PackageFilter,
) -> ResultPage<Package>
where
    S: CatalogStore + ?Sized,
{
    match fetch_packages(compiler, store, filter) {
        Ok(rows) => ResultPage {
            total: rows.len() as u64,
            rows,
            page: 1,
            page_size: 0,
            error: None,
        },
        Err(e) => {
            warn!("Package query failed: {e}");
            let unpaged = Pagination {
                page: 1,
                page_size: 0,
                offset: 0,
            };
            ResultPage::failed(unpaged, e.to_string())
        }
    }
}

fn fetch_packages<S>(
    compiler: &QueryCompiler,
    store: &S,
    filter: &PackageFilter,
) -> Result<Vec<Package>>
where
    S: CatalogStore + ?Sized,
{
    let statement = compiler.compile_packages(filter)?.statement();
    debug!(sql = %statement.sql, "running package query");
    Ok(store.query_packages(&statement.sql, &statement.params)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::QueryConfig;
    use crate::error::QueryError;
    use assetdex_catalog::{CatalogError, SqlValue};
    use pretty_assertions::assert_eq;

    fn page(total: u64, page_size: u32) -> ResultPage<()> {
        ResultPage {
            rows: Vec::new(),
            total,
            page: 1,
            page_size,
            error: None,
        }
    }

    #[test]
    fn page_count_is_ceiling() {
        for (total, size, expected) in [
            (0, 25, 0),
            (1, 25, 1),
            (25, 25, 1),
            (26, 25, 2),
            (35, 25, 2),
        ] {
            assert_eq!(page(total, size).page_count(), expected, "{total}/{size}");
        }
        assert_eq!(page(3, 0).page_count(), 1);
        assert_eq!(page(0, 0).page_count(), 0);
    }

    /// Store whose every call fails.
    struct BrokenStore;

    impl CatalogStore for BrokenStore {
        fn count(&self, _sql: &str, _params: &[SqlValue]) -> assetdex_catalog::Result<i64> {
            Err(broken())
        }

        fn query_files(
            &self,
            _sql: &str,
            _params: &[SqlValue],
        ) -> assetdex_catalog::Result<Vec<FileRow>> {
            Err(broken())
        }

        fn query_packages(
            &self,
            _sql: &str,
            _params: &[SqlValue],
        ) -> assetdex_catalog::Result<Vec<Package>> {
            Err(broken())
        }
    }

    fn broken() -> CatalogError {
        CatalogError::Poisoned
    }

    #[test]
    fn store_failures_surface_as_store_errors() {
        let compiler = QueryCompiler::new(QueryConfig::default()).expect("config");
        let err = fetch_files(&compiler, &BrokenStore, &FilterState::default())
            .expect_err("store fails");
        assert!(matches!(err, QueryError::Store(_)), "{err:?}");

        let page = run_file_query(&compiler, &BrokenStore, &FilterState::default());
        assert!(page.rows.is_empty());
        assert_eq!(page.total, 0);
        assert_eq!(page.error, Some(err.to_string()));

        let listing = run_package_query(&compiler, &BrokenStore, &PackageFilter::default());
        assert!(listing.is_error());
    }
}
