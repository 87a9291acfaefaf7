use crate::error::Result;
use crate::model::{FileRow, Package};
use crate::value::SqlValue;
use std::sync::Arc;

/// Read access to the relational catalog.
///
/// Statements must select the column layouts from [`crate::projection`]:
/// [`CatalogStore::query_files`] expects `file_row_select()` rows and
/// [`CatalogStore::query_packages`] expects `package_select()` rows.
pub trait CatalogStore: Send + Sync {
    /// Runs a statement whose first column is a single integer count.
    fn count(&self, sql: &str, params: &[SqlValue]) -> Result<i64>;

    fn query_files(&self, sql: &str, params: &[SqlValue]) -> Result<Vec<FileRow>>;

    fn query_packages(&self, sql: &str, params: &[SqlValue]) -> Result<Vec<Package>>;
}

impl<T: CatalogStore + ?Sized> CatalogStore for Arc<T> {
    fn count(&self, sql: &str, params: &[SqlValue]) -> Result<i64> {
        (**self).count(sql, params)
    }

    fn query_files(&self, sql: &str, params: &[SqlValue]) -> Result<Vec<FileRow>> {
        (**self).query_files(sql, params)
    }

    fn query_packages(&self, sql: &str, params: &[SqlValue]) -> Result<Vec<Package>> {
        (**self).query_packages(sql, params)
    }
}
