/*!
# Catalog

Record types and the store boundary for the package/file inventory.

The catalog holds two related record types, [`Package`] and [`FileEntry`],
plus named tags assigned to either of them (see [`TagTarget`]). Everything
above this crate talks to the catalog through the [`CatalogStore`] trait:
parameterized SQL in, typed rows out. [`SqliteCatalog`] is the bundled
implementation.

## Example

```rust,no_run
use assetdex_catalog::{CatalogStore, Package, SourceKind, SqliteCatalog, projection};

fn main() -> assetdex_catalog::Result<()> {
    let catalog = SqliteCatalog::open_in_memory()?;
    catalog.insert_package(&Package::new(0, "Racing Kit", SourceKind::StorePackage))?;

    let sql = format!("{} ORDER BY p.display_name", projection::package_select());
    let packages = catalog.query_packages(&sql, &[])?;
    println!("{} packages", packages.len());
    Ok(())
}
```
*/

mod error;
mod model;
mod names;
pub mod projection;
mod sqlite;
mod store;
mod value;

pub use error::{CatalogError, Result};
pub use model::{FileEntry, FileRow, Package, PreviewState, SourceKind, TagTarget, UpdateState};
pub use names::{normalize_location, safe_name};
pub use sqlite::SqliteCatalog;
pub use store::CatalogStore;
pub use value::SqlValue;
