/*!
# Query

Faceted search over the catalog, compiled to parameterized SQL.

A caller-owned [`FilterState`] goes in; a [`CompiledQuery`] comes out with a
count statement and a page statement rendered from the same ordered list of
predicates, so the reported total always matches what paging can reach.

## Phrase modes

```text
+car -toy wheel    tokens: required, excluded, any-of (path or description)
~red_car           one literal substring of the search field
=f.size > 1024     raw predicate, only with `allow_raw_predicates`
```

`_` and `\` are escaped in every non-raw mode, so `red_car` does not match
`redXcar`.

## Example

```rust,no_run
use assetdex_catalog::SqliteCatalog;
use assetdex_query::{FilterState, QueryCompiler, QueryConfig, run_file_query};

fn main() -> anyhow::Result<()> {
    let catalog = SqliteCatalog::open("catalog.db")?;
    let compiler = QueryCompiler::new(QueryConfig::default())?;

    let filter = FilterState {
        phrase: "+car -toy".to_string(),
        file_type: Some("Prefabs".to_string()),
        page: 2,
        page_size: 25,
        ..Default::default()
    };
    let page = run_file_query(&compiler, &catalog, &filter);
    println!("{} of {} ({} pages)", page.rows.len(), page.total, page.page_count());
    Ok(())
}
```
*/

mod compiler;
mod config;
mod error;
mod filter;
mod packages;
mod page;
mod phrase;
pub mod predicate;

pub use compiler::{CompiledQuery, Pagination, QueryCompiler, Statement};
pub use config::{QueryConfig, SearchField};
pub use error::{QueryError, Result};
pub use filter::{FilterState, PreviewSelector, RangeFilter, SortField, TagSelector};
pub use packages::{PackageFilter, PackageQuery, PackageSort};
pub use page::{ResultPage, run_file_query, run_package_query};
pub use phrase::{SearchPhrase, Token, parse_phrase};
