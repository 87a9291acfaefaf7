/*!
# Usage

Finds out which catalog packages a project actually uses.

The project's content identifiers (collected from its `.meta` sidecars by
[`scan_project_identifiers`]) are looked up in the catalog in batches. Each
identifier ends up in exactly one bucket of the [`UsageReport`]:

- **resolved**: one package ships it
- **ambiguous**: several packages ship it; all candidates are kept
- **unidentified**: no package ships it

Installed registry dependencies that the catalog does not know yet are added
as virtual packages so reports can still name them.

## Example

```rust,no_run
use assetdex_catalog::SqliteCatalog;
use assetdex_usage::{UsageConfig, UsageRequest, UsageResolver, scan_project_identifiers};
use std::path::Path;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let project = Path::new("/projects/racer");
    let resolver = UsageResolver::new(SqliteCatalog::open("catalog.db")?, UsageConfig::default())?;
    let request = UsageRequest {
        identifiers: scan_project_identifiers(project)?,
        project_location: Some(project.display().to_string()),
        installed: Vec::new(),
    };

    let report = resolver.resolve(&request, &CancellationToken::new()).await?;
    for package in report.used_packages() {
        println!("{}", package.display_name);
    }
    Ok(())
}
```
*/

mod config;
mod error;
mod manifest;
mod report;
mod resolver;
mod scan;

pub use config::UsageConfig;
pub use error::{Result, UsageError};
pub use manifest::{InstalledDependency, manifest_path, parse_manifest, read_manifest};
pub use report::{Completion, Resolution, UNKNOWN_LICENSE, UsageReport, UsageSummary};
pub use resolver::{ProgressCallback, UsageProgress, UsageRequest, UsageResolver};
pub use scan::{META_EXTENSION, meta_guid, scan_project_identifiers};
