use crate::config::UsageConfig;
use crate::error::{Result, UsageError};
use crate::manifest::InstalledDependency;
use crate::report::{Completion, UsageReport};
use assetdex_catalog::projection::{file_row_select, package_select};
use assetdex_catalog::{
    CatalogStore, FileRow, Package, SourceKind, SqlValue, normalize_location, safe_name,
};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Progress callback for usage sweeps
pub type ProgressCallback = Arc<dyn Fn(UsageProgress) + Send + Sync>;

/// Reported after every batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageProgress {
    /// Identifiers looked up so far
    pub processed: usize,
    pub total: usize,
    /// 1-based number of the batch just finished
    pub batch: usize,
    pub batches: usize,
}

/// What to resolve and against which project.
#[derive(Debug, Clone, Default)]
pub struct UsageRequest {
    pub identifiers: BTreeSet<String>,
    /// Root of the consuming project. Packages indexed from this folder or
    /// below are never reported as origins.
    pub project_location: Option<String>,
    /// Registry packages installed in the project.
    pub installed: Vec<InstalledDependency>,
}

/// Maps content identifiers back to the packages that ship them.
pub struct UsageResolver<S> {
    store: S,
    config: UsageConfig,
    progress: Option<ProgressCallback>,
}

impl<S: CatalogStore> UsageResolver<S> {
    pub fn new(store: S, config: UsageConfig) -> Result<Self> {
        config.validate().map_err(UsageError::InvalidConfig)?;
        Ok(Self {
            store,
            config,
            progress: None,
        })
    }

    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.progress = Some(callback);
        self
    }

    /// Looks up every identifier in batches.
    ///
    /// `cancel` is checked before each batch. Once it fires, no further
    /// batches are submitted and the report comes back marked
    /// [`Completion::Cancelled`] with whatever was resolved so far.
    pub async fn resolve(
        &self,
        request: &UsageRequest,
        cancel: &CancellationToken,
    ) -> Result<UsageReport> {
        let identifiers: Vec<&String> = request.identifiers.iter().collect();
        let total = identifiers.len();
        let batch_size = self.config.batch_size;
        let batches = total.div_ceil(batch_size);
        info!("Resolving {} identifiers in {} batches", total, batches);

        let project = self.project_filter(request);
        let mut report = UsageReport::new(total);
        let mut processed = 0usize;

        for (batch_idx, batch) in identifiers.chunks(batch_size).enumerate() {
            if cancel.is_cancelled() {
                info!(
                    "Usage sweep cancelled after {} of {} identifiers",
                    processed, total
                );
                report.completion = Completion::Cancelled;
                return Ok(report);
            }

            let rows = self.lookup_batch(batch, project.as_deref())?;
            classify(batch, rows, &mut report);
            processed += batch.len();

            debug!(
                "Batch {}/{}: {} resolved, {} ambiguous, {} unidentified so far",
                batch_idx + 1,
                batches,
                report.resolved.len(),
                report.ambiguous.len(),
                report.unidentified.len()
            );
            if let Some(cb) = &self.progress {
                cb(UsageProgress {
                    processed,
                    total,
                    batch: batch_idx + 1,
                    batches,
                });
            }

            tokio::task::yield_now().await;
        }

        if cancel.is_cancelled() {
            report.completion = Completion::Cancelled;
            return Ok(report);
        }

        report.virtual_packages = self.virtual_packages(&request.installed)?;

        info!(
            "Usage sweep complete: {} resolved, {} ambiguous, {} unidentified, {} virtual packages",
            report.resolved.len(),
            report.ambiguous.len(),
            report.unidentified.len(),
            report.virtual_packages.len()
        );
        Ok(report)
    }

    fn project_filter(&self, request: &UsageRequest) -> Option<String> {
        if !self.config.exclude_project_location {
            return None;
        }
        request
            .project_location
            .as_deref()
            .map(normalize_location)
            .filter(|location| !location.is_empty())
    }

    fn lookup_batch(&self, batch: &[&String], project: Option<&str>) -> Result<Vec<FileRow>> {
        let placeholders = vec!["?"; batch.len()].join(", ");
        let mut sql = format!("{} WHERE f.guid IN ({placeholders})", file_row_select());
        let mut params: Vec<SqlValue> =
            batch.iter().map(|id| SqlValue::from(id.as_str())).collect();

        if let Some(project) = project {
            sql.push_str(
                " AND (p.location IS NULL OR NOT (p.location LIKE ? ESCAPE '\\' \
                 OR p.location LIKE ? ESCAPE '\\'))",
            );
            let escaped = escape_like_all(project.trim_end_matches('/'));
            params.push(SqlValue::Text(escaped.clone()));
            params.push(SqlValue::Text(format!("{escaped}/%")));
        }
        sql.push_str(" ORDER BY f.guid, p.id, f.id");

        Ok(self.store.query_files(&sql, &params)?)
    }

    /// Placeholder packages for installed registry dependencies the catalog
    /// does not know, with ids counting down from -1.
    fn virtual_packages(&self, installed: &[InstalledDependency]) -> Result<Vec<Package>> {
        if installed.is_empty() {
            return Ok(Vec::new());
        }
        let names: Vec<String> = installed.iter().map(|dep| safe_name(&dep.name)).collect();
        let placeholders = vec!["?"; names.len()].join(", ");
        let sql = format!(
            "{} WHERE p.source = ? AND p.safe_name IN ({placeholders})",
            package_select()
        );
        let mut params = vec![SqlValue::Integer(SourceKind::RegistryPackage.code())];
        params.extend(names.iter().map(|name| SqlValue::from(name.as_str())));

        let indexed: HashSet<String> = self
            .store
            .query_packages(&sql, &params)?
            .into_iter()
            .map(|package| package.safe_name)
            .collect();

        let mut next_id = -1;
        let mut packages = Vec::new();
        for (dependency, safe) in installed.iter().zip(&names) {
            if indexed.contains(safe) {
                continue;
            }
            let mut package = Package::new(next_id, &dependency.name, SourceKind::RegistryPackage);
            package.current_version = Some(dependency.version.clone());
            packages.push(package);
            next_id -= 1;
        }
        Ok(packages)
    }
}

/// Buckets one batch. Rows arrive ordered by identifier.
fn classify(batch: &[&String], rows: Vec<FileRow>, report: &mut UsageReport) {
    let mut by_identifier: BTreeMap<String, Vec<FileRow>> = BTreeMap::new();
    for row in rows {
        if let Some(guid) = row.file.guid.clone() {
            by_identifier.entry(guid).or_default().push(row);
        }
    }

    for &identifier in batch {
        match by_identifier.remove(identifier.as_str()) {
            None => {
                report.unidentified.insert(identifier.clone());
            }
            Some(candidates) => {
                let owners: BTreeSet<i64> = candidates.iter().map(|row| row.package.id).collect();
                if owners.len() > 1 {
                    report.ambiguous.insert(identifier.clone(), candidates);
                } else {
                    report.resolved.insert(identifier.clone(), candidates);
                }
            }
        }
    }
}

/// Escapes all LIKE metacharacters; project paths are matched literally.
fn escape_like_all(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}
