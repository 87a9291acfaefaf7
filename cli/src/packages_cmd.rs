use crate::output::{GroupArg, SourceArg, human_size};
use crate::usage_cmd::resolve_project;
use anyhow::{Result, bail};
use assetdex_catalog::{Package, SqliteCatalog};
use assetdex_query::{PackageFilter, PackageSort, QueryCompiler, TagSelector, run_package_query};
use assetdex_tree::{NodeKind, Tree, materialize};
use assetdex_usage::{UsageConfig, UsageReport};
use clap::{Parser, ValueEnum};
use owo_colors::OwoColorize;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Parser)]
pub struct PackagesArgs {
    /// Name phrase, same syntax as file search
    #[arg(value_name = "PHRASE", default_value = "", allow_hyphen_values = true)]
    pub phrase: String,

    #[arg(short, long, value_enum, default_value_t = GroupArg::None)]
    pub group_by: GroupArg,

    #[arg(long)]
    pub publisher: Option<String>,

    #[arg(long)]
    pub category: Option<String>,

    #[arg(long, value_enum)]
    pub source: Option<SourceArg>,

    /// Only packages tagged with this tag id
    #[arg(long, value_name = "TAG_ID", conflicts_with = "untagged")]
    pub tag: Option<i64>,

    /// Only packages without any tag
    #[arg(long)]
    pub untagged: bool,

    #[arg(long, value_enum, default_value_t = PackageSortArg::Name)]
    pub sort: PackageSortArg,

    #[arg(long)]
    pub desc: bool,

    #[arg(long)]
    pub include_excluded: bool,

    /// Only packages the given project uses
    #[arg(long, value_name = "PROJECT")]
    pub used_in: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum PackageSortArg {
    Name,
    Publisher,
    Category,
    Size,
    Price,
}

impl From<PackageSortArg> for PackageSort {
    fn from(arg: PackageSortArg) -> Self {
        match arg {
            PackageSortArg::Name => PackageSort::Name,
            PackageSortArg::Publisher => PackageSort::Publisher,
            PackageSortArg::Category => PackageSort::Category,
            PackageSortArg::Size => PackageSort::Size,
            PackageSortArg::Price => PackageSort::Price,
        }
    }
}

impl PackagesArgs {
    pub fn filter(&self) -> PackageFilter {
        PackageFilter {
            phrase: self.phrase.clone(),
            include_excluded: self.include_excluded,
            publisher: self.publisher.clone(),
            category: self.category.clone(),
            source: self.source.map(Into::into),
            tag: match (self.tag, self.untagged) {
                (Some(tag), _) => TagSelector::Tag(tag),
                (None, true) => TagSelector::Untagged,
                (None, false) => TagSelector::Any,
            },
            sort: self.sort.into(),
            descending: self.desc,
        }
    }
}

pub async fn run_packages(
    args: &PackagesArgs,
    compiler: &QueryCompiler,
    usage: UsageConfig,
    catalog: Arc<SqliteCatalog>,
) -> Result<()> {
    let listing = run_package_query(compiler, &catalog, &args.filter());
    if let Some(message) = &listing.error {
        bail!("Query failed: {message}");
    }
    let mut filtered = listing.rows;
    let mut full = catalog.all_packages()?;

    if let Some(project) = &args.used_in {
        let report = resolve_project(Arc::clone(&catalog), usage, project, true, false).await?;
        restrict_to_used(&mut filtered, &mut full, report)?;
    }

    let tree = materialize(&filtered, args.group_by.into(), &full);
    print_tree(&tree);
    Ok(())
}

/// Keeps only the packages `report` saw in use and adds its placeholders.
/// A cancelled sweep is refused rather than shown as a complete listing.
fn restrict_to_used(
    filtered: &mut Vec<Package>,
    full: &mut Vec<Package>,
    report: UsageReport,
) -> Result<()> {
    if !report.is_complete() {
        bail!(
            "Usage sweep cancelled after {} of {} identifiers; not listing partial results",
            report.processed(),
            report.total_identifiers
        );
    }
    let used = report.used_package_ids();
    filtered.retain(|package| used.contains(&package.id));
    filtered.extend(report.virtual_packages.iter().cloned());
    full.extend(report.virtual_packages);
    Ok(())
}

fn package_line(package: &Package) -> String {
    let mut details = Vec::new();
    if let Some(publisher) = &package.publisher {
        details.push(publisher.clone());
    }
    if package.size > 0 {
        details.push(human_size(package.size));
    }
    if let Some(version) = &package.current_version {
        details.push(version.clone());
    }
    details.join(", ")
}

fn print_tree(tree: &Tree) {
    if tree.is_empty() {
        println!("{} No packages found", "✗".bright_red());
        return;
    }
    for node in tree.iter() {
        let indent = "  ".repeat(usize::try_from(node.depth).unwrap_or(0));
        match node.kind {
            NodeKind::Root => {}
            NodeKind::Group => println!("{indent}{}", node.label.bright_blue().bold()),
            NodeKind::Package => {
                let details = node.package.as_ref().map(package_line).unwrap_or_default();
                println!("{indent}{}  {}", node.label, details.bright_black());
            }
            NodeKind::BundleMember => {
                println!("{indent}{} {}", "↳".dimmed(), node.label.dimmed());
            }
        }
    }
    println!(
        "\n{} top-level packages",
        tree.top_level_package_count().to_string().bright_cyan()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use assetdex_catalog::{FileEntry, SourceKind};
    use assetdex_usage::{UsageRequest, UsageResolver};
    use pretty_assertions::assert_eq;
    use tokio_util::sync::CancellationToken;

    fn catalog() -> Arc<SqliteCatalog> {
        let catalog = SqliteCatalog::open_in_memory().expect("open");
        for (id, name, guid) in [(1, "Road Tools", "aaa111"), (2, "Net Kit", "bbb222")] {
            catalog
                .insert_package(&Package::new(id, name, SourceKind::StorePackage))
                .expect("package");
            catalog
                .insert_file(&FileEntry::new(id, format!("{name}/a.prefab")).with_guid(guid))
                .expect("file");
        }
        Arc::new(catalog)
    }

    async fn sweep(catalog: Arc<SqliteCatalog>, cancel: &CancellationToken) -> UsageReport {
        let request = UsageRequest {
            identifiers: ["aaa111".to_string()].into(),
            ..Default::default()
        };
        UsageResolver::new(catalog, UsageConfig::default())
            .expect("config")
            .resolve(&request, cancel)
            .await
            .expect("resolve")
    }

    #[tokio::test]
    async fn complete_sweep_keeps_used_packages() {
        let catalog = catalog();
        let mut full = catalog.all_packages().expect("packages");
        let mut filtered = full.clone();

        let report = sweep(Arc::clone(&catalog), &CancellationToken::new()).await;
        restrict_to_used(&mut filtered, &mut full, report).expect("complete");
        assert_eq!(
            filtered.iter().map(|p| p.id).collect::<Vec<_>>(),
            vec![1]
        );
    }

    #[tokio::test]
    async fn cancelled_sweep_is_not_listed() {
        let catalog = catalog();
        let mut full = catalog.all_packages().expect("packages");
        let mut filtered = full.clone();

        let cancel = CancellationToken::new();
        cancel.cancel();
        let report = sweep(catalog, &cancel).await;
        let err = restrict_to_used(&mut filtered, &mut full, report).expect_err("partial");
        assert!(err.to_string().contains("cancelled after 0 of 1"), "{err}");
        assert_eq!(filtered.len(), 2, "listing left untouched");
    }
}
