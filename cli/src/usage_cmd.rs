use anyhow::{Context, Result};
use assetdex_catalog::CatalogStore;
use assetdex_usage::{
    UsageConfig, UsageProgress, UsageReport, UsageRequest, UsageResolver, manifest_path,
    read_manifest, scan_project_identifiers,
};
use clap::Parser;
use owo_colors::OwoColorize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[derive(Debug, Parser)]
pub struct UsageArgs {
    /// Root of the project to analyse
    #[arg(value_name = "PROJECT")]
    pub project: PathBuf,

    /// Identifiers per catalog lookup (overrides the config file)
    #[arg(long, value_name = "N")]
    pub batch_size: Option<usize>,

    /// Ignore the project's Packages/manifest.json
    #[arg(long)]
    pub no_manifest: bool,

    /// Allow packages indexed from inside the project as origins
    #[arg(long)]
    pub include_project: bool,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

/// Scans `project`, reads its manifest and resolves everything against the
/// catalog. Ctrl-C stops the sweep after the current batch.
pub async fn resolve_project<S>(
    store: S,
    config: UsageConfig,
    project: &Path,
    read_installed: bool,
    show_progress: bool,
) -> Result<UsageReport>
where
    S: CatalogStore,
{
    let project = std::path::absolute(project)
        .with_context(|| format!("Invalid project path {}", project.display()))?;
    let identifiers = scan_project_identifiers(&project)
        .with_context(|| format!("Failed to scan {}", project.display()))?;

    let manifest = manifest_path(&project);
    let installed = if read_installed && manifest.is_file() {
        read_manifest(&manifest)?
    } else {
        Vec::new()
    };
    info!(
        "{} identifiers, {} installed registry packages",
        identifiers.len(),
        installed.len()
    );

    let mut resolver = UsageResolver::new(store, config).context("Invalid usage configuration")?;
    if show_progress {
        resolver = resolver.with_progress(Arc::new(|p: UsageProgress| {
            eprint!(
                "\r  batch {}/{} ({} of {} identifiers)",
                p.batch, p.batches, p.processed, p.total
            );
            if p.batch == p.batches {
                eprintln!();
            }
        }));
    }

    let cancel = CancellationToken::new();
    let ctrl_c = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupted, stopping after the current batch");
                cancel.cancel();
            }
        })
    };

    let request = UsageRequest {
        identifiers,
        project_location: Some(project.display().to_string()),
        installed,
    };
    let result = resolver.resolve(&request, &cancel).await;
    ctrl_c.abort();
    Ok(result?)
}

pub async fn run_usage<S: CatalogStore>(
    args: &UsageArgs,
    mut config: UsageConfig,
    store: S,
) -> Result<()> {
    if let Some(batch_size) = args.batch_size {
        config.batch_size = batch_size;
    }
    if args.include_project {
        config.exclude_project_location = false;
    }

    let report =
        resolve_project(store, config, &args.project, !args.no_manifest, !args.json).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }
    print_report(&report);
    Ok(())
}

fn print_report(report: &UsageReport) {
    if !report.is_complete() {
        println!(
            "{} Cancelled: partial results for {} of {} identifiers",
            "⚠".bright_yellow(),
            report.processed(),
            report.total_identifiers
        );
    }

    let summary = report.summary();
    println!("{} Usage", "▶".bright_blue());
    println!("  Resolved: {}", summary.resolved.bright_cyan());
    println!("  Ambiguous: {}", summary.ambiguous.bright_yellow());
    println!(
        "  Unidentified: {} ({:.1}%)",
        summary.unidentified.bright_red(),
        summary.unidentified_ratio * 100.0
    );

    if !report.ambiguous.is_empty() {
        println!("\n{} Ambiguous identifiers", "▶".bright_blue());
        for (identifier, candidates) in &report.ambiguous {
            println!("  {}", identifier.bright_yellow());
            for row in candidates {
                println!(
                    "    {} {}",
                    row.package.display_name,
                    row.file.path.bright_black()
                );
            }
        }
    }

    let used = report.used_packages();
    println!("\n{} {} packages in use", "▶".bright_blue(), used.len().bright_cyan());
    for package in used {
        let price = package
            .price
            .map(|price| format!("{price:.2}"))
            .unwrap_or_else(|| "-".to_string());
        let marker = if package.is_virtual() { " (not indexed)" } else { "" };
        println!(
            "  {}{}  {}  {}",
            package.display_name,
            marker.dimmed(),
            price.bright_black(),
            package.license.as_deref().unwrap_or("").bright_black()
        );
    }
    if summary.priced_packages > 0 {
        println!(
            "\n  Total price: {:.2} over {} priced packages",
            summary.total_price, summary.priced_packages
        );
    }
    for (license, count) in &summary.licenses {
        println!("  {license}: {count}");
    }
}
