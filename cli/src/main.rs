use anyhow::{Context, Result};
use assetdex_catalog::SqliteCatalog;
use assetdex_cli::{
    AppConfig, PackagesArgs, SearchArgs, UsageArgs, run_packages, run_search, run_usage,
};
use assetdex_query::QueryCompiler;
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{Level, debug};
use tracing_subscriber::EnvFilter;

/// Search, browse and trace the origin of indexed packages and files.
#[derive(Debug, Parser)]
#[command(name = "assetdex", version)]
struct Cli {
    /// Config file (defaults to <config dir>/assetdex/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Catalog database (overrides the config file)
    #[arg(long, global = true, value_name = "PATH")]
    database: Option<PathBuf>,

    /// More log output on stderr; repeat for more detail
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Search files in the catalog
    Search(SearchArgs),

    /// List packages, optionally grouped into a tree
    Packages(PackagesArgs),

    /// Report which packages a project uses
    Usage(UsageArgs),
}

fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let env_filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = AppConfig::load(cli.config.as_deref())?;
    let database = config.database_path(cli.database.as_deref())?;
    if let Some(parent) = database.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    debug!("Opening catalog {}", database.display());
    let catalog = Arc::new(
        SqliteCatalog::open(&database)
            .with_context(|| format!("Failed to open catalog {}", database.display()))?,
    );

    match cli.command {
        Command::Search(args) => {
            let compiler = QueryCompiler::new(config.query)?;
            run_search(&args, &compiler, &catalog)
        }
        Command::Packages(args) => {
            let compiler = QueryCompiler::new(config.query)?;
            run_packages(&args, &compiler, config.usage, catalog).await
        }
        Command::Usage(args) => run_usage(&args, config.usage, catalog).await,
    }
}
