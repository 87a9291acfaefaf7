use anyhow::{Context, Result};
use assetdex_query::QueryConfig;
use assetdex_usage::UsageConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const APP_DIR: &str = "assetdex";
const CONFIG_FILE: &str = "config.toml";
const DATABASE_FILE: &str = "catalog.db";

/// Settings read from `config.toml`.
///
/// ```toml
/// database = "/data/catalog.db"
///
/// [query]
/// max_page_size = 1000
/// allow_raw_predicates = true
///
/// [usage]
/// batch_size = 250
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub database: Option<PathBuf>,

    #[serde(default)]
    pub query: QueryConfig,

    #[serde(default)]
    pub usage: UsageConfig,
}

impl AppConfig {
    /// `<config dir>/assetdex/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
    }

    /// Loads `explicit` if given (it must exist), otherwise the default
    /// location when present, otherwise built-in defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => match Self::default_path().filter(|path| path.is_file()) {
                Some(path) => path,
                None => {
                    debug!("No config file found, using defaults");
                    return Ok(Self::default());
                }
            },
        };

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config = Self::from_toml(&contents)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.query.validate().map_err(anyhow::Error::msg)?;
        self.usage.validate().map_err(anyhow::Error::msg)?;
        Ok(())
    }

    /// Command-line override, then the configured path, then
    /// `<data dir>/assetdex/catalog.db`.
    pub fn database_path(&self, cli_override: Option<&Path>) -> Result<PathBuf> {
        if let Some(path) = cli_override.or(self.database.as_deref()) {
            return Ok(path.to_path_buf());
        }
        let data_dir =
            dirs::data_dir().context("No data directory on this platform; pass --database")?;
        Ok(data_dir.join(APP_DIR).join(DATABASE_FILE))
    }
}
