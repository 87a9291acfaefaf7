pub mod config;
pub mod output;
pub mod packages_cmd;
pub mod search_cmd;
pub mod usage_cmd;

pub use config::AppConfig;
pub use packages_cmd::{PackagesArgs, run_packages};
pub use search_cmd::{SearchArgs, run_search};
pub use usage_cmd::{UsageArgs, resolve_project, run_usage};
