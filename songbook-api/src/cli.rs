//! Command-line arguments
//!
//! Every flag except `--config` and `--in-memory` maps onto one
//! [`ConfigOverrides`] field and wins over the config file.

use std::path::PathBuf;

use clap::Parser;
use songbook_common::config::ConfigOverrides;

#[derive(Debug, Parser)]
#[command(name = "songbook-api")]
#[command(about = "Song catalog HTTP service")]
#[command(version)]
pub struct Args {
    /// Explicit TOML config file (must exist when given)
    #[arg(short, long, env = "SONGBOOK_CONFIG")]
    pub config: Option<PathBuf>,

    /// SQLite database file
    #[arg(short, long, env = "SONGBOOK_DATABASE")]
    pub database: Option<PathBuf>,

    /// Interface to bind on
    #[arg(long, env = "SONGBOOK_HOST")]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "SONGBOOK_PORT")]
    pub port: Option<u16>,

    /// Log level used when RUST_LOG is not set
    #[arg(long, env = "SONGBOOK_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Per-request timeout in milliseconds
    #[arg(long, env = "SONGBOOK_REQUEST_TIMEOUT_MS")]
    pub request_timeout_ms: Option<u64>,

    /// Keep the catalog in process memory instead of SQLite
    #[arg(long)]
    pub in_memory: bool,
}

impl Args {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            database_path: self.database.clone(),
            host: self.host.clone(),
            port: self.port,
            request_timeout_ms: self.request_timeout_ms,
            log_level: self.log_level.clone(),
        }
    }
}
