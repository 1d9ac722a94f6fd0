//! Command line options and the immutable server configuration.

use axum::http::HeaderName;
use clap::Parser;
use std::path::PathBuf;

use crate::git::blob::DEFAULT_MAX_BLOB_SIZE;
use crate::git::diff::DiffOptions;

pub const DEFAULT_HISTORY_LIMIT: usize = 100;
pub const DEFAULT_USER_HEADER: &str = "x-remote-user";

/// gitgate - Browse git repositories behind per-repository permissions
#[derive(Parser, Debug)]
#[command(name = "gitgate")]
#[command(about = "A permission-gated git repository browser", long_about = None)]
pub struct Cli {
    /// JSON file with repositories, identities and grants
    #[arg(long, value_name = "FILE")]
    pub registry: PathBuf,

    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1")]
    pub bind: String,

    /// Port to run the server on
    #[arg(short, long, default_value = "3001")]
    pub port: u16,

    /// Blobs larger than this many bytes are shown without content
    #[arg(long, default_value_t = DEFAULT_MAX_BLOB_SIZE)]
    pub max_blob_size: u64,

    /// Maximum number of commits in a history listing
    #[arg(long, default_value_t = DEFAULT_HISTORY_LIMIT)]
    pub history_limit: usize,

    /// Trusted request header carrying the authenticated username
    #[arg(long, default_value = DEFAULT_USER_HEADER, value_parser = parse_header_name)]
    pub user_header: HeaderName,
}

fn parse_header_name(value: &str) -> Result<HeaderName, String> {
    HeaderName::from_bytes(value.trim().to_ascii_lowercase().as_bytes())
        .map_err(|e| format!("invalid header name '{}': {}", value, e))
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub max_blob_size: u64,
    pub history_limit: usize,
    pub user_header: HeaderName,
}

impl ServerConfig {
    pub fn diff_options(&self) -> DiffOptions {
        DiffOptions {
            max_blob_size: self.max_blob_size,
            ..DiffOptions::default()
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            max_blob_size: DEFAULT_MAX_BLOB_SIZE,
            history_limit: DEFAULT_HISTORY_LIMIT,
            user_header: HeaderName::from_static(DEFAULT_USER_HEADER),
        }
    }
}

impl From<&Cli> for ServerConfig {
    fn from(cli: &Cli) -> Self {
        Self {
            max_blob_size: cli.max_blob_size,
            history_limit: cli.history_limit,
            user_header: cli.user_header.clone(),
        }
    }
}
