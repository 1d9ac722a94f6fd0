//! gitgate - a permission-gated git repository browser.
//!
//! The `git` module is a read-only view of repositories (path resolution,
//! history, last-change annotations, diffs). `access` decides who may see or
//! manage a repository, `registry` holds the records it decides over, and
//! `routes` exposes both as a JSON API.

pub mod access;
pub mod config;
pub mod error;
pub mod git;
pub mod models;
pub mod registry;
pub mod routes;
pub mod state;

pub use config::{Cli, ServerConfig};
pub use error::{AppError, Result};
pub use registry::Registry;
pub use routes::create_router;
pub use state::AppState;
