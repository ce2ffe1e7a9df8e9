//! Configuration types for the SQLite database connection.
//!
//! This module provides configuration options for establishing and managing
//! SQLite database connections.

use serde::{Deserialize, Serialize};
use std::{path::PathBuf, time::Duration};

/// Configuration for SQLite database connections.
///
/// An in-memory database is convenient for tests and demos; every connection
/// of the pool shares it, but it disappears with the process.
///
/// # Examples
///
/// ```
/// use ras_sqlite::config::SqliteConfig;
/// use std::{path::PathBuf, time::Duration};
///
/// // In-memory database (default)
/// let config = SqliteConfig::default();
///
/// // File-based database
/// let config = SqliteConfig {
///     database_path: Some(PathBuf::from("auctions.db")),
///     create_if_missing: true,
///     submit_timeout: Duration::from_secs(2),
/// };
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SqliteConfig {
    /// Database file path. If None, uses in-memory database
    pub database_path: Option<PathBuf>,

    /// Whether to create the database if it doesn't exist
    #[serde(default = "default_true")]
    pub create_if_missing: bool,

    /// How long a bid submission may spend validating and appending before
    /// it is rolled back. The commit itself is never cut short.
    #[serde(default = "default_submit_timeout", with = "humantime_serde")]
    pub submit_timeout: Duration,
}

fn default_true() -> bool {
    true
}

fn default_submit_timeout() -> Duration {
    Duration::from_secs(5)
}

impl Default for SqliteConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            create_if_missing: true,
            submit_timeout: default_submit_timeout(),
        }
    }
}
