//! Store connection management.
//!
//! The job holds a single connection for its whole run. The connection
//! string comes from [`DbConfig::connection_string`](crate::config::DbConfig::connection_string)
//! and is never echoed back in errors or output.

use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;

use crate::config::Config;

/// Open the configured SQLite database.
///
/// - Creates the database file and parent directories if they don't exist.
/// - Enables WAL journal mode.
/// - Returns a pool capped at one connection.
pub async fn connect(config: &Config) -> Result<SqlitePool> {
    let url = config.db.connection_string()?;

    let options = SqliteConnectOptions::from_str(&url)
        .context("Invalid store connection string")?
        .create_if_missing(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal);

    // Ensure parent directory exists
    if let Some(parent) = options.get_filename().parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
    }

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .context("Failed to connect to the product store")?;

    Ok(pool)
}
