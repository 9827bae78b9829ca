//! SQLite connection pool creation
//!
//! The production store is a file-backed SQLite database; tests use an
//! in-memory database. Foreign keys are enabled on every connection so
//! that nursery deletion cascades to its owned content.

use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;

use crate::config::DatabaseConfig;

/// Create a SQLite connection pool from configuration.
///
/// For file-backed databases the parent directory is created if missing
/// and the connection URL gets `mode=rwc` so the database file is created
/// on first run.
pub async fn create_pool(config: &DatabaseConfig) -> Result<SqlitePool> {
    create_sqlite_pool(&config.url).await
}

async fn create_sqlite_pool(url: &str) -> Result<SqlitePool> {
    let in_memory = url == ":memory:" || url.starts_with("sqlite::memory:");

    if !in_memory {
        let path = url.trim_start_matches("sqlite:");
        if let Some(parent) = std::path::Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create database directory: {:?}", parent)
                })?;
            }
        }
    }

    let connection_url = if in_memory {
        "sqlite::memory:".to_string()
    } else if url.starts_with("sqlite:") {
        if url.contains('?') {
            url.to_string()
        } else {
            format!("{}?mode=rwc", url)
        }
    } else {
        format!("sqlite:{}?mode=rwc", url)
    };

    // An in-memory database exists per connection, so the pool must not
    // hand out more than one.
    let max_connections = if in_memory { 1 } else { 20 };

    // The foreign_keys pragma is per-connection; setting it through the
    // connect options applies it to every connection the pool opens.
    let options = SqliteConnectOptions::from_str(&connection_url)
        .with_context(|| format!("Invalid SQLite connection URL: {}", connection_url))?
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await
        .with_context(|| format!("Failed to connect to SQLite database: {}", url))?;

    Ok(pool)
}

/// Create an in-memory pool for testing
pub async fn create_test_pool() -> Result<SqlitePool> {
    create_sqlite_pool(":memory:").await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StorageDriver;

    #[tokio::test]
    async fn test_in_memory_pool_creation() {
        let pool = create_test_pool().await.expect("Failed to create pool");
        sqlx::query("SELECT 1")
            .fetch_one(&pool)
            .await
            .expect("Ping should succeed");
    }

    #[tokio::test]
    async fn test_foreign_keys_enabled() {
        let pool = create_test_pool().await.expect("Failed to create pool");
        let (enabled,): (i64,) = sqlx::query_as("PRAGMA foreign_keys")
            .fetch_one(&pool)
            .await
            .expect("Failed to query pragma");
        assert_eq!(enabled, 1);
    }

    #[tokio::test]
    async fn test_foreign_keys_enabled_on_every_connection() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let config = DatabaseConfig {
            driver: StorageDriver::Sqlite,
            url: temp_dir.path().join("fk.db").to_string_lossy().to_string(),
        };

        let pool = create_pool(&config).await.expect("Failed to create pool");

        // Hold two connections at once so the second cannot be a reuse
        // of the first.
        let mut first = pool.acquire().await.expect("Failed to acquire connection");
        let mut second = pool.acquire().await.expect("Failed to acquire connection");

        let (enabled,): (i64,) = sqlx::query_as("PRAGMA foreign_keys")
            .fetch_one(&mut *first)
            .await
            .expect("Failed to query pragma");
        assert_eq!(enabled, 1);

        let (enabled,): (i64,) = sqlx::query_as("PRAGMA foreign_keys")
            .fetch_one(&mut *second)
            .await
            .expect("Failed to query pragma");
        assert_eq!(enabled, 1);
    }

    #[tokio::test]
    async fn test_file_pool_creates_nested_directories() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("nested").join("dir").join("test.db");

        let config = DatabaseConfig {
            driver: StorageDriver::Sqlite,
            url: db_path.to_string_lossy().to_string(),
        };

        let pool = create_pool(&config).await.expect("Failed to create pool");
        sqlx::query("SELECT 1")
            .fetch_one(&pool)
            .await
            .expect("Ping should succeed");

        assert!(db_path.exists());
    }
}
