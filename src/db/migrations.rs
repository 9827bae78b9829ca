//! Database migrations module
//!
//! Code-based schema migrations, embedded as SQL strings for single-binary
//! deployment. Each migration has a unique version; applied versions are
//! tracked in a `_migrations` table and skipped on subsequent runs.

use anyhow::{Context, Result};
use sqlx::{Row, SqlitePool};

/// A database migration
#[derive(Debug, Clone)]
pub struct Migration {
    /// Migration version number (must be unique and sequential)
    pub version: i32,
    /// Human-readable migration name
    pub name: &'static str,
    /// SQL statements
    pub up: &'static str,
}

/// All migrations for the Seedling CMS
pub const MIGRATIONS: &[Migration] = &[
    // Migration 1: nurseries are the tenant-partitioning unit; everything
    // else hangs off them.
    Migration {
        version: 1,
        name: "create_nurseries",
        up: r#"
            CREATE TABLE IF NOT EXISTS nurseries (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name VARCHAR(100) NOT NULL,
                location VARCHAR(100) NOT NULL UNIQUE,
                address TEXT NOT NULL,
                phone VARCHAR(50),
                email VARCHAR(255),
                opening_hours VARCHAR(255),
                hero_image VARCHAR(255),
                description TEXT,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
            );
            CREATE INDEX IF NOT EXISTS idx_nurseries_location ON nurseries(location);
        "#,
    },
    // Migration 2: staff accounts; nursery_id is null only for super admins
    Migration {
        version: 2,
        name: "create_users",
        up: r#"
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username VARCHAR(50) NOT NULL UNIQUE,
                email VARCHAR(255) NOT NULL UNIQUE,
                password_hash VARCHAR(255) NOT NULL,
                role VARCHAR(20) NOT NULL DEFAULT 'staff',
                nursery_id INTEGER,
                is_active INTEGER NOT NULL DEFAULT 1,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                FOREIGN KEY (nursery_id) REFERENCES nurseries(id) ON DELETE SET NULL
            );
            CREATE INDEX IF NOT EXISTS idx_users_username ON users(username);
            CREATE INDEX IF NOT EXISTS idx_users_email ON users(email);
            CREATE INDEX IF NOT EXISTS idx_users_nursery_id ON users(nursery_id);
        "#,
    },
    // Migration 3: server-side sessions
    Migration {
        version: 3,
        name: "create_sessions",
        up: r#"
            CREATE TABLE IF NOT EXISTS sessions (
                id VARCHAR(64) PRIMARY KEY,
                user_id INTEGER NOT NULL,
                expires_at TIMESTAMP NOT NULL,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
            );
            CREATE INDEX IF NOT EXISTS idx_sessions_user_id ON sessions(user_id);
            CREATE INDEX IF NOT EXISTS idx_sessions_expires_at ON sessions(expires_at);
        "#,
    },
    // Migration 4: events, cascade on nursery delete
    Migration {
        version: 4,
        name: "create_events",
        up: r#"
            CREATE TABLE IF NOT EXISTS events (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                nursery_id INTEGER NOT NULL,
                title VARCHAR(200) NOT NULL,
                description TEXT,
                starts_at TIMESTAMP NOT NULL,
                ends_at TIMESTAMP,
                location VARCHAR(255),
                created_by INTEGER,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                FOREIGN KEY (nursery_id) REFERENCES nurseries(id) ON DELETE CASCADE,
                FOREIGN KEY (created_by) REFERENCES users(id) ON DELETE SET NULL
            );
            CREATE INDEX IF NOT EXISTS idx_events_nursery_id ON events(nursery_id);
            CREATE INDEX IF NOT EXISTS idx_events_starts_at ON events(starts_at);
        "#,
    },
    // Migration 5: newsletters; nursery_id null = all-nurseries broadcast
    Migration {
        version: 5,
        name: "create_newsletters",
        up: r#"
            CREATE TABLE IF NOT EXISTS newsletters (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                nursery_id INTEGER,
                title VARCHAR(200) NOT NULL,
                description TEXT,
                file_url VARCHAR(255),
                published_at TIMESTAMP NOT NULL,
                tag VARCHAR(100),
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                FOREIGN KEY (nursery_id) REFERENCES nurseries(id) ON DELETE CASCADE
            );
            CREATE INDEX IF NOT EXISTS idx_newsletters_nursery_id ON newsletters(nursery_id);
            CREATE INDEX IF NOT EXISTS idx_newsletters_published_at ON newsletters(published_at);
        "#,
    },
    // Migration 6: gallery categories and images
    Migration {
        version: 6,
        name: "create_gallery",
        up: r#"
            CREATE TABLE IF NOT EXISTS gallery_categories (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                nursery_id INTEGER NOT NULL,
                name VARCHAR(100) NOT NULL,
                description TEXT,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                FOREIGN KEY (nursery_id) REFERENCES nurseries(id) ON DELETE CASCADE
            );
            CREATE INDEX IF NOT EXISTS idx_gallery_categories_nursery_id ON gallery_categories(nursery_id);

            CREATE TABLE IF NOT EXISTS gallery_images (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                nursery_id INTEGER NOT NULL,
                category_id INTEGER,
                title VARCHAR(200),
                image_url VARCHAR(255) NOT NULL,
                status VARCHAR(20) NOT NULL DEFAULT 'draft',
                featured INTEGER NOT NULL DEFAULT 0,
                sort_order INTEGER NOT NULL DEFAULT 0,
                uploaded_by INTEGER,
                approved_by INTEGER,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                FOREIGN KEY (nursery_id) REFERENCES nurseries(id) ON DELETE CASCADE,
                FOREIGN KEY (category_id) REFERENCES gallery_categories(id) ON DELETE SET NULL,
                FOREIGN KEY (uploaded_by) REFERENCES users(id) ON DELETE SET NULL,
                FOREIGN KEY (approved_by) REFERENCES users(id) ON DELETE SET NULL
            );
            CREATE INDEX IF NOT EXISTS idx_gallery_images_nursery_id ON gallery_images(nursery_id);
            CREATE INDEX IF NOT EXISTS idx_gallery_images_category_id ON gallery_images(category_id);
            CREATE INDEX IF NOT EXISTS idx_gallery_images_status ON gallery_images(status);
        "#,
    },
    // Migration 7: append-only activity log
    Migration {
        version: 7,
        name: "create_activity_logs",
        up: r#"
            CREATE TABLE IF NOT EXISTS activity_logs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER,
                action VARCHAR(100) NOT NULL,
                entity_type VARCHAR(50) NOT NULL,
                entity_id INTEGER,
                nursery_id INTEGER,
                detail TEXT,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE SET NULL
            );
            CREATE INDEX IF NOT EXISTS idx_activity_logs_nursery_id ON activity_logs(nursery_id);
            CREATE INDEX IF NOT EXISTS idx_activity_logs_created_at ON activity_logs(created_at);
        "#,
    },
    // Migration 8: public contact submissions
    Migration {
        version: 8,
        name: "create_contact_submissions",
        up: r#"
            CREATE TABLE IF NOT EXISTS contact_submissions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name VARCHAR(100) NOT NULL,
                email VARCHAR(255) NOT NULL,
                phone VARCHAR(50),
                message TEXT NOT NULL,
                nursery_id INTEGER,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                FOREIGN KEY (nursery_id) REFERENCES nurseries(id) ON DELETE SET NULL
            );
            CREATE INDEX IF NOT EXISTS idx_contact_submissions_nursery_id ON contact_submissions(nursery_id);
        "#,
    },
];

/// Run all pending migrations.
///
/// Returns the number of migrations applied.
pub async fn run_migrations(pool: &SqlitePool) -> Result<usize> {
    create_migrations_table(pool).await?;

    let applied = applied_versions(pool).await?;

    let mut count = 0;
    for migration in MIGRATIONS {
        if !applied.contains(&migration.version) {
            tracing::info!(
                "Applying migration {}: {}",
                migration.version,
                migration.name
            );
            apply_migration(pool, migration)
                .await
                .with_context(|| format!("Failed to apply migration: {}", migration.name))?;
            count += 1;
        }
    }

    if count > 0 {
        tracing::info!("Applied {} migration(s)", count);
    } else {
        tracing::debug!("No pending migrations");
    }

    Ok(count)
}

async fn create_migrations_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS _migrations (
            version INTEGER PRIMARY KEY,
            name VARCHAR(100) NOT NULL,
            applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await
    .context("Failed to create migrations table")?;

    Ok(())
}

async fn applied_versions(pool: &SqlitePool) -> Result<Vec<i32>> {
    let rows = sqlx::query("SELECT version FROM _migrations ORDER BY version")
        .fetch_all(pool)
        .await
        .context("Failed to read applied migrations")?;

    Ok(rows.iter().map(|row| row.get::<i64, _>("version") as i32).collect())
}

async fn apply_migration(pool: &SqlitePool, migration: &Migration) -> Result<()> {
    // SQLite executes one statement at a time through sqlx, so split on ';'
    for statement in migration.up.split(';') {
        let statement = statement.trim();
        if statement.is_empty() {
            continue;
        }
        sqlx::query(statement)
            .execute(pool)
            .await
            .with_context(|| format!("Failed statement in migration {}", migration.name))?;
    }

    sqlx::query("INSERT INTO _migrations (version, name) VALUES (?, ?)")
        .bind(migration.version)
        .bind(migration.name)
        .execute(pool)
        .await
        .context("Failed to record migration")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_test_pool;

    #[tokio::test]
    async fn test_run_migrations_applies_all() {
        let pool = create_test_pool().await.expect("Failed to create pool");

        let count = run_migrations(&pool).await.expect("Migrations failed");
        assert_eq!(count, MIGRATIONS.len());
    }

    #[tokio::test]
    async fn test_run_migrations_is_idempotent() {
        let pool = create_test_pool().await.expect("Failed to create pool");

        run_migrations(&pool).await.expect("Migrations failed");
        let second = run_migrations(&pool).await.expect("Migrations failed");
        assert_eq!(second, 0);
    }

    #[tokio::test]
    async fn test_migration_versions_are_unique_and_ordered() {
        let mut versions: Vec<i32> = MIGRATIONS.iter().map(|m| m.version).collect();
        let original = versions.clone();
        versions.sort_unstable();
        versions.dedup();
        assert_eq!(versions.len(), MIGRATIONS.len(), "Versions must be unique");
        assert_eq!(original, versions, "Versions must be in ascending order");
    }

    #[tokio::test]
    async fn test_expected_tables_exist() {
        let pool = create_test_pool().await.expect("Failed to create pool");
        run_migrations(&pool).await.expect("Migrations failed");

        for table in [
            "nurseries",
            "users",
            "sessions",
            "events",
            "newsletters",
            "gallery_categories",
            "gallery_images",
            "activity_logs",
            "contact_submissions",
        ] {
            let row = sqlx::query(
                "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?",
            )
            .bind(table)
            .fetch_optional(&pool)
            .await
            .expect("Failed to query sqlite_master");
            assert!(row.is_some(), "Missing table: {}", table);
        }
    }
}
