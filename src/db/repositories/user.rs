//! User repository
//!
//! Database operations for staff accounts.
//!
//! This module provides:
//! - `UserRepository` trait defining the interface for user data access
//! - `SqlxUserRepository` implementing the trait for SQLite

use crate::models::{ListParams, PagedResult, User, UserRole};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

/// User repository trait
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Create a new user
    async fn create(&self, user: &User) -> Result<User>;

    /// Get user by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<User>>;

    /// Get user by username
    async fn get_by_username(&self, username: &str) -> Result<Option<User>>;

    /// Get user by email
    async fn get_by_email(&self, email: &str) -> Result<Option<User>>;

    /// List users with pagination
    async fn list(&self, params: &ListParams) -> Result<PagedResult<User>>;

    /// List all users assigned to a nursery
    async fn list_by_nursery(&self, nursery_id: i64) -> Result<Vec<User>>;

    /// Update a user
    async fn update(&self, user: &User) -> Result<User>;

    /// Delete a user
    async fn delete(&self, id: i64) -> Result<()>;

    /// Count all users
    async fn count(&self) -> Result<i64>;
}

/// SQLx-based user repository implementation
pub struct SqlxUserRepository {
    pool: SqlitePool,
}

impl SqlxUserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: SqlitePool) -> Arc<dyn UserRepository> {
        Arc::new(Self::new(pool))
    }
}

const USER_COLUMNS: &str =
    "id, username, email, password_hash, role, nursery_id, is_active, created_at, updated_at";

#[async_trait]
impl UserRepository for SqlxUserRepository {
    async fn create(&self, user: &User) -> Result<User> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO users (username, email, password_hash, role, nursery_id, is_active, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.to_string())
        .bind(user.nursery_id)
        .bind(user.is_active)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .context("Failed to create user")?;

        let id = result.last_insert_rowid();

        Ok(User {
            id,
            created_at: now,
            updated_at: now,
            ..user.clone()
        })
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<User>> {
        let row = sqlx::query(&format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to get user by ID")?;

        match row {
            Some(row) => Ok(Some(row_to_user(&row)?)),
            None => Ok(None),
        }
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM users WHERE username = ?",
            USER_COLUMNS
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get user by username")?;

        match row {
            Some(row) => Ok(Some(row_to_user(&row)?)),
            None => Ok(None),
        }
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM users WHERE email = ?",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get user by email")?;

        match row {
            Some(row) => Ok(Some(row_to_user(&row)?)),
            None => Ok(None),
        }
    }

    async fn list(&self, params: &ListParams) -> Result<PagedResult<User>> {
        let total = self.count().await?;

        let rows = sqlx::query(&format!(
            "SELECT {} FROM users ORDER BY username LIMIT ? OFFSET ?",
            USER_COLUMNS
        ))
        .bind(params.limit())
        .bind(params.offset())
        .fetch_all(&self.pool)
        .await
        .context("Failed to list users")?;

        let mut users = Vec::new();
        for row in rows {
            users.push(row_to_user(&row)?);
        }

        Ok(PagedResult::new(users, total, params))
    }

    async fn list_by_nursery(&self, nursery_id: i64) -> Result<Vec<User>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM users WHERE nursery_id = ? ORDER BY username",
            USER_COLUMNS
        ))
        .bind(nursery_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list users by nursery")?;

        let mut users = Vec::new();
        for row in rows {
            users.push(row_to_user(&row)?);
        }

        Ok(users)
    }

    async fn update(&self, user: &User) -> Result<User> {
        let now = Utc::now();

        sqlx::query(
            r#"
            UPDATE users
            SET username = ?, email = ?, password_hash = ?, role = ?,
                nursery_id = ?, is_active = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.to_string())
        .bind(user.nursery_id)
        .bind(user.is_active)
        .bind(now)
        .bind(user.id)
        .execute(&self.pool)
        .await
        .context("Failed to update user")?;

        self.get_by_id(user.id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("User not found after update"))
    }

    async fn delete(&self, id: i64) -> Result<()> {
        sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete user")?;

        Ok(())
    }

    async fn count(&self) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM users")
            .fetch_one(&self.pool)
            .await
            .context("Failed to count users")?;

        Ok(row.get("count"))
    }
}

fn row_to_user(row: &sqlx::sqlite::SqliteRow) -> Result<User> {
    let role_str: String = row.get("role");
    let role: UserRole = role_str.parse().context("Invalid role in database")?;

    Ok(User {
        id: row.get("id"),
        username: row.get("username"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        role,
        nursery_id: row.get("nursery_id"),
        is_active: row.get("is_active"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations};

    async fn setup_test_repo() -> SqlxUserRepository {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        SqlxUserRepository::new(pool)
    }

    fn test_user(username: &str, role: UserRole, nursery_id: Option<i64>) -> User {
        User::new(
            username.to_string(),
            format!("{}@example.com", username),
            "hashed_password".to_string(),
            role,
            nursery_id,
        )
    }

    #[tokio::test]
    async fn test_create_user() {
        let repo = setup_test_repo().await;
        let user = test_user("alice", UserRole::SuperAdmin, None);

        let created = repo.create(&user).await.expect("Failed to create user");

        assert!(created.id > 0);
        assert_eq!(created.username, "alice");
        assert_eq!(created.role, UserRole::SuperAdmin);
        assert!(created.nursery_id.is_none());
        assert!(created.is_active);
    }

    #[tokio::test]
    async fn test_get_by_username() {
        let repo = setup_test_repo().await;
        repo.create(&test_user("bob", UserRole::SuperAdmin, None))
            .await
            .expect("Failed to create user");

        let found = repo
            .get_by_username("bob")
            .await
            .expect("Failed to get user")
            .expect("User not found");

        assert_eq!(found.username, "bob");
    }

    #[tokio::test]
    async fn test_get_by_username_not_found() {
        let repo = setup_test_repo().await;

        let found = repo
            .get_by_username("nobody")
            .await
            .expect("Failed to get user");

        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_unique_username_constraint() {
        let repo = setup_test_repo().await;
        repo.create(&test_user("carol", UserRole::SuperAdmin, None))
            .await
            .expect("Failed to create first user");

        let mut duplicate = test_user("carol", UserRole::SuperAdmin, None);
        duplicate.email = "other@example.com".to_string();
        let result = repo.create(&duplicate).await;

        assert!(result.is_err(), "Should fail due to duplicate username");
    }

    #[tokio::test]
    async fn test_role_round_trips_through_storage() {
        let repo = setup_test_repo().await;

        for role in [UserRole::SuperAdmin, UserRole::NurseryAdmin, UserRole::Staff] {
            let name = format!("user_{}", role);
            let nursery_id = None;
            let created = repo
                .create(&test_user(&name, role, nursery_id))
                .await
                .expect("Failed to create user");

            let found = repo
                .get_by_id(created.id)
                .await
                .expect("Failed to get user")
                .expect("User not found");
            assert_eq!(found.role, role);
        }
    }

    #[tokio::test]
    async fn test_update_user() {
        let repo = setup_test_repo().await;
        let mut created = repo
            .create(&test_user("dave", UserRole::SuperAdmin, None))
            .await
            .expect("Failed to create user");

        created.email = "new@example.com".to_string();
        created.is_active = false;

        let updated = repo.update(&created).await.expect("Failed to update user");

        assert_eq!(updated.email, "new@example.com");
        assert!(!updated.is_active);
    }

    #[tokio::test]
    async fn test_delete_user() {
        let repo = setup_test_repo().await;
        let created = repo
            .create(&test_user("erin", UserRole::SuperAdmin, None))
            .await
            .expect("Failed to create user");

        repo.delete(created.id).await.expect("Failed to delete user");

        let found = repo.get_by_id(created.id).await.expect("Failed to get user");
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_list_pagination() {
        let repo = setup_test_repo().await;
        for i in 0..5 {
            repo.create(&test_user(
                &format!("user{}", i),
                UserRole::SuperAdmin,
                None,
            ))
            .await
            .expect("Failed to create user");
        }

        let page = repo
            .list(&ListParams::new(1, 2))
            .await
            .expect("Failed to list users");

        assert_eq!(page.items.len(), 2);
        assert_eq!(page.total, 5);
        assert_eq!(page.total_pages(), 3);
    }
}
