//! User service
//!
//! Authentication and staff account management:
//! - Login verifies credentials against the stored Argon2 hash only and
//!   returns one uniform error for unknown users, wrong passwords and
//!   deactivated accounts, so responses don't leak which part failed.
//! - Sessions are random tokens with a configurable expiry.
//! - Non-super-admin accounts must be assigned to a nursery.

use crate::db::repositories::{SessionRepository, UserRepository};
use crate::models::{CreateUserInput, ListParams, PagedResult, Session, UpdateUserInput, User, UserRole};
use crate::services::password::{hash_password, verify_password};
use crate::services::ServiceError;
use anyhow::Context;
use chrono::{Duration, Utc};
use std::sync::Arc;
use uuid::Uuid;

/// Default session expiration time in days
const DEFAULT_SESSION_EXPIRATION_DAYS: i64 = 7;

/// Uniform message for every login failure
const LOGIN_FAILED: &str = "Invalid username or password";

/// Result of a successful login
#[derive(Debug, Clone)]
pub struct LoginResult {
    pub user: User,
    pub session: Session,
}

/// User service for account management and authentication
pub struct UserService {
    user_repo: Arc<dyn UserRepository>,
    session_repo: Arc<dyn SessionRepository>,
    session_expiration_days: i64,
}

impl UserService {
    /// Create a new user service with the given repositories
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        session_repo: Arc<dyn SessionRepository>,
    ) -> Self {
        Self {
            user_repo,
            session_repo,
            session_expiration_days: DEFAULT_SESSION_EXPIRATION_DAYS,
        }
    }

    /// Create a new user service with custom session expiration
    pub fn with_session_expiration(
        user_repo: Arc<dyn UserRepository>,
        session_repo: Arc<dyn SessionRepository>,
        session_expiration_days: i64,
    ) -> Self {
        Self {
            user_repo,
            session_repo,
            session_expiration_days,
        }
    }

    /// Log a user in, returning the user and a fresh session.
    ///
    /// Every failure path returns the same `Authentication` error.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResult, ServiceError> {
        let looked_up = match self
            .user_repo
            .get_by_username(username)
            .await
            .context("Failed to look up user")?
        {
            Some(user) => Some(user),
            // The login form accepts an email address in the same field
            None if username.contains('@') => self
                .user_repo
                .get_by_email(username)
                .await
                .context("Failed to look up user by email")?,
            None => None,
        };
        let user = match looked_up {
            Some(user) => user,
            None => return Err(ServiceError::Authentication(LOGIN_FAILED.to_string())),
        };

        if !user.is_active {
            return Err(ServiceError::Authentication(LOGIN_FAILED.to_string()));
        }

        let matches =
            verify_password(password, &user.password_hash).context("Failed to verify password")?;
        if !matches {
            return Err(ServiceError::Authentication(LOGIN_FAILED.to_string()));
        }

        let session = self.create_session(user.id).await?;

        Ok(LoginResult { user, session })
    }

    /// Log out by destroying the session
    pub async fn logout(&self, session_id: &str) -> Result<(), ServiceError> {
        self.session_repo
            .delete(session_id)
            .await
            .context("Failed to delete session")?;
        Ok(())
    }

    /// Resolve a session token to its user.
    ///
    /// Expired sessions are removed on sight. Deactivated accounts fail
    /// even with a live session.
    pub async fn validate_session(&self, session_id: &str) -> Result<User, ServiceError> {
        let session = match self
            .session_repo
            .get_by_id(session_id)
            .await
            .context("Failed to look up session")?
        {
            Some(session) => session,
            None => return Err(ServiceError::Authentication("Invalid session".to_string())),
        };

        if session.is_expired() {
            self.session_repo
                .delete(session_id)
                .await
                .context("Failed to delete expired session")?;
            return Err(ServiceError::Authentication("Session expired".to_string()));
        }

        let user = self
            .user_repo
            .get_by_id(session.user_id)
            .await
            .context("Failed to look up session user")?
            .ok_or_else(|| ServiceError::Authentication("Invalid session".to_string()))?;

        if !user.is_active {
            return Err(ServiceError::Authentication("Account disabled".to_string()));
        }

        Ok(user)
    }

    /// Create a new staff account
    pub async fn create_user(&self, input: CreateUserInput) -> Result<User, ServiceError> {
        if input.username.trim().is_empty() {
            return Err(ServiceError::validation("Username is required"));
        }
        if input.email.trim().is_empty() || !input.email.contains('@') {
            return Err(ServiceError::validation("A valid email is required"));
        }
        if input.password.len() < 8 {
            return Err(ServiceError::validation(
                "Password must be at least 8 characters",
            ));
        }
        if input.role != UserRole::SuperAdmin && input.nursery_id.is_none() {
            return Err(ServiceError::validation(
                "Non-super-admin accounts must be assigned to a nursery",
            ));
        }

        if self
            .user_repo
            .get_by_username(&input.username)
            .await
            .context("Failed to check username")?
            .is_some()
        {
            return Err(ServiceError::conflict(format!(
                "Username '{}' is already taken",
                input.username
            )));
        }
        if self
            .user_repo
            .get_by_email(&input.email)
            .await
            .context("Failed to check email")?
            .is_some()
        {
            return Err(ServiceError::conflict(format!(
                "Email '{}' is already registered",
                input.email
            )));
        }

        let password_hash = hash_password(&input.password).context("Failed to hash password")?;
        let user = User::new(
            input.username,
            input.email,
            password_hash,
            input.role,
            input.nursery_id,
        );

        let created = self
            .user_repo
            .create(&user)
            .await
            .context("Failed to create user")?;

        Ok(created)
    }

    /// Get a user by ID
    pub async fn get_user(&self, id: i64) -> Result<User, ServiceError> {
        self.user_repo
            .get_by_id(id)
            .await
            .context("Failed to get user")?
            .ok_or(ServiceError::NotFound("User"))
    }

    /// List users with pagination
    pub async fn list_users(&self, params: &ListParams) -> Result<PagedResult<User>, ServiceError> {
        Ok(self
            .user_repo
            .list(params)
            .await
            .context("Failed to list users")?)
    }

    /// Update an existing user
    pub async fn update_user(
        &self,
        id: i64,
        input: UpdateUserInput,
    ) -> Result<User, ServiceError> {
        let mut user = self.get_user(id).await?;

        if let Some(username) = input.username {
            if username.trim().is_empty() {
                return Err(ServiceError::validation("Username is required"));
            }
            if username != user.username {
                if self
                    .user_repo
                    .get_by_username(&username)
                    .await
                    .context("Failed to check username")?
                    .is_some()
                {
                    return Err(ServiceError::conflict(format!(
                        "Username '{}' is already taken",
                        username
                    )));
                }
                user.username = username;
            }
        }
        if let Some(email) = input.email {
            if email.trim().is_empty() || !email.contains('@') {
                return Err(ServiceError::validation("A valid email is required"));
            }
            if email != user.email {
                if self
                    .user_repo
                    .get_by_email(&email)
                    .await
                    .context("Failed to check email")?
                    .is_some()
                {
                    return Err(ServiceError::conflict(format!(
                        "Email '{}' is already registered",
                        email
                    )));
                }
                user.email = email;
            }
        }
        if let Some(password) = input.password {
            if password.len() < 8 {
                return Err(ServiceError::validation(
                    "Password must be at least 8 characters",
                ));
            }
            user.password_hash = hash_password(&password).context("Failed to hash password")?;
            // Changing the password invalidates other sessions
            self.session_repo
                .delete_by_user(user.id)
                .await
                .context("Failed to clear sessions")?;
        }
        if let Some(role) = input.role {
            user.role = role;
        }
        if let Some(nursery_id) = input.nursery_id {
            user.nursery_id = nursery_id;
        }
        if let Some(is_active) = input.is_active {
            user.is_active = is_active;
            if !is_active {
                self.session_repo
                    .delete_by_user(user.id)
                    .await
                    .context("Failed to clear sessions")?;
            }
        }

        if user.role != UserRole::SuperAdmin && user.nursery_id.is_none() {
            return Err(ServiceError::validation(
                "Non-super-admin accounts must be assigned to a nursery",
            ));
        }

        let updated = self
            .user_repo
            .update(&user)
            .await
            .context("Failed to update user")?;

        Ok(updated)
    }

    /// Change a user's own password, checking the current one first
    pub async fn change_password(
        &self,
        user_id: i64,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), ServiceError> {
        let user = self.get_user(user_id).await?;

        let matches = verify_password(current_password, &user.password_hash)
            .context("Failed to verify password")?;
        if !matches {
            return Err(ServiceError::Authentication(
                "Current password is incorrect".to_string(),
            ));
        }

        self.update_user(
            user_id,
            UpdateUserInput {
                password: Some(new_password.to_string()),
                ..Default::default()
            },
        )
        .await?;

        Ok(())
    }

    /// Delete a user and their sessions
    pub async fn delete_user(&self, id: i64) -> Result<(), ServiceError> {
        // 404 for unknown ids rather than a silent no-op
        self.get_user(id).await?;

        self.session_repo
            .delete_by_user(id)
            .await
            .context("Failed to delete user sessions")?;
        self.user_repo
            .delete(id)
            .await
            .context("Failed to delete user")?;

        Ok(())
    }

    /// Remove expired sessions; returns how many were deleted
    pub async fn cleanup_expired_sessions(&self) -> Result<u64, ServiceError> {
        Ok(self
            .session_repo
            .delete_expired()
            .await
            .context("Failed to clean up sessions")?)
    }

    async fn create_session(&self, user_id: i64) -> Result<Session, ServiceError> {
        let session = Session {
            id: Uuid::new_v4().to_string(),
            user_id,
            expires_at: Utc::now() + Duration::days(self.session_expiration_days),
            created_at: Utc::now(),
        };

        self.session_repo
            .create(&session)
            .await
            .context("Failed to create session")?;

        Ok(session)
    }
}
