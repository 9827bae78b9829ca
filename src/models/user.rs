//! User model
//!
//! Defines the User entity and the role enum that drives authorization.
//! Every user except a super admin is assigned to exactly one nursery;
//! `nursery_id` is the tenant-partitioning key for all scoped operations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// User entity representing a staff account in the system.
///
/// Users carry a role (SuperAdmin, NurseryAdmin, Staff) and, for any role
/// other than SuperAdmin, an assigned nursery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier
    pub id: i64,
    /// Username (unique)
    pub username: String,
    /// Email address (unique)
    pub email: String,
    /// Password hash (argon2)
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// User role
    pub role: UserRole,
    /// Assigned nursery; `None` only for super admins
    pub nursery_id: Option<i64>,
    /// Whether the account may log in
    pub is_active: bool,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new User with the given parameters.
    ///
    /// The password must already be hashed; use
    /// `services::password::hash_password()`.
    pub fn new(
        username: String,
        email: String,
        password_hash: String,
        role: UserRole,
        nursery_id: Option<i64>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: 0, // assigned by the database
            username,
            email,
            password_hash,
            role,
            nursery_id,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check if the user is a super admin
    pub fn is_super_admin(&self) -> bool {
        self.role == UserRole::SuperAdmin
    }

    /// Check if the user holds an admin role (super admin or nursery admin)
    pub fn is_admin(&self) -> bool {
        matches!(self.role, UserRole::SuperAdmin | UserRole::NurseryAdmin)
    }

    /// Check if the user may operate on resources of the given nursery.
    ///
    /// Super admins may operate on any nursery. Everyone else is limited
    /// to their assigned nursery.
    pub fn can_access_nursery(&self, nursery_id: i64) -> bool {
        self.is_super_admin() || self.nursery_id == Some(nursery_id)
    }
}

/// User role for authorization.
///
/// - SuperAdmin: unrestricted access across all nurseries
/// - NurseryAdmin: full management of a single assigned nursery
/// - Staff: content editing within the assigned nursery
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Unrestricted access across all nurseries
    SuperAdmin,
    /// Scoped to a single assigned nursery
    NurseryAdmin,
    /// Content editor within the assigned nursery
    Staff,
}

impl Default for UserRole {
    fn default() -> Self {
        Self::Staff
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserRole::SuperAdmin => write!(f, "super_admin"),
            UserRole::NurseryAdmin => write!(f, "nursery_admin"),
            UserRole::Staff => write!(f, "staff"),
        }
    }
}

impl FromStr for UserRole {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // "admin" and "editor" are legacy literals from earlier data; they
        // map onto the consolidated roles but are never written back.
        match s.to_lowercase().as_str() {
            "super_admin" => Ok(UserRole::SuperAdmin),
            "nursery_admin" | "admin" => Ok(UserRole::NurseryAdmin),
            "staff" | "editor" => Ok(UserRole::Staff),
            _ => Err(anyhow::anyhow!("Invalid user role: {}", s)),
        }
    }
}

/// Input for creating a new user (before password hashing)
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUserInput {
    pub username: String,
    pub email: String,
    /// Plaintext password (will be hashed)
    pub password: String,
    #[serde(default)]
    pub role: UserRole,
    /// Required unless role is super_admin
    pub nursery_id: Option<i64>,
}

/// Input for updating a user
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateUserInput {
    pub username: Option<String>,
    pub email: Option<String>,
    /// New password (optional, will be hashed)
    pub password: Option<String>,
    pub role: Option<UserRole>,
    pub nursery_id: Option<Option<i64>>,
    pub is_active: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_with_role(role: UserRole, nursery_id: Option<i64>) -> User {
        User::new(
            "testuser".to_string(),
            "test@example.com".to_string(),
            "hash".to_string(),
            role,
            nursery_id,
        )
    }

    #[test]
    fn test_user_new() {
        let user = user_with_role(UserRole::Staff, Some(3));

        assert_eq!(user.id, 0);
        assert_eq!(user.username, "testuser");
        assert_eq!(user.nursery_id, Some(3));
        assert!(user.is_active);
    }

    #[test]
    fn test_user_is_super_admin() {
        assert!(user_with_role(UserRole::SuperAdmin, None).is_super_admin());
        assert!(!user_with_role(UserRole::NurseryAdmin, Some(1)).is_super_admin());
        assert!(!user_with_role(UserRole::Staff, Some(1)).is_super_admin());
    }

    #[test]
    fn test_user_is_admin() {
        assert!(user_with_role(UserRole::SuperAdmin, None).is_admin());
        assert!(user_with_role(UserRole::NurseryAdmin, Some(1)).is_admin());
        assert!(!user_with_role(UserRole::Staff, Some(1)).is_admin());
    }

    #[test]
    fn test_can_access_nursery() {
        let super_admin = user_with_role(UserRole::SuperAdmin, None);
        let admin = user_with_role(UserRole::NurseryAdmin, Some(2));
        let staff = user_with_role(UserRole::Staff, Some(2));

        // Super admin can access any nursery
        assert!(super_admin.can_access_nursery(1));
        assert!(super_admin.can_access_nursery(999));

        // Scoped users only their own
        assert!(admin.can_access_nursery(2));
        assert!(!admin.can_access_nursery(3));
        assert!(staff.can_access_nursery(2));
        assert!(!staff.can_access_nursery(3));
    }

    #[test]
    fn test_user_role_display() {
        assert_eq!(UserRole::SuperAdmin.to_string(), "super_admin");
        assert_eq!(UserRole::NurseryAdmin.to_string(), "nursery_admin");
        assert_eq!(UserRole::Staff.to_string(), "staff");
    }

    #[test]
    fn test_user_role_from_str() {
        assert_eq!(UserRole::from_str("super_admin").unwrap(), UserRole::SuperAdmin);
        assert_eq!(UserRole::from_str("NURSERY_ADMIN").unwrap(), UserRole::NurseryAdmin);
        assert_eq!(UserRole::from_str("staff").unwrap(), UserRole::Staff);
        assert!(UserRole::from_str("invalid").is_err());
    }

    #[test]
    fn test_user_role_legacy_aliases() {
        // Literals from the pre-consolidation data model
        assert_eq!(UserRole::from_str("admin").unwrap(), UserRole::NurseryAdmin);
        assert_eq!(UserRole::from_str("editor").unwrap(), UserRole::Staff);
    }

    #[test]
    fn test_user_role_default() {
        assert_eq!(UserRole::default(), UserRole::Staff);
    }
}
