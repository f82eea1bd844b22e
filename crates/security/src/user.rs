//! Current-user record and role helpers

use scholar_core::EntityId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Role levels as the backend encodes them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserRole {
    /// 0
    Regular,
    /// 1
    Admin,
    /// 2
    SuperAdmin,
    /// Anything else, or no role at all
    Unknown,
}

impl UserRole {
    /// Role for a raw backend value
    pub fn from_code(code: Option<i64>) -> Self {
        match code {
            Some(0) => UserRole::Regular,
            Some(1) => UserRole::Admin,
            Some(2) => UserRole::SuperAdmin,
            _ => UserRole::Unknown,
        }
    }

    /// Display label
    pub fn label(&self) -> &'static str {
        match self {
            UserRole::Regular => "regular user",
            UserRole::Admin => "admin",
            UserRole::SuperAdmin => "super admin",
            UserRole::Unknown => "unknown",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Account status as the backend encodes it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserStatus {
    /// 0
    Disabled,
    /// 1
    Active,
    /// Anything else
    Unknown,
}

impl UserStatus {
    /// Status for a raw backend value
    pub fn from_code(code: Option<i64>) -> Self {
        match code {
            Some(0) => UserStatus::Disabled,
            Some(1) => UserStatus::Active,
            _ => UserStatus::Unknown,
        }
    }

    /// Display label
    pub fn label(&self) -> &'static str {
        match self {
            UserStatus::Disabled => "disabled",
            UserStatus::Active => "active",
            UserStatus::Unknown => "unknown",
        }
    }
}

impl fmt::Display for UserStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The logged-in user, as stored under `userInfo`
///
/// Fields the client does not interpret are kept in `extra` so the record
/// round-trips through storage unchanged.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UserInfo {
    /// User id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    /// Login name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Raw role level
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<i64>,
    /// Raw account status
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<i64>,
    /// Email address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Avatar URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    /// Everything else the backend sent
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl UserInfo {
    /// Decoded role
    pub fn role(&self) -> UserRole {
        UserRole::from_code(self.role)
    }

    /// Decoded status
    pub fn status(&self) -> UserStatus {
        UserStatus::from_code(self.status)
    }

    /// Role 1 or 2
    pub fn is_admin(&self) -> bool {
        matches!(self.role(), UserRole::Admin | UserRole::SuperAdmin)
    }

    /// Status 1
    pub fn is_active(&self) -> bool {
        self.status() == UserStatus::Active
    }

    /// Whether the user's role level is at least `required_role`
    ///
    /// A user without a role has no permissions at all.
    pub fn has_permission(&self, required_role: i64) -> bool {
        self.role.map_or(false, |role| role >= required_role)
    }

    /// Admin role on an active account
    pub fn can_perform_admin_action(&self) -> bool {
        self.is_admin() && self.is_active()
    }
}
