//! The user/admin role hierarchy.

use serde::{Deserialize, Serialize};

/// Roles in ascending order of privilege.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    /// Every role, lowest privilege first.
    pub const HIERARCHY: [Role; 2] = [Role::User, Role::Admin];

    /// Parses a stored role name. Unknown names are `None`.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim() {
            "user" => Some(Self::User),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }

    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::User => "User",
            Self::Admin => "Administrator",
        }
    }

    /// `true` when `self` is at or above `required` in the hierarchy.
    #[must_use]
    pub fn check_permission(self, required: Role) -> bool {
        self >= required
    }

    #[must_use]
    pub fn is_admin(self) -> bool {
        self == Self::Admin
    }

    /// Any known role has basic user access.
    #[must_use]
    pub fn is_user(self) -> bool {
        matches!(self, Self::User | Self::Admin)
    }

    /// All roles up to and including `self`.
    #[must_use]
    pub fn accessible_roles(self) -> Vec<Role> {
        Self::HIERARCHY
            .iter()
            .copied()
            .filter(|r| *r <= self)
            .collect()
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
