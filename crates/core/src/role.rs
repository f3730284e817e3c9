//! Actor roles.

use serde::{Deserialize, Serialize};

/// The role of the user driving the board.
///
/// Roles split into two tiers: `Employee` and `Hod` are restricted, every
/// other role is elevated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Regular staff member
    Employee,
    /// Head of department
    Hod,
    /// Project manager
    Pm,
    /// Manager
    Manager,
    /// Administrator
    Admin,
}

impl Role {
    /// Restricted roles cannot drive tasks into terminal states and are
    /// frozen out of sequence-locked phases.
    pub fn is_restricted(self) -> bool {
        matches!(self, Role::Employee | Role::Hod)
    }

    /// Inverse of [`Role::is_restricted`].
    pub fn is_elevated(self) -> bool {
        !self.is_restricted()
    }

    /// Wire name of the role.
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Employee => "EMPLOYEE",
            Role::Hod => "HOD",
            Role::Pm => "PM",
            Role::Manager => "MANAGER",
            Role::Admin => "ADMIN",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a role name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct ParseRoleError(pub String);

impl std::str::FromStr for Role {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "EMPLOYEE" => Ok(Role::Employee),
            "HOD" => Ok(Role::Hod),
            "PM" => Ok(Role::Pm),
            "MANAGER" => Ok(Role::Manager),
            "ADMIN" => Ok(Role::Admin),
            _ => Err(ParseRoleError(s.to_string())),
        }
    }
}
