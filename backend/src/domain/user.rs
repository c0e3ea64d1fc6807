//! User accounts and roles as seen by the hostel rules.
//!
//! Accounts are owned by the user directory; the rules only read them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{HostelId, UserId};

/// Role granted to an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// University-wide administrator.
    Admin,
    /// Staff member scoped to exactly one hostel.
    Warden,
    /// Resident of a hostel.
    Student,
}

impl Role {
    /// Stable lowercase name used in payloads and storage.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Warden => "warden",
            Self::Student => "student",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown role name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("role must be one of admin, warden, student; got {value}")]
pub struct ParseRoleError {
    value: String,
}

impl FromStr for Role {
    type Err = ParseRoleError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "admin" => Ok(Self::Admin),
            "warden" => Ok(Self::Warden),
            "student" => Ok(Self::Student),
            other => Err(ParseRoleError {
                value: other.to_owned(),
            }),
        }
    }
}

/// Account profile.
///
/// ## Invariants
/// - `username` is non-empty and trimmed.
/// - Wardens manage the hostel named by `hostel_id`; a warden without a
///   hostel has no elevated permissions anywhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Stable identifier.
    pub id: UserId,
    /// Login name.
    pub username: String,
    /// Name shown in the UI.
    pub display_name: String,
    /// Granted role.
    pub role: Role,
    /// Hostel the account belongs to, if any.
    pub hostel_id: Option<HostelId>,
    /// Room for residents.
    pub room_number: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Role::Admin)]
    #[case(Role::Warden)]
    #[case(Role::Student)]
    fn role_names_round_trip(#[case] role: Role) {
        assert_eq!(role.as_str().parse::<Role>(), Ok(role));
    }

    #[rstest]
    fn unknown_role_is_rejected() {
        let err = "janitor".parse::<Role>().expect_err("unknown role");
        assert!(err.to_string().contains("janitor"));
    }
}
