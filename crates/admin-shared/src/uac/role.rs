use std::str::FromStr;

use strum::IntoEnumIterator as _;

use crate::errors::RoleParseError;

/// The fixed permission tiers of the dashboard.
///
/// Unknown names are rejected instead of being treated as an extra role
#[derive(
    Debug,
    serde::Serialize,
    serde::Deserialize,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::AsRefStr,
    strum::Display,
    strum::EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Role {
    SuperAdmin,
    Admin,
    Manager,
    Seller,
    Support,
}

impl Role {
    /// Name suitable for showing in the user menu
    pub fn display_name(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "Super Admin",
            Role::Admin => "Admin",
            Role::Manager => "Manager",
            Role::Seller => "Seller",
            Role::Support => "Support",
        }
    }

    /// Returns `true` for the roles that manage sellers
    #[must_use]
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::SuperAdmin | Self::Admin)
    }
}

impl FromStr for Role {
    type Err = RoleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::iter()
            .find(|role| role.as_ref() == s)
            .ok_or_else(|| RoleParseError(s.to_string()))
    }
}

impl TryFrom<&str> for Role {
    type Error = RoleParseError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        value.parse()
    }
}
