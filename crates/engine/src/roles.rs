use serde::{Deserialize, Serialize};

use crate::EngineError;

/// Role of a farm user, already resolved and trusted by the caller.
///
/// The engine treats roles as:
/// - `owner`: sees everything, including feed costs.
/// - `supervisor`: sees everything, including feed costs.
/// - `staff`: sees production quantities but not costs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Owner,
    Supervisor,
    Staff,
}

impl Role {
    /// Returns the canonical role string used by the database.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::Supervisor => "supervisor",
            Self::Staff => "staff",
        }
    }

    pub fn can_view_costs(self) -> bool {
        matches!(self, Self::Owner | Self::Supervisor)
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Role {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "owner" => Ok(Self::Owner),
            "supervisor" => Ok(Self::Supervisor),
            "staff" => Ok(Self::Staff),
            other => Err(EngineError::InvalidRole(format!("unknown role: {other}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_canonical_strings() {
        for role in [Role::Owner, Role::Supervisor, Role::Staff] {
            assert_eq!(Role::try_from(role.as_str()), Ok(role));
        }
        assert_eq!(Role::try_from(" Supervisor "), Ok(Role::Supervisor));
    }

    #[test]
    fn rejects_unknown_roles() {
        assert_eq!(
            Role::try_from("manager"),
            Err(EngineError::InvalidRole("unknown role: manager".to_string()))
        );
    }

    #[test]
    fn only_staff_is_denied_costs() {
        assert!(Role::Owner.can_view_costs());
        assert!(Role::Supervisor.can_view_costs());
        assert!(!Role::Staff.can_view_costs());
    }
}
