use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Position of an officer in the postal hierarchy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Divisional,
    SubDivisional,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Divisional => "divisional",
            Role::SubDivisional => "sub_divisional",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "divisional" => Ok(Role::Divisional),
            "sub_divisional" => Ok(Role::SubDivisional),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Option<Role>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn is_divisional(&self) -> bool {
        self.role == Some(Role::Divisional)
    }

    pub fn is_sub_divisional(&self) -> bool {
        self.role == Some(Role::SubDivisional)
    }
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

/// Hierarchy record created together with an officer account
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OfficeAssignment {
    Divisional { pincode: String },
    SubDivisional { pincode: String, division_pincode: String },
}

impl OfficeAssignment {
    pub fn role(&self) -> Role {
        match self {
            OfficeAssignment::Divisional { .. } => Role::Divisional,
            OfficeAssignment::SubDivisional { .. } => Role::SubDivisional,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct DivisionalOffice {
    pub user_id: Uuid,
    pub pincode: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct SubDivisionalOffice {
    pub user_id: Uuid,
    pub pincode: String,
    pub division_pincode: String,
}

/// Server-side record of an issued token; removing it revokes the token
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Session {
    pub id: Uuid,
    pub user_id: Uuid,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_its_column_value() {
        for role in [Role::Divisional, Role::SubDivisional] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        assert!("admin".parse::<Role>().is_err());
    }

    #[test]
    fn assignment_reports_matching_role() {
        let a = OfficeAssignment::SubDivisional {
            pincode: "110001".into(),
            division_pincode: "110000".into(),
        };
        assert_eq!(a.role(), Role::SubDivisional);
    }
}
