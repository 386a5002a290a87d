use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Account role, stored as a SMALLINT and sent over the wire as a plain number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[serde(into = "i64", try_from = "i64")]
#[repr(i16)]
pub enum Role {
    #[default]
    Standard = 1,
    Admin = 2,
}

#[derive(Debug, thiserror::Error)]
#[error("role must be 1 or 2, got {0}")]
pub struct InvalidRole(pub String);

impl TryFrom<i64> for Role {
    type Error = InvalidRole;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Role::Standard),
            2 => Ok(Role::Admin),
            other => Err(InvalidRole(other.to_string())),
        }
    }
}

impl From<Role> for i64 {
    fn from(role: Role) -> Self {
        role as i16 as i64
    }
}

/// User record in the database.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub password_hash: String, // Argon2 PHC string, never serialized
    pub role: Role,
}

/// Column values written by an admin edit.
#[derive(Debug, Clone)]
pub struct UserChanges {
    pub email: String,
    /// `None` keeps the stored hash.
    pub password_hash: Option<String>,
    pub role: Role,
}
