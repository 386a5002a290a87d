use serde::{Deserialize, Deserializer, Serialize};

use crate::users::repo_types::{InvalidRole, Role, User};

/// Body of register, admin create and admin update.
#[derive(Debug, Default, Deserialize)]
pub struct UserPayload {
    pub email: Option<String>,
    pub password: Option<String>,
    /// `None` when the key is absent, `Some(None)` for an explicit `null`.
    #[serde(default, deserialize_with = "present")]
    pub role: Option<Option<i64>>,
}

fn present<'de, D>(deserializer: D) -> Result<Option<Option<i64>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<i64>::deserialize(deserializer).map(Some)
}

impl UserPayload {
    /// Email, treating an empty string as absent.
    pub fn email(&self) -> Option<&str> {
        non_empty(&self.email)
    }

    /// Password, treating an empty string as absent.
    pub fn password(&self) -> Option<&str> {
        non_empty(&self.password)
    }

    /// The requested role, or `Role::Standard` when it is absent or `null`.
    pub fn role_or_default(&self) -> Result<Role, InvalidRole> {
        match self.role.flatten() {
            Some(value) => Role::try_from(value),
            None => Ok(Role::default()),
        }
    }

    /// Registration only defaults a missing role; an explicit `null` is
    /// rejected like any other value outside 1 and 2.
    pub fn registration_role(&self) -> Result<Role, InvalidRole> {
        match self.role {
            Some(None) => Err(InvalidRole("null".into())),
            _ => self.role_or_default(),
        }
    }
}

pub(crate) fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// Public part of the user returned to the client.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: i64,
    pub email: String,
    pub role: Role,
}

impl From<User> for PublicUser {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            role: u.role,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UserListResponse {
    pub success: bool,
    pub users: Vec<PublicUser>,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub success: bool,
    pub user: PublicUser,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedUserResponse {
    pub success: bool,
    pub user_id: i64,
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: &'static str,
}
