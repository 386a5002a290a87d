use serde::{Deserialize, Serialize};

use crate::users::dto::{non_empty, PublicUser};

/// Request body for login.
#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

impl LoginRequest {
    pub fn credentials(&self) -> Option<(&str, &str)> {
        Some((non_empty(&self.email)?, non_empty(&self.password)?))
    }
}

/// What the client keeps after logging in. The role is left out.
#[derive(Debug, Serialize)]
pub struct LoginUser {
    pub id: i64,
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub user: LoginUser,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub success: bool,
    pub user: PublicUser,
}
