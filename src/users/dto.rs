use serde::{Deserialize, Serialize};

use crate::users::repo_types::User;

// Request fields are optional so that a missing key is reported by
// validation as a field error instead of failing deserialization.

/// Request body for registration.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Request body for login.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Request body for a partial profile update.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateRequest {
    pub name: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Success envelope: every 200 response is `{"data": ...}`.
#[derive(Debug, Serialize)]
pub struct Data<T> {
    pub data: T,
}

impl<T> Data<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// Returned after registration.
#[derive(Debug, Serialize)]
pub struct RegisteredUser {
    pub name: String,
    pub username: String,
    pub email: String,
}

impl From<User> for RegisteredUser {
    fn from(u: User) -> Self {
        Self {
            name: u.name,
            username: u.username,
            email: u.email,
        }
    }
}

/// Public profile returned by get-current and update.
#[derive(Debug, Serialize)]
pub struct UserProfile {
    pub name: String,
    pub username: String,
}

impl From<User> for UserProfile {
    fn from(u: User) -> Self {
        Self {
            name: u.name,
            username: u.username,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}
