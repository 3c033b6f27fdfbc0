//! Request and response bodies
//!
//! Request types reject unknown fields. Types carrying a password do not
//! derive `Debug` so they cannot end up in a log line.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use ag_core::domain::entities::user::{NewUser, User};

#[derive(Clone, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    #[validate(length(min = 1))]
    pub username: String,

    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Clone, Deserialize, Validate)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1))]
    pub current_password: String,

    #[validate(length(min = 1, max = 50))]
    pub new_password: String,
}

#[derive(Clone, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct CreateUserRequest {
    #[validate(length(min = 1, max = 15))]
    pub username: String,

    #[validate(length(min = 1, max = 50))]
    pub password: String,

    /// Defaults to the time of creation
    #[serde(default)]
    pub membersince: Option<DateTime<Utc>>,

    #[serde(default)]
    pub admin: bool,
}

impl From<CreateUserRequest> for NewUser {
    fn from(request: CreateUserRequest) -> Self {
        NewUser {
            username: request.username,
            password: request.password,
            member_since: request.membersince,
            is_admin: request.admin,
        }
    }
}

#[derive(Clone, Deserialize, Validate)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    #[validate(length(min = 1, max = 50))]
    pub new_password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Token lifetimes reported next to the cookies; the tokens themselves only
/// travel in cookies
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub message: String,
    pub access_expires_in: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_expires_in: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub username: String,
    pub membersince: DateTime<Utc>,
    pub admin: bool,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            username: user.username,
            membersince: user.member_since,
            admin: user.is_admin,
        }
    }
}
