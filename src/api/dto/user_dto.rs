//! User directory DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{User, Withdrawal};

/// Request body for `POST /users`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterUserRequest {
    /// Unique login name.
    pub username: String,
    /// Contact e-mail address.
    #[serde(default)]
    pub email: Option<String>,
    /// Contact phone number.
    #[serde(default)]
    pub phone: Option<String>,
}

impl From<RegisterUserRequest> for User {
    fn from(req: RegisterUserRequest) -> Self {
        Self {
            username: req.username,
            email: req.email,
            phone: req.phone,
        }
    }
}

/// A registered user.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserDto {
    /// Unique login name.
    pub username: String,
    /// Contact e-mail address.
    pub email: Option<String>,
    /// Contact phone number.
    pub phone: Option<String>,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            username: user.username,
            email: user.email,
            phone: user.phone,
        }
    }
}

/// Response body for `GET /users`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserListResponse {
    /// All registered users, ordered by username.
    pub data: Vec<UserDto>,
    /// Number of users.
    pub total: usize,
}

/// Response body for `DELETE /users/:username`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserRemovedResponse {
    /// Removed username.
    pub username: String,
    /// Meetings the user hosted, now canceled.
    pub canceled: Vec<String>,
    /// Meetings the user left.
    pub left: Vec<String>,
    /// Meetings removed because the user was their last participant.
    pub pruned: Vec<String>,
}

impl UserRemovedResponse {
    /// Builds the response from the registry's withdrawal summary.
    #[must_use]
    pub fn new(username: String, withdrawal: Withdrawal) -> Self {
        Self {
            username,
            canceled: withdrawal.canceled,
            left: withdrawal.left,
            pruned: withdrawal.pruned,
        }
    }
}

/// Response body for `DELETE /users/:username/hosted-meetings`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HostedCanceledResponse {
    /// Host username.
    pub username: String,
    /// Titles of the canceled meetings.
    pub canceled: Vec<String>,
}
