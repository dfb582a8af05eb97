use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Role, User};

// -- JWT Claims --

/// Payload of the short-lived access token carried in the `accessToken` cookie.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    pub sub: Uuid,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

/// Payload of the refresh token. `jti` keeps two tokens minted for the same
/// user in the same second distinct.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshClaims {
    pub sub: Uuid,
    pub jti: Uuid,
    pub iat: i64,
    pub exp: i64,
}

// -- Auth --

/// Fields are optional so validation can report every missing one at once.
#[derive(Debug, Default, Deserialize)]
pub struct SignupRequest {
    pub user_name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub year_graduated: Option<i32>,
    pub major: Option<String>,
    pub company: Option<String>,
    pub title: Option<String>,
    pub linkedin_link: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: &'static str,
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct MessageBody {
    pub message: &'static str,
}

// -- Users --

#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub user_name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub year_graduated: Option<i32>,
    pub major: Option<String>,
    pub company: Option<String>,
    pub title: Option<String>,
    pub linkedin_link: Option<String>,
}

// -- Opportunities --

/// Approval fields are deliberately absent: only the approve action sets them.
#[derive(Debug, Default, Deserialize)]
pub struct OpportunityRequest {
    pub title: Option<String>,
    pub posted_by: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub description: Option<String>,
    pub needs_approval: Option<bool>,
    pub is_paid: Option<bool>,
    pub amount: Option<String>,
}

// -- Majors --

#[derive(Debug, Default, Deserialize)]
pub struct MajorRequest {
    pub name: Option<String>,
    pub department: Option<String>,
}

// -- Messages --

#[derive(Debug, Default, Deserialize)]
pub struct SendMessageRequest {
    pub recipient: Option<String>,
    pub content: Option<String>,
}
