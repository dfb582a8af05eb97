use axum::{
    Extension, Json,
    extract::{Path, State, rejection::JsonRejection},
    response::IntoResponse,
};
use tracing::info;

use alumni_types::api::{MessageBody, UpdateUserRequest};

use crate::error::ApiError;
use crate::middleware::Identity;
use crate::services::UserError;
use crate::state::AppState;
use crate::validate::{self, parse_id};

/// GET /api/users: approved accounts only.
pub async fn list_users(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let users = state
        .users
        .approvals()
        .list_approved()
        .map_err(|e| ApiError::from_approval(e, "User not found", "Error fetching users"))?;
    Ok(Json(users))
}

/// GET /api/users/unapproved, admin only.
pub async fn list_unapproved(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let users = state
        .users
        .approvals()
        .list_pending()
        .map_err(|e| {
            ApiError::from_approval(e, "User not found", "Error fetching unapproved users")
        })?;
    Ok(Json(users))
}

/// PUT /api/users/{id}/approve, admin only.
pub async fn approve_user(
    State(state): State<AppState>,
    Extension(admin): Extension<Identity>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(&id)?;
    let user = state
        .users
        .approvals()
        .approve(id, admin.id)
        .map_err(|e| ApiError::from_approval(e, "User not found", "Error approving user"))?;

    info!("Account {} approved by {}", user.id, admin.id);
    Ok(Json(user))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(&id)?;
    let user = state
        .users
        .approvals()
        .get_visible(id)
        .map_err(|e| ApiError::from_approval(e, "User not found", "Error fetching user"))?;
    Ok(Json(user))
}

pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(&id)?;
    let profile = validate::profile(validate::json_body(payload)?)?;

    let user = state
        .users
        .update_profile(id, &profile)
        .map_err(|e| match e {
            UserError::EmailTaken => ApiError::Conflict("Email already registered"),
            UserError::Store(cause) => ApiError::Internal {
                message: "Error updating user",
                cause,
            },
        })?
        .ok_or(ApiError::NotFound("User not found"))?;
    Ok(Json(user))
}

pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(&id)?;
    let deleted = state
        .users
        .delete(id)
        .map_err(ApiError::internal("Error deleting user"))?;
    if !deleted {
        return Err(ApiError::NotFound("User not found"));
    }

    info!("Account {} deleted", id);
    Ok(Json(MessageBody {
        message: "User deleted successfully",
    }))
}
