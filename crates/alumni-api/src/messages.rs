use axum::{
    Extension, Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::debug;

use alumni_types::api::SendMessageRequest;
use alumni_types::models::Message;

use crate::error::ApiError;
use crate::middleware::Identity;
use crate::state::AppState;
use crate::validate::{self, parse_id};

/// Runs a message-store query off the async runtime.
async fn blocking<T, F>(message: &'static str, f: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce() -> anyhow::Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::Internal {
            message,
            cause: anyhow::Error::new(e).context("spawn_blocking join error"),
        })?
        .map_err(|cause| ApiError::Internal { message, cause })
}

pub async fn send_message(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    payload: Result<Json<SendMessageRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let outgoing = validate::message(validate::json_body(payload)?)?;

    let db = state.clone();
    let message = blocking("Error sending message", move || {
        db.messages.send(identity.id, outgoing.recipient, &outgoing.content)
    })
    .await?;

    debug!("Message {} from {} to {}", message.id, message.sender.id, message.recipient.id);
    Ok((StatusCode::CREATED, Json(message)))
}

pub async fn inbox(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<Vec<Message>>, ApiError> {
    let messages =
        blocking("Error fetching inbox", move || state.messages.inbox(identity.id)).await?;
    Ok(Json(messages))
}

pub async fn sent(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<Vec<Message>>, ApiError> {
    let messages =
        blocking("Error fetching sent messages", move || state.messages.sent(identity.id)).await?;
    Ok(Json(messages))
}

/// GET /api/messages/conversation/{userId}: both directions, newest first.
pub async fn conversation(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(other): Path<String>,
) -> Result<Json<Vec<Message>>, ApiError> {
    let other = parse_id(&other)?;
    let messages = blocking("Error fetching conversation", move || {
        state.messages.conversation(identity.id, other)
    })
    .await?;
    Ok(Json(messages))
}

pub async fn mark_read(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Message>, ApiError> {
    let id = parse_id(&id)?;
    let message = blocking("Error marking message as read", move || state.messages.mark_read(id))
        .await?
        .ok_or(ApiError::NotFound("Message not found"))?;
    Ok(Json(message))
}
