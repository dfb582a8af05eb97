use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};

use alumni_types::api::{MajorRequest, MessageBody};

use crate::error::ApiError;
use crate::state::AppState;
use crate::validate::{self, parse_id};

pub async fn list_majors(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let majors = state.majors.list().map_err(ApiError::internal("Error fetching majors"))?;
    Ok(Json(majors))
}

pub async fn create_major(
    State(state): State<AppState>,
    payload: Result<Json<MajorRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let (name, department) = validate::major(validate::json_body(payload)?)?;
    let major = state
        .majors
        .create(&name, &department)
        .map_err(ApiError::internal("Error creating major"))?;
    Ok((StatusCode::CREATED, Json(major)))
}

pub async fn get_major(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(&id)?;
    let major = state
        .majors
        .get(id)
        .map_err(ApiError::internal("Error fetching major"))?
        .ok_or(ApiError::NotFound("Major not found"))?;
    Ok(Json(major))
}

pub async fn update_major(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<MajorRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(&id)?;
    let (name, department) = validate::major(validate::json_body(payload)?)?;
    let major = state
        .majors
        .update(id, &name, &department)
        .map_err(ApiError::internal("Error updating major"))?
        .ok_or(ApiError::NotFound("Major not found"))?;
    Ok(Json(major))
}

pub async fn delete_major(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(&id)?;
    let deleted = state
        .majors
        .delete(id)
        .map_err(ApiError::internal("Error deleting major"))?;
    if !deleted {
        return Err(ApiError::NotFound("Major not found"));
    }
    Ok(Json(MessageBody {
        message: "Major deleted",
    }))
}
