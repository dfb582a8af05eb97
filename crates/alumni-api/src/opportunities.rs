use axum::{
    Extension, Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::info;

use alumni_types::api::{MessageBody, OpportunityRequest};

use crate::error::ApiError;
use crate::middleware::Identity;
use crate::state::AppState;
use crate::validate::{self, parse_id};

const NOT_FOUND: &str = "Opportunity not found";

pub async fn list_opportunities(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let opportunities = state
        .opportunities
        .approvals()
        .list_approved()
        .map_err(|e| ApiError::from_approval(e, NOT_FOUND, "Error fetching opportunities"))?;
    Ok(Json(opportunities))
}

pub async fn list_unapproved(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let opportunities = state
        .opportunities
        .approvals()
        .list_pending()
        .map_err(|e| {
            ApiError::from_approval(e, NOT_FOUND, "Error fetching unapproved opportunities")
        })?;
    Ok(Json(opportunities))
}

pub async fn approve_opportunity(
    State(state): State<AppState>,
    Extension(admin): Extension<Identity>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(&id)?;
    let opportunity = state
        .opportunities
        .approvals()
        .approve(id, admin.id)
        .map_err(|e| ApiError::from_approval(e, NOT_FOUND, "Error approving opportunity"))?;

    info!("Opportunity {} approved by {}", opportunity.id, admin.id);
    Ok(Json(opportunity))
}

/// POST /api/opportunities: new postings always start pending.
pub async fn create_opportunity(
    State(state): State<AppState>,
    payload: Result<Json<OpportunityRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let input = validate::opportunity(validate::json_body(payload)?)?;
    let opportunity = state
        .opportunities
        .create(&input)
        .map_err(ApiError::internal("Error creating opportunity"))?;
    Ok((StatusCode::CREATED, Json(opportunity)))
}

pub async fn get_opportunity(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(&id)?;
    let opportunity = state
        .opportunities
        .approvals()
        .get_visible(id)
        .map_err(|e| {
            ApiError::from_approval(
                e,
                "Opportunity not found or not approved",
                "Error fetching opportunity",
            )
        })?;
    Ok(Json(opportunity))
}

pub async fn update_opportunity(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<OpportunityRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(&id)?;
    let input = validate::opportunity(validate::json_body(payload)?)?;
    let opportunity = state
        .opportunities
        .update(id, &input)
        .map_err(ApiError::internal("Error updating opportunity"))?
        .ok_or(ApiError::NotFound(NOT_FOUND))?;
    Ok(Json(opportunity))
}

pub async fn delete_opportunity(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(&id)?;
    let deleted = state
        .opportunities
        .delete(id)
        .map_err(ApiError::internal("Error deleting opportunity"))?;
    if !deleted {
        return Err(ApiError::NotFound(NOT_FOUND));
    }
    Ok(Json(MessageBody {
        message: "Opportunity deleted successfully",
    }))
}
