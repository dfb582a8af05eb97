use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use tracing::{info, warn};

use alumni_types::api::{LoginRequest, LoginResponse, MessageBody, SignupRequest};

use crate::error::ApiError;
use crate::middleware::{ACCESS_COOKIE, Identity, REFRESH_COOKIE};
use crate::services::UserError;
use crate::state::AppState;
use crate::tokens::{ACCESS_TOKEN_TTL_SECS, REFRESH_TOKEN_TTL_SECS, TokenError, TokenPair};
use crate::validate;

// The existing web client reads both cookies from script and is served over
// plain HTTP in development, so neither HttpOnly nor Secure is set.
fn session_cookie(name: &'static str, value: String, ttl_secs: i64) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(false)
        .secure(false)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(ttl_secs))
        .build()
}

fn with_session(jar: CookieJar, pair: TokenPair) -> CookieJar {
    jar.add(session_cookie(ACCESS_COOKIE, pair.access_token, ACCESS_TOKEN_TTL_SECS))
        .add(session_cookie(REFRESH_COOKIE, pair.refresh_token, REFRESH_TOKEN_TTL_SECS))
}

pub async fn signup(
    State(state): State<AppState>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let signup = validate::signup(validate::json_body(payload)?)?;

    let user = state.users.signup(&signup).map_err(|e| match e {
        UserError::EmailTaken => ApiError::Conflict("Email already registered"),
        UserError::Store(cause) => ApiError::Internal {
            message: "Error creating user",
            cause,
        },
    })?;

    info!("New account {} ({}) awaiting approval", user.email, user.id);
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let req = validate::json_body(payload)?;

    let user = state
        .users
        .verify_credentials(&req.email, &req.password)
        .map_err(ApiError::internal("Error logging in"))?
        .ok_or_else(|| {
            warn!("Failed login for {}", req.email);
            ApiError::Unauthenticated("Invalid credentials")
        })?;

    let pair = state.tokens.start_session(&user).map_err(ApiError::internal("Error logging in"))?;

    info!("{} ({}) logged in", user.email, user.id);
    Ok((
        with_session(jar, pair),
        Json(LoginResponse {
            message: "Login successful",
            user,
        }),
    ))
}

pub async fn refresh(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<impl IntoResponse, ApiError> {
    let presented = jar
        .get(REFRESH_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(ApiError::Unauthenticated("Refresh token required"))?;

    let pair = state.tokens.rotate(&presented).map_err(|e| match e {
        TokenError::Store(cause) => ApiError::Internal {
            message: "Error refreshing token",
            cause,
        },
        rejected => {
            warn!("Refresh rejected: {}", rejected);
            ApiError::Unauthenticated("Invalid refresh token")
        }
    })?;

    info!("Session refreshed");
    Ok((
        with_session(jar, pair),
        Json(MessageBody {
            message: "Token refreshed successfully",
        }),
    ))
}

pub async fn logout(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    jar: CookieJar,
) -> Result<impl IntoResponse, ApiError> {
    state
        .tokens
        .end_session(identity.id)
        .map_err(ApiError::internal("Error logging out"))?;

    let jar = jar
        .remove(Cookie::build(ACCESS_COOKIE).path("/"))
        .remove(Cookie::build(REFRESH_COOKIE).path("/"));

    info!("{} logged out", identity.id);
    Ok((
        jar,
        Json(MessageBody {
            message: "Logged out successfully",
        }),
    ))
}
