use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use uuid::Uuid;

use alumni_types::models::Role;

use crate::error::ApiError;
use crate::state::AppState;

pub const ACCESS_COOKIE: &str = "accessToken";
pub const REFRESH_COOKIE: &str = "refreshToken";

/// Caller identity decoded from the access token, available to handlers as
/// `Extension<Identity>` once `authenticate` has run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub id: Uuid,
    pub role: Role,
}

/// Extract and validate the JWT from the `accessToken` cookie.
pub async fn authenticate(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = jar
        .get(ACCESS_COOKIE)
        .map(|c| c.value())
        .filter(|v| !v.is_empty())
        .ok_or(ApiError::Unauthenticated("Access denied"))?;

    let claims = state
        .tokens
        .verify_access(token)
        .map_err(|_| ApiError::Unauthenticated("Invalid token"))?;

    req.extensions_mut().insert(Identity {
        id: claims.sub,
        role: claims.role,
    });
    Ok(next.run(req).await)
}

/// Admin-only gate. Must be layered inside `authenticate`; a request that
/// reaches it without an identity is refused, not crashed.
pub async fn authorize_admin(req: Request, next: Next) -> Result<Response, ApiError> {
    match req.extensions().get::<Identity>() {
        None => Err(ApiError::Forbidden("Authorization failed")),
        Some(identity) if !identity.role.is_admin() => {
            Err(ApiError::Forbidden("Admin access required"))
        }
        Some(_) => Ok(next.run(req).await),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, body::Body, http::StatusCode, middleware::from_fn, routing::get};
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    fn gated() -> Router {
        Router::new()
            .route("/gate", get(|| async { "ok" }))
            .route_layer(from_fn(authorize_admin))
    }

    async fn call(identity: Option<Identity>) -> (StatusCode, Value) {
        let mut req = axum::http::Request::builder().uri("/gate").body(Body::empty()).unwrap();
        if let Some(identity) = identity {
            req.extensions_mut().insert(identity);
        }
        let response = gated().oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn admin_gate_without_identity_is_forbidden() {
        let (status, body) = call(None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body, json!({ "error": "Authorization failed" }));
    }

    #[tokio::test]
    async fn admin_gate_checks_the_role() {
        let id = Uuid::new_v4();

        let (status, body) = call(Some(Identity { id, role: Role::User })).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body, json!({ "error": "Admin access required" }));

        let (status, _) = call(Some(Identity { id, role: Role::Admin })).await;
        assert_eq!(status, StatusCode::OK);
    }
}
