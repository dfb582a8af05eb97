use axum::{
    Router,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post, put},
};

use crate::middleware::{authenticate, authorize_admin};
use crate::state::AppState;
use crate::{auth, majors, messages, opportunities, users};

async fn health() -> &'static str {
    "Backend is running"
}

/// Full HTTP surface. The caller adds transport layers (CORS, tracing).
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/", get(health))
        .route("/api/auth/signup", post(auth::signup))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/refresh", post(auth::refresh));

    let protected_routes = Router::new()
        .route("/api/auth/logout", post(auth::logout))
        // users
        .route("/api/users", get(users::list_users))
        .route(
            "/api/users/unapproved",
            get(users::list_unapproved).route_layer(from_fn(authorize_admin)),
        )
        .route(
            "/api/users/{id}/approve",
            put(users::approve_user).route_layer(from_fn(authorize_admin)),
        )
        .route(
            "/api/users/{id}",
            get(users::get_user).put(users::update_user).delete(users::delete_user),
        )
        // opportunities
        .route(
            "/api/opportunities",
            get(opportunities::list_opportunities).post(opportunities::create_opportunity),
        )
        .route(
            "/api/opportunities/unapproved",
            get(opportunities::list_unapproved).route_layer(from_fn(authorize_admin)),
        )
        .route(
            "/api/opportunities/{id}/approve",
            put(opportunities::approve_opportunity).route_layer(from_fn(authorize_admin)),
        )
        .route(
            "/api/opportunities/{id}",
            get(opportunities::get_opportunity)
                .put(opportunities::update_opportunity)
                .delete(opportunities::delete_opportunity),
        )
        // majors
        .route("/api/majors", get(majors::list_majors).post(majors::create_major))
        .route(
            "/api/majors/{id}",
            get(majors::get_major).put(majors::update_major).delete(majors::delete_major),
        )
        // messages
        .route("/api/messages", post(messages::send_message))
        .route("/api/messages/inbox", get(messages::inbox))
        .route("/api/messages/sent", get(messages::sent))
        .route("/api/messages/conversation/{user_id}", get(messages::conversation))
        .route("/api/messages/{id}/read", put(messages::mark_read))
        .route_layer(from_fn_with_state(state.clone(), authenticate));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}
