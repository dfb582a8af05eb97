pub mod approval;
pub mod auth;
pub mod error;
pub mod majors;
pub mod messages;
pub mod middleware;
pub mod opportunities;
pub mod routes;
pub mod services;
pub mod state;
pub mod tokens;
pub mod users;
pub mod validate;

pub use routes::router;
pub use state::{AppState, AppStateInner};
