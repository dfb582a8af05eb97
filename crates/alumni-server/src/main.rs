use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::{HeaderValue, Method, header};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use alumni_api::AppStateInner;
use alumni_db::Database;

mod config;

use config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "alumni=debug,tower_http=debug".into()),
        )
        .init();

    let config = Config::from_env()?;

    // Init database
    let db = Arc::new(Database::open(&config.db_path)?);
    let state = AppStateInner::new(db, &config.jwt_secret, &config.refresh_secret);

    if let Some((email, password)) = &config.admin {
        if state.users.ensure_admin(email, password)? {
            info!("Created admin account {}", email);
        }
    } else {
        warn!("No admin account configured; pending users and opportunities cannot be approved");
    }

    let app = alumni_api::router(state)
        .layer(cors(config.client_url.as_deref())?)
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("Alumni backend listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Session cookies ride on every request, so the browser origin must be
/// named explicitly rather than wildcarded.
fn cors(client_url: Option<&str>) -> anyhow::Result<CorsLayer> {
    let Some(origin) = client_url else {
        return Ok(CorsLayer::very_permissive());
    };
    Ok(CorsLayer::new()
        .allow_origin(origin.parse::<HeaderValue>()?)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]))
}
