use std::path::PathBuf;

use anyhow::{Context, bail};

/// Values shipped in sample `.env` files. Starting with one of these would
/// make every token forgeable.
const PLACEHOLDER_SECRETS: &[&str] = &[
    "dev-secret-change-me",
    "change-me",
    "changeme",
    "secret",
    "your_jwt_secret",
    "your_refresh_secret",
];

#[derive(Debug)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub jwt_secret: String,
    pub refresh_secret: String,
    pub client_url: Option<String>,
    pub admin: Option<(String, String)>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let non_empty = |key: &str| var(key).filter(|v| !v.trim().is_empty());

        let host = non_empty("ALUMNI_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port = match non_empty("ALUMNI_PORT") {
            Some(raw) => raw.parse().with_context(|| format!("ALUMNI_PORT is not a port: {raw}"))?,
            None => 5000,
        };
        let db_path =
            PathBuf::from(non_empty("ALUMNI_DB_PATH").unwrap_or_else(|| "alumni.db".into()));

        let jwt_secret = secret(non_empty("ALUMNI_JWT_SECRET"), "ALUMNI_JWT_SECRET")?;
        let refresh_secret = secret(non_empty("ALUMNI_REFRESH_SECRET"), "ALUMNI_REFRESH_SECRET")?;
        if jwt_secret == refresh_secret {
            bail!("ALUMNI_JWT_SECRET and ALUMNI_REFRESH_SECRET must differ");
        }

        let admin = match (non_empty("ALUMNI_ADMIN_EMAIL"), non_empty("ALUMNI_ADMIN_PASSWORD")) {
            (Some(email), Some(password)) => Some((email, password)),
            _ => None,
        };

        Ok(Self {
            host,
            port,
            db_path,
            jwt_secret,
            refresh_secret,
            client_url: non_empty("ALUMNI_CLIENT_URL"),
            admin,
        })
    }
}

fn secret(value: Option<String>, name: &str) -> anyhow::Result<String> {
    match value {
        None => bail!("{name} must be set"),
        Some(v) if PLACEHOLDER_SECRETS.contains(&v.as_str()) => {
            bail!("{name} is still a placeholder value; generate a real secret")
        }
        Some(v) => Ok(v),
    }
}
