use std::sync::Arc;

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use uuid::Uuid;

use alumni_db::Database;
use alumni_types::api::{AccessClaims, RefreshClaims};
use alumni_types::models::User;

pub const ACCESS_TOKEN_TTL_SECS: i64 = 15 * 60;
pub const REFRESH_TOKEN_TTL_SECS: i64 = 7 * 24 * 60 * 60;

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// Bad signature, expired, or not a token at all.
    #[error("invalid token")]
    InvalidToken,
    /// Well-formed refresh token that is no longer the user's current one.
    #[error("refresh token has been superseded")]
    StaleRefreshToken,
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

struct SigningKey {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl SigningKey {
    fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    fn sign<C: Serialize>(&self, claims: &C) -> anyhow::Result<String> {
        Ok(encode(&Header::default(), claims, &self.encoding)?)
    }

    fn verify<C: DeserializeOwned>(&self, token: &str) -> Result<C, TokenError> {
        decode::<C>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| {
                debug!("Token rejected: {}", e);
                TokenError::InvalidToken
            })
    }
}

/// Issues access/refresh pairs and enforces a single live refresh token per user.
pub struct TokenService {
    access: SigningKey,
    refresh: SigningKey,
    db: Arc<Database>,
}

impl TokenService {
    pub fn new(db: Arc<Database>, access_secret: &str, refresh_secret: &str) -> Self {
        Self {
            access: SigningKey::new(access_secret),
            refresh: SigningKey::new(refresh_secret),
            db,
        }
    }

    /// Sign a fresh pair. Pure computation, nothing is stored.
    pub fn issue(&self, user: &User) -> anyhow::Result<TokenPair> {
        let now = Utc::now();

        let access = AccessClaims {
            sub: user.id,
            role: user.role,
            iat: now.timestamp(),
            exp: (now + Duration::seconds(ACCESS_TOKEN_TTL_SECS)).timestamp(),
        };
        let refresh = RefreshClaims {
            sub: user.id,
            jti: Uuid::new_v4(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(REFRESH_TOKEN_TTL_SECS)).timestamp(),
        };

        Ok(TokenPair {
            access_token: self.access.sign(&access)?,
            refresh_token: self.refresh.sign(&refresh)?,
        })
    }

    pub fn verify_access(&self, token: &str) -> Result<AccessClaims, TokenError> {
        self.access.verify(token)
    }

    pub fn verify_refresh(&self, token: &str) -> Result<RefreshClaims, TokenError> {
        self.refresh.verify(token)
    }

    /// Issue a pair at login and make its refresh token the user's current one.
    pub fn start_session(&self, user: &User) -> Result<TokenPair, TokenError> {
        let pair = self.issue(user)?;
        self.db
            .set_refresh_token(&user.id.to_string(), Some(&pair.refresh_token))?;
        Ok(pair)
    }

    /// Forget the user's refresh token so it can no longer be rotated.
    pub fn end_session(&self, user_id: Uuid) -> Result<(), TokenError> {
        self.db.set_refresh_token(&user_id.to_string(), None)?;
        Ok(())
    }

    /// Exchange the presented refresh token for a new pair.
    ///
    /// Fails with `StaleRefreshToken` unless the token is exactly the one on
    /// record. The replacement is written with a compare-and-swap, so of two
    /// concurrent rotations of the same token only one wins.
    pub fn rotate(&self, presented: &str) -> Result<TokenPair, TokenError> {
        let claims = self.verify_refresh(presented)?;
        let user_id = claims.sub.to_string();

        let row = self
            .db
            .get_user_by_id(&user_id)?
            .ok_or(TokenError::StaleRefreshToken)?;
        if row.refresh_token.as_deref() != Some(presented) {
            return Err(TokenError::StaleRefreshToken);
        }

        let pair = self.issue(&User::from(row))?;
        if !self
            .db
            .swap_refresh_token(&user_id, presented, &pair.refresh_token)?
        {
            return Err(TokenError::StaleRefreshToken);
        }
        Ok(pair)
    }
}
