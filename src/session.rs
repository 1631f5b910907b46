use axum::http::{header, request::Parts};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;

use crate::google::oauth::TokenSet;

/// Name of the session cookie
pub const SESSION_COOKIE: &str = "session_token";

/// Name of the short-lived cookie carrying the OAuth CSRF state
pub const STATE_COOKIE: &str = "oauth_state";

/// JWT claims carried by the session cookie.
///
/// The Google token set travels inside the signed cookie, so the server
/// holds no session state of its own.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (the Google account email)
    pub sub: String,
    /// Display name from the Google profile
    pub name: Option<String>,
    /// Google OAuth access token
    pub access_token: String,
    /// Google OAuth refresh token
    pub refresh_token: String,
    /// Access-token expiry (UTC timestamp)
    pub token_expires_at: i64,
    /// Session expiration time (UTC timestamp)
    pub exp: usize,
    /// Issued at (UTC timestamp)
    pub iat: usize,
}

impl Claims {
    /// The Google token set held in this session
    pub fn token_set(&self) -> TokenSet {
        TokenSet {
            access_token: self.access_token.clone(),
            refresh_token: self.refresh_token.clone(),
            expires_at: self.token_expires_at,
        }
    }
}

/// Session error
#[derive(Debug)]
pub enum SessionError {
    /// Cookie is missing
    MissingToken,
    /// Cookie is invalid or expired
    InvalidToken,
    /// Some other error
    Other(String),
}

/// Extract a named cookie from request parts
pub fn extract_cookie(parts: &Parts, name: &str) -> Result<String, SessionError> {
    let cookie_header = parts
        .headers
        .get(header::COOKIE)
        .ok_or(SessionError::MissingToken)?;

    let cookie_str = cookie_header
        .to_str()
        .map_err(|_| SessionError::InvalidToken)?;

    for cookie_pair in cookie_str.split(';') {
        let mut parts = cookie_pair.trim().splitn(2, '=');
        if let (Some(key), Some(value)) = (parts.next(), parts.next()) {
            if key == name {
                return Ok(value.to_string());
            }
        }
    }

    Err(SessionError::MissingToken)
}

/// Session configuration
#[derive(Clone)]
pub struct SessionConfig {
    /// Secret for signing/verifying session tokens
    pub secret: String,
    /// Session lifetime in minutes
    pub expiration_minutes: i64,
}

/// Service for issuing and validating session cookies
pub struct SessionService {
    config: Arc<SessionConfig>,
}

impl SessionService {
    /// Create a new session service with a 24 hour session lifetime
    pub fn new(secret: String) -> Self {
        Self {
            config: Arc::new(SessionConfig {
                secret,
                expiration_minutes: 60 * 24,
            }),
        }
    }

    /// Issue a signed session token for a signed-in user
    pub fn issue(
        &self,
        email: &str,
        name: Option<String>,
        tokens: &TokenSet,
    ) -> Result<String, SessionError> {
        let now = Utc::now();
        let exp = now + Duration::minutes(self.config.expiration_minutes);

        let claims = Claims {
            sub: email.to_string(),
            name,
            access_token: tokens.access_token.clone(),
            refresh_token: tokens.refresh_token.clone(),
            token_expires_at: tokens.expires_at,
            exp: exp.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.config.secret.as_bytes()),
        )
        .map_err(|e| SessionError::Other(format!("Failed to issue session token: {}", e)))
    }

    /// Validate a session token
    pub fn validate(&self, token: &str) -> Result<Claims, SessionError> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.secret.as_bytes()),
            &Validation::default(),
        )
        .map(|token_data| token_data.claims)
        .map_err(|e| {
            error!("Session token validation error: {:?}", e);
            SessionError::InvalidToken
        })
    }

    /// Read and validate the session from request parts, if present
    pub fn session_from_parts(&self, parts: &Parts) -> Option<Claims> {
        extract_cookie(parts, SESSION_COOKIE)
            .ok()
            .and_then(|token| self.validate(&token).ok())
    }
}

/// Cookie string for a freshly issued session token
pub fn session_cookie(token: &str) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax",
        SESSION_COOKIE, token
    )
}

/// Cookie string that clears the session
pub fn clear_session_cookie() -> String {
    format!("{}=; Path=/; HttpOnly; Max-Age=0", SESSION_COOKIE)
}

/// Cookie string for the OAuth CSRF state, valid for ten minutes
pub fn state_cookie(state: &str) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age=600",
        STATE_COOKIE, state
    )
}

/// Cookie string that clears the OAuth CSRF state
pub fn clear_state_cookie() -> String {
    format!("{}=; Path=/; HttpOnly; Max-Age=0", STATE_COOKIE)
}
