use chrono::Utc;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::Config;
use crate::error::{oauth_error, AppResult};

pub const AUTH_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/v2/auth";
pub const TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";
pub const USERINFO_ENDPOINT: &str = "https://openidconnect.googleapis.com/v1/userinfo";

/// Calendar scope plus identity scopes for the signed-in header
pub const SCOPES: &str = "https://www.googleapis.com/auth/calendar openid email profile";

/// An access/refresh token pair with its expiry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenSet {
    pub access_token: String,
    pub refresh_token: String,
    /// Access-token expiry as a UTC timestamp
    pub expires_at: i64,
}

impl TokenSet {
    pub fn from_response(access_token: String, refresh_token: String, expires_in: i64) -> Self {
        TokenSet {
            access_token,
            refresh_token,
            expires_at: Utc::now().timestamp() + expires_in,
        }
    }

    /// Whether the access token expires within the next `seconds`
    pub fn expires_within(&self, seconds: i64) -> bool {
        self.expires_at <= Utc::now().timestamp() + seconds
    }
}

/// Identity read from Google's userinfo endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleUser {
    pub email: String,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    3600
}

/// Client for Google's OAuth 2.0 endpoints
#[derive(Clone)]
pub struct OAuthClient {
    client_id: String,
    client_secret: String,
    redirect_url: String,
    client: Client,
}

impl OAuthClient {
    pub fn new(config: &Config) -> Self {
        Self {
            client_id: config.google_client_id.clone(),
            client_secret: config.google_client_secret.clone(),
            redirect_url: config.redirect_url(),
            client: Client::new(),
        }
    }

    /// Build the consent-screen URL the user is redirected to on sign-in
    pub fn authorize_url(&self, state: &str) -> AppResult<String> {
        let mut url = Url::parse(AUTH_ENDPOINT)
            .map_err(|e| oauth_error(&format!("Failed to parse auth endpoint: {}", e)))?;

        url.query_pairs_mut()
            .append_pair("client_id", &self.client_id)
            .append_pair("redirect_uri", &self.redirect_url)
            .append_pair("response_type", "code")
            .append_pair("access_type", "offline")
            .append_pair("prompt", "consent")
            .append_pair("scope", SCOPES)
            .append_pair("state", state);

        Ok(url.to_string())
    }

    /// Exchange an authorization code for tokens
    pub async fn exchange_code(&self, code: &str) -> AppResult<TokenSet> {
        let response = self
            .client
            .post(TOKEN_ENDPOINT)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("code", code),
                ("redirect_uri", self.redirect_url.as_str()),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await
            .map_err(|e| oauth_error(&format!("Failed to exchange authorization code: {}", e)))?;

        Self::parse_token_response(response, None).await
    }

    /// Refresh an expired access token
    pub async fn refresh(&self, tokens: &TokenSet) -> AppResult<TokenSet> {
        let response = self
            .client
            .post(TOKEN_ENDPOINT)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("refresh_token", tokens.refresh_token.as_str()),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await
            .map_err(|e| oauth_error(&format!("Failed to refresh token: {}", e)))?;

        Self::parse_token_response(response, Some(tokens.refresh_token.clone())).await
    }

    /// Fetch the signed-in user's email and name
    pub async fn fetch_user_info(&self, access_token: &str) -> AppResult<GoogleUser> {
        let response = self
            .client
            .get(USERINFO_ENDPOINT)
            .header("Authorization", format!("Bearer {}", access_token))
            .send()
            .await
            .map_err(|e| oauth_error(&format!("Failed to fetch user info: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            return Err(oauth_error(&format!(
                "Userinfo endpoint returned HTTP {} - {}",
                status, error_body
            )));
        }

        response
            .json::<GoogleUser>()
            .await
            .map_err(|e| oauth_error(&format!("Failed to parse userinfo response: {}", e)))
    }

    async fn parse_token_response(
        response: reqwest::Response,
        fallback_refresh: Option<String>,
    ) -> AppResult<TokenSet> {
        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            return Err(oauth_error(&format!(
                "Token endpoint returned HTTP {} - {}",
                status, error_body
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| oauth_error(&format!("Failed to parse token response: {}", e)))?;

        // Google typically doesn't return a new refresh_token on refresh
        let refresh_token = token
            .refresh_token
            .filter(|t| !t.is_empty())
            .or(fallback_refresh)
            .ok_or_else(|| oauth_error("Token response missing 'refresh_token' field"))?;

        Ok(TokenSet::from_response(
            token.access_token,
            refresh_token,
            token.expires_in,
        ))
    }
}
