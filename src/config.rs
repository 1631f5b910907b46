use crate::error::{config_error, env_error, AppResult};
use chrono_tz::Tz;
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::env;

/// Default address the HTTP server binds to
pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:3000";

/// Default externally visible base URL (used to build the OAuth redirect)
pub const DEFAULT_PUBLIC_URL: &str = "http://localhost:3000";

/// Main configuration structure for the application
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Google OAuth client ID
    pub google_client_id: String,
    /// Google OAuth client secret
    pub google_client_secret: String,
    /// Google Calendar ID events are created in
    pub google_calendar_id: String,
    /// Base URL this app is reachable at, for the OAuth redirect
    pub public_url: String,
    /// Address and port the server binds to
    pub bind_address: String,
    /// Secret used to sign session cookies
    pub session_secret: String,
    /// Public URL for the embedded read-only calendar view
    pub embed_calendar_url: String,
    /// IANA timezone name used for created events
    pub timezone: String,
    /// UI locale
    pub ui_locale: String,
}

impl Config {
    /// Load configuration from environment
    pub fn load() -> AppResult<Self> {
        // Load .env file if it exists
        dotenv().ok();

        // Required environment variables
        let google_client_id =
            env::var("GOOGLE_CLIENT_ID").map_err(|_| env_error("GOOGLE_CLIENT_ID"))?;
        let google_client_secret =
            env::var("GOOGLE_CLIENT_SECRET").map_err(|_| env_error("GOOGLE_CLIENT_SECRET"))?;
        let session_secret = env::var("SESSION_SECRET").map_err(|_| env_error("SESSION_SECRET"))?;

        // Events go to the signed-in user's primary calendar unless configured
        let google_calendar_id =
            env::var("GOOGLE_CALENDAR_ID").unwrap_or_else(|_| String::from("primary"));

        let public_url =
            env::var("PUBLIC_URL").unwrap_or_else(|_| String::from(DEFAULT_PUBLIC_URL));
        let bind_address =
            env::var("BIND_ADDRESS").unwrap_or_else(|_| String::from(DEFAULT_BIND_ADDRESS));

        // The embedded view needs a public calendar; default to the configured calendar
        let embed_calendar_url = env::var("EMBED_CALENDAR_URL").unwrap_or_else(|_| {
            format!(
                "https://calendar.google.com/calendar/embed?src={}",
                google_calendar_id
            )
        });

        let timezone = env::var("TIMEZONE").unwrap_or_else(|_| String::from("UTC"));
        timezone
            .parse::<Tz>()
            .map_err(|_| config_error(&format!("Invalid TIMEZONE: {}", timezone)))?;

        let ui_locale = env::var("UI_LOCALE").unwrap_or_else(|_| String::from("en"));

        Ok(Config {
            google_client_id,
            google_client_secret,
            google_calendar_id,
            public_url,
            bind_address,
            session_secret,
            embed_calendar_url,
            timezone,
            ui_locale,
        })
    }

    /// The OAuth redirect URL registered with Google
    pub fn redirect_url(&self) -> String {
        format!("{}/auth/callback", self.public_url.trim_end_matches('/'))
    }

    /// The configured timezone, validated at load time
    pub fn resolved_timezone(&self) -> Tz {
        self.timezone.parse::<Tz>().unwrap_or(chrono_tz::UTC)
    }
}
