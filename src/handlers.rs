use axum::extract::{Query, State};
use axum::http::{header, request::Parts, HeaderValue, StatusCode};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Form;
use serde::Deserialize;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::error::{other_error, Error};
use crate::google::{EventDraft, ValidationErrors};
use crate::session::{
    clear_session_cookie, clear_state_cookie, extract_cookie, session_cookie, state_cookie, Claims,
    STATE_COOKIE,
};
use crate::startup::AppState;

/// Convert application errors to HTTP responses
pub struct AppError(Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        error!("Request failed: {}", self.0);
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
    }
}

impl From<Error> for AppError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

/// Error keys the sign-in page is allowed to display
const ALLOWED_ERROR_KEYS: [&str; 2] = ["signin_failed", "state_mismatch"];

/// Banner shown above the form after a submission
enum Banner {
    Success(String),
    Error(String),
}

/// Escape a value before echoing it into HTML
fn html_escape(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#39;"),
            _ => result.push(c),
        }
    }
    result
}

/// Render the signed-out page with the sign-in control
fn render_signin_page(error_key: Option<&str>) -> Html<String> {
    let html = include_str!("../assets/signin.html")
        .replace("{{app_title}}", &t!("app_title"))
        .replace("{{signin_button}}", &t!("signin_button"));

    // Only display errors from our allowed list
    let html = match error_key {
        Some(key) if ALLOWED_ERROR_KEYS.contains(&key) => html.replace(
            "<!-- BANNER -->",
            &format!("<div class=\"banner banner-error\">{}</div>", t!(key)),
        ),
        _ => html,
    };

    Html(html)
}

/// Render the signed-in page: event form plus the embedded calendar view
fn render_form_page(
    claims: &Claims,
    draft: &EventDraft,
    errors: &ValidationErrors,
    banner: Option<Banner>,
    embed_url: &str,
) -> Html<String> {
    let mut html = include_str!("../assets/form.html")
        .replace("{{app_title}}", &t!("app_title"))
        .replace(
            "{{form_heading}}",
            &t!("form_heading", email = html_escape(&claims.sub)),
        )
        .replace("{{label_start}}", &t!("label_start"))
        .replace("{{label_end}}", &t!("label_end"))
        .replace("{{label_title}}", &t!("label_title"))
        .replace("{{label_description}}", &t!("label_description"))
        .replace("{{label_location}}", &t!("label_location"))
        .replace("{{placeholder_title}}", &t!("placeholder_title"))
        .replace("{{placeholder_description}}", &t!("placeholder_description"))
        .replace("{{placeholder_location}}", &t!("placeholder_location"))
        .replace("{{submit_button}}", &t!("submit_button"))
        .replace("{{signout_button}}", &t!("signout_button"))
        .replace("{{embed_title}}", &t!("embed_title"))
        .replace("{{embed_url}}", &html_escape(embed_url))
        .replace("{{title}}", &html_escape(&draft.title))
        .replace("{{description}}", &html_escape(&draft.description))
        .replace("{{location}}", &html_escape(&draft.location))
        .replace("{{start}}", &html_escape(&draft.start))
        .replace("{{end}}", &html_escape(&draft.end));

    // Inline per-field errors
    let slots = [
        ("<!-- ERROR_TITLE -->", errors.title),
        ("<!-- ERROR_DESCRIPTION -->", errors.description),
        ("<!-- ERROR_LOCATION -->", errors.location),
        ("<!-- ERROR_START -->", errors.start),
        ("<!-- ERROR_END -->", errors.end),
    ];
    for (slot, field_error) in slots {
        if let Some(field_error) = field_error {
            html = html.replace(
                slot,
                &format!(
                    "<span class=\"field-error\">{}</span>",
                    t!(field_error.message_key())
                ),
            );
        }
    }

    if let Some(banner) = banner {
        let rendered = match banner {
            Banner::Success(message) => {
                format!("<div class=\"banner banner-success\">{}</div>", message)
            }
            Banner::Error(message) => {
                format!("<div class=\"banner banner-error\">{}</div>", message)
            }
        };
        html = html.replace("<!-- BANNER -->", &rendered);
    }

    Html(html)
}

/// Handler for the single page: sign-in control without a session,
/// the event form with one
pub async fn index_handler(
    State(state): State<AppState>,
    Query(params): Query<std::collections::HashMap<String, String>>,
    parts: Parts,
) -> Html<String> {
    match state.sessions.session_from_parts(&parts) {
        Some(claims) => {
            let embed_url = {
                let config_read = state.config.read().await;
                config_read.embed_calendar_url.clone()
            };
            render_form_page(
                &claims,
                &EventDraft::default(),
                &ValidationErrors::default(),
                None,
                &embed_url,
            )
        }
        None => render_signin_page(params.get("error").map(String::as_str)),
    }
}

/// Handler that starts the sign-in redirect to Google
pub async fn login_handler(State(state): State<AppState>) -> Result<Response, AppError> {
    // Random state ties the callback to this browser
    let csrf_state = Uuid::new_v4().to_string();
    let auth_url = state.oauth.authorize_url(&csrf_state)?;

    let mut response = Redirect::to(&auth_url).into_response();
    response.headers_mut().insert(
        header::SET_COOKIE,
        HeaderValue::from_str(&state_cookie(&csrf_state))
            .map_err(|e| other_error(&format!("Failed to build state cookie: {}", e)))?,
    );
    Ok(response)
}

/// Query parameters Google sends to the OAuth callback
#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

fn signin_failed_response(error_key: &str) -> Response {
    let mut response = Redirect::to(&format!("/?error={}", error_key)).into_response();
    if let Ok(value) = HeaderValue::from_str(&clear_state_cookie()) {
        response.headers_mut().insert(header::SET_COOKIE, value);
    }
    response
}

/// Handler for the OAuth callback from Google
pub async fn callback_handler(
    State(state): State<AppState>,
    parts: Parts,
    Query(params): Query<CallbackParams>,
) -> Result<Response, AppError> {
    if let Some(provider_error) = params.error {
        warn!("Sign-in rejected by provider: {}", provider_error);
        return Ok(signin_failed_response("signin_failed"));
    }

    // The state we sent must come back unchanged
    let expected_state = extract_cookie(&parts, STATE_COOKIE).ok();
    if expected_state.is_none() || expected_state != params.state {
        warn!("OAuth state mismatch on callback");
        return Ok(signin_failed_response("state_mismatch"));
    }

    let Some(code) = params.code else {
        warn!("OAuth callback without authorization code");
        return Ok(signin_failed_response("signin_failed"));
    };

    let tokens = match state.oauth.exchange_code(&code).await {
        Ok(tokens) => tokens,
        Err(e) => {
            error!("Failed to exchange authorization code: {}", e);
            return Ok(signin_failed_response("signin_failed"));
        }
    };

    let user = match state.oauth.fetch_user_info(&tokens.access_token).await {
        Ok(user) => user,
        Err(e) => {
            error!("Failed to fetch user info: {}", e);
            return Ok(signin_failed_response("signin_failed"));
        }
    };

    let token = state
        .sessions
        .issue(&user.email, user.name.clone(), &tokens)
        .map_err(|e| other_error(&format!("{:?}", e)))?;

    info!("User {} signed in", user.email);

    let mut response = Redirect::to("/").into_response();
    let headers = response.headers_mut();
    headers.append(
        header::SET_COOKIE,
        HeaderValue::from_str(&session_cookie(&token))
            .map_err(|e| other_error(&format!("Failed to build session cookie: {}", e)))?,
    );
    headers.append(
        header::SET_COOKIE,
        HeaderValue::from_str(&clear_state_cookie())
            .map_err(|e| other_error(&format!("Failed to build state cookie: {}", e)))?,
    );
    Ok(response)
}

/// Handler for signing out: drop the session cookie
pub async fn logout_handler() -> Response {
    let mut response = Redirect::to("/").into_response();
    if let Ok(value) = HeaderValue::from_str(&clear_session_cookie()) {
        response.headers_mut().insert(header::SET_COOKIE, value);
    }
    response
}

/// Handler for event form submission
pub async fn create_event_handler(
    State(state): State<AppState>,
    parts: Parts,
    Form(draft): Form<EventDraft>,
) -> Result<Response, AppError> {
    let Some(mut claims) = state.sessions.session_from_parts(&parts) else {
        return Ok(Redirect::to("/").into_response());
    };

    let (calendar_id, tz, embed_url) = {
        let config_read = state.config.read().await;
        (
            config_read.google_calendar_id.clone(),
            config_read.resolved_timezone(),
            config_read.embed_calendar_url.clone(),
        )
    };

    // Validation gate: an invalid draft never reaches the network
    let payload = match draft.prepare(tz) {
        Ok(payload) => payload,
        Err(errors) => {
            return Ok(render_form_page(&claims, &draft, &errors, None, &embed_url).into_response());
        }
    };

    // Refresh the access token first if it is about to lapse
    let mut refreshed_cookie = None;
    if claims.token_set().expires_within(60) {
        match state.oauth.refresh(&claims.token_set()).await {
            Ok(tokens) => {
                let token = state
                    .sessions
                    .issue(&claims.sub, claims.name.clone(), &tokens)
                    .map_err(|e| other_error(&format!("{:?}", e)))?;
                refreshed_cookie = Some(session_cookie(&token));
                claims.access_token = tokens.access_token;
                claims.refresh_token = tokens.refresh_token;
                claims.token_expires_at = tokens.expires_at;
            }
            Err(e) => {
                error!("Failed to refresh access token: {}", e);
                let banner = Banner::Error(t!("session_expired").to_string());
                return Ok(
                    render_form_page(&claims, &draft, &ValidationErrors::default(), Some(banner), &embed_url)
                        .into_response(),
                );
            }
        }
    }

    let banner = match state
        .calendar
        .insert_event(&claims.access_token, &calendar_id, &payload)
        .await
    {
        Ok(created) => {
            info!("Event '{}' created as {}", payload.summary, created.id);
            Banner::Success(t!("event_created").to_string())
        }
        Err(e) => {
            error!("Failed to create event: {}", e);
            Banner::Error(
                t!("event_create_failed", message = html_escape(&e.to_string())).to_string(),
            )
        }
    };

    // A successful submission clears the draft
    let draft = match &banner {
        Banner::Success(_) => EventDraft::default(),
        Banner::Error(_) => draft,
    };

    let mut response =
        render_form_page(&claims, &draft, &ValidationErrors::default(), Some(banner), &embed_url)
            .into_response();
    if let Some(cookie) = refreshed_cookie {
        response.headers_mut().insert(
            header::SET_COOKIE,
            HeaderValue::from_str(&cookie)
                .map_err(|e| other_error(&format!("Failed to build session cookie: {}", e)))?,
        );
    }
    Ok(response)
}

/// Keep-alive handler: refresh the Google access token when it nears expiry
pub async fn ping_handler(State(state): State<AppState>, parts: Parts) -> Response {
    let Some(claims) = state.sessions.session_from_parts(&parts) else {
        return StatusCode::UNAUTHORIZED.into_response();
    };

    if !claims.token_set().expires_within(300) {
        return "OK".into_response();
    }

    match state.oauth.refresh(&claims.token_set()).await {
        Ok(tokens) => {
            let token = match state.sessions.issue(&claims.sub, claims.name.clone(), &tokens) {
                Ok(token) => token,
                Err(e) => {
                    error!("Failed to issue refreshed session: {:?}", e);
                    return StatusCode::INTERNAL_SERVER_ERROR.into_response();
                }
            };
            let mut response = "OK".into_response();
            if let Ok(value) = HeaderValue::from_str(&session_cookie(&token)) {
                response.headers_mut().insert(header::SET_COOKIE, value);
            }
            response
        }
        Err(e) => {
            error!("Keep-alive token refresh failed: {}", e);
            StatusCode::UNAUTHORIZED.into_response()
        }
    }
}

/// Handler for API health check
pub async fn health_handler() -> &'static str {
    "OK"
}
