use axum::body::Body;
use axum::http::{Request, StatusCode};
use std::sync::Arc;
use tapahtuma::config::Config;
use tapahtuma::google::oauth::TokenSet;
use tapahtuma::google::{CalendarClient, OAuthClient};
use tapahtuma::session::SessionService;
use tapahtuma::startup::{build_router, AppState};
use tokio::sync::RwLock;
use tower::ServiceExt;

fn test_state() -> AppState {
    let config = Config {
        google_client_id: "test_client_id".to_string(),
        google_client_secret: "test_client_secret".to_string(),
        google_calendar_id: "primary".to_string(),
        public_url: "http://localhost:3000".to_string(),
        bind_address: "127.0.0.1:3000".to_string(),
        session_secret: "test_secret".to_string(),
        embed_calendar_url: "https://calendar.google.com/calendar/embed?src=primary".to_string(),
        timezone: "UTC".to_string(),
        ui_locale: "en".to_string(),
    };

    AppState {
        sessions: Arc::new(SessionService::new(config.session_secret.clone())),
        oauth: Arc::new(OAuthClient::new(&config)),
        calendar: Arc::new(CalendarClient::new()),
        config: Arc::new(RwLock::new(config)),
    }
}

fn session_token(state: &AppState) -> String {
    let tokens = TokenSet::from_response(
        "test_access_token".to_string(),
        "test_refresh_token".to_string(),
        3600,
    );
    state
        .sessions
        .issue("user@example.com", Some("Test User".to_string()), &tokens)
        .unwrap()
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Without a session only the sign-in control renders
#[tokio::test]
async fn test_signed_out_page_shows_only_signin() {
    let app = build_router(test_state());

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_string(response).await;
    assert!(html.contains("/auth/login"));
    assert!(!html.contains("action=\"/events\""));
}

/// With a session the form renders and the sign-in control does not
#[tokio::test]
async fn test_signed_in_page_shows_form_without_signin() {
    let state = test_state();
    let token = session_token(&state);
    let app = build_router(state);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/")
                .header("cookie", format!("session_token={}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_string(response).await;
    assert!(html.contains("action=\"/events\""));
    assert!(html.contains("user@example.com"));
    assert!(!html.contains("/auth/login"));
}

/// A garbage session cookie falls back to the signed-out view
#[tokio::test]
async fn test_invalid_session_cookie_shows_signin() {
    let app = build_router(test_state());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/")
                .header("cookie", "session_token=not-a-real-token")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_string(response).await;
    assert!(html.contains("/auth/login"));
    assert!(!html.contains("action=\"/events\""));
}

/// Health probe stays public
#[tokio::test]
async fn test_health_endpoint() {
    let app = build_router(test_state());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "OK");
}

/// The keep-alive ping rejects requests without a session
#[tokio::test]
async fn test_ping_requires_session() {
    let app = build_router(test_state());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/session/ping")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
