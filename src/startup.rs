use axum::routing::{get, post};
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::{oneshot, RwLock};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::config::Config;
use crate::error::{config_error, Error};
use crate::google::{CalendarClient, OAuthClient};
use crate::handlers;
use crate::session::SessionService;
use crate::shutdown;

/// Shared state for all request handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<RwLock<Config>>,
    pub sessions: Arc<SessionService>,
    pub oauth: Arc<OAuthClient>,
    pub calendar: Arc<CalendarClient>,
}

/// Initialize logging with environment-based configuration
pub fn init_logging() -> miette::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=warn")),
        )
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| Error::Other(format!("Failed to set up logging: {}", e)))?;

    Ok(())
}

/// Load and initialize the application config
pub async fn load_config() -> miette::Result<Arc<RwLock<Config>>> {
    match Config::load() {
        Ok(config) => Ok(Arc::new(RwLock::new(config))),
        Err(e) => {
            error!("Failed to load configuration: {:?}", e);
            Err(e.into())
        }
    }
}

/// Assemble the application router
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any);

    Router::new()
        .route("/", get(handlers::index_handler))
        .route("/auth/login", get(handlers::login_handler))
        .route("/auth/callback", get(handlers::callback_handler))
        .route("/auth/logout", post(handlers::logout_handler))
        .route("/events", post(handlers::create_event_handler))
        .route("/session/ping", get(handlers::ping_handler))
        .route("/health", get(handlers::health_handler))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Build the router and serve it until a termination signal arrives
pub async fn start_server(config: Arc<RwLock<Config>>) -> miette::Result<()> {
    let state = {
        let config_read = config.read().await;

        // Set locale from config
        rust_i18n::set_locale(&config_read.ui_locale);
        info!("Setting locale to {}", config_read.ui_locale);

        AppState {
            config: Arc::clone(&config),
            sessions: Arc::new(SessionService::new(config_read.session_secret.clone())),
            oauth: Arc::new(OAuthClient::new(&config_read)),
            calendar: Arc::new(CalendarClient::new()),
        }
    };

    let app = build_router(state);

    let addr = {
        let config_read = config.read().await;
        config_read
            .bind_address
            .parse::<SocketAddr>()
            .map_err(|_| config_error(&format!("Invalid BIND_ADDRESS: {}", config_read.bind_address)))?
    };

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(Error::Io)?;
    info!("Listening on http://{}", addr);

    // Shut down cleanly on SIGTERM/SIGINT
    let (shutdown_send, shutdown_recv) = oneshot::channel();
    tokio::spawn(shutdown::handle_signals(shutdown_send));

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown_recv.await;
        })
        .await
        .map_err(Error::Io)?;

    info!("Server stopped");

    Ok(())
}
