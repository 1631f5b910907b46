use tracing::info;

#[tokio::main]
async fn main() -> miette::Result<()> {
    // Initialize logging
    tapahtuma::startup::init_logging()?;

    info!("Starting tapahtuma");

    // Load configuration
    let config = tapahtuma::startup::load_config().await?;

    // Start the web server
    tapahtuma::startup::start_server(config).await
}
