use tracing::info;

#[tokio::main]
async fn main() -> miette::Result<()> {
    // Initialize logging
    outfitly::startup::init_logging()?;

    info!("Starting outfitly server");

    // Load configuration
    let config = outfitly::startup::load_config().await?;

    // Start the HTTP API
    outfitly::startup::run_server(config).await
}
