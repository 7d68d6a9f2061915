use meme_caption_api::{config::Config, errors::AppError, routes::create_router, startup};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Initialize tracing (logging)
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "meme_caption_api=debug,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load()?;
    tracing::info!(
        bind_address = %config.bind_address,
        scratch_dir = %config.scratch_dir.display(),
        "Configuration loaded"
    );

    let pool = startup::init_resources(&config).await?;
    let state = startup::build_state(&config, pool)?;
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_address)
        .await
        .map_err(|e| AppError::InitError(format!("Failed to bind {}: {}", config.bind_address, e)))?;
    tracing::info!("Listening on {}", config.bind_address);

    axum::serve(listener, app)
        .await
        .map_err(|e| AppError::InternalServerError(format!("Server error: {}", e)))?;

    Ok(())
}
