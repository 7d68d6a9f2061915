use crate::{
    compositor::ImageCompositor,
    config::Config,
    db,
    errors::AppError,
    fonts::{FontResolver, FontSet},
    repositories::SqliteMemeRepository,
    storage::LocalFileStorage,
    AppState,
};
use sqlx::SqlitePool;
use std::sync::Arc;

/// Prepares the scratch directory and the database, returning the migrated pool.
pub async fn init_resources(config: &Config) -> Result<SqlitePool, AppError> {
    tracing::info!("Startup: Initializing resources...");

    LocalFileStorage::new(config.scratch_dir.clone())
        .ensure_root()
        .map_err(|e| {
            AppError::InitError(format!(
                "Startup: cannot create scratch directory '{}': {}",
                config.scratch_dir.display(),
                e
            ))
        })?;

    check_fonts(&FontResolver::new(config.fonts.clone()));

    let pool = db::connect(&config.database_url, config.database_max_connections)
        .await
        .map_err(|e| AppError::InitError(format!("Startup: {:#}", e)))?;
    db::run_migrations(&pool)
        .await
        .map_err(|e| AppError::InitError(format!("Startup: {:#}", e)))?;

    tracing::info!("Startup: Resource initialization complete.");
    Ok(pool)
}

/// Reports caption font assets absent from disk and returns how many are missing.
/// Missing fonts only fail the renders that need them.
pub fn check_fonts(resolver: &FontResolver) -> usize {
    let missing = resolver.missing_assets();
    for path in &missing {
        tracing::warn!(font = %path.display(), "Startup: font asset missing, captions in this style will fail");
    }
    if missing.len() == FontSet::STYLES {
        tracing::error!(
            "Startup: no caption fonts installed, every /process_image request will fail until \
             the four font files are placed in FONTS_DIR (see fonts/README.md)"
        );
    }
    missing.len()
}

/// Wires the repository, scratch storage and compositor into the shared state.
pub fn build_state(config: &Config, pool: SqlitePool) -> Result<Arc<AppState>, AppError> {
    let http = reqwest::Client::builder()
        .timeout(config.source_fetch_timeout)
        .build()
        .map_err(|e| AppError::InitError(format!("Failed to build HTTP client: {}", e)))?;

    let file_storage = Arc::new(LocalFileStorage::new(config.scratch_dir.clone()));
    let fonts = Arc::new(FontResolver::new(config.fonts.clone()));
    let compositor = ImageCompositor::new(http, fonts, file_storage.clone());

    Ok(Arc::new(AppState {
        meme_repo: Arc::new(SqliteMemeRepository::new(pool)),
        file_storage,
        compositor,
        public_base_url: config.public_base_url.clone(),
    }))
}
