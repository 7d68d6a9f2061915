use crate::{handlers, AppState};
use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Creates the Axum router and associates routes with handlers.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/process_image", post(handlers::process_image))
        .route("/cdn/{filename}", get(handlers::serve_file))
        .route("/storeapi", post(handlers::store_meme))
        .route("/api/get_all", get(handlers::list_memes))
        .route("/api/get/{id}", get(handlers::get_meme))
        .route("/api/delete/{id}", delete(handlers::delete_meme))
        // Middleware Layers
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(1024 * 1024))
        .with_state(state)
}
