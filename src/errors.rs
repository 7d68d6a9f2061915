use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

// --- Domain/Infrastructure Errors ---

#[derive(Error, Debug)]
pub enum RepoError {
    #[error("Meme record not found with ID: {0}")]
    NotFound(i64),

    #[error("Database backend error: {0:#}")]
    BackendError(#[from] anyhow::Error),
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid file name: {0}")]
    InvalidName(String),

    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum RenderError {
    /// Upstream image unavailable, or its bytes are not an image.
    #[error("Failed to fetch source image: {0}")]
    SourceFetch(String),

    /// Missing font asset, invalid font size or unparseable color.
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Image processing failed: {0}")]
    Processing(String),

    #[error("Could not store rendered image: {0}")]
    Storage(#[from] StorageError),
}

// --- Web Layer Error ---

#[derive(Error, Debug)]
pub enum AppError {
    // Request parsing errors
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // Lookups
    #[error("Meme record not found with ID: {0}")]
    RecordNotFound(i64),
    #[error("File not found: {0}")]
    FileNotFound(String),

    // Domain/Service level errors
    #[error("Could not access meme records")]
    RepositoryError(#[source] RepoError),
    #[error("Could not perform file storage operation")]
    StorageError(#[source] StorageError),
    #[error("Could not render image")]
    RenderError(#[source] RenderError),

    // Configuration / Startup errors
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Initialization error: {0}")]
    InitError(String),

    #[error("Internal server error: {0}")]
    InternalServerError(String),
}

// --- Conversions from Domain Errors to AppError ---

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(id) => AppError::RecordNotFound(id),
            e @ RepoError::BackendError(_) => AppError::RepositoryError(e),
        }
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(name) | StorageError::InvalidName(name) => {
                AppError::FileNotFound(name)
            }
            e @ StorageError::Io(_) => AppError::StorageError(e),
        }
    }
}

impl From<RenderError> for AppError {
    fn from(err: RenderError) -> Self {
        AppError::RenderError(err)
    }
}

impl From<crate::config::ConfigError> for AppError {
    fn from(err: crate::config::ConfigError) -> Self {
        AppError::ConfigError(err.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidInput(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::InvalidInput(rejection.body_text())
    }
}

// --- Axum Response Implementation ---

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            // Lookups keep the record API's `{status, message}` envelope.
            AppError::RecordNotFound(id) => {
                tracing::warn!(record_id = %id, "Meme record not found");
                return not_found("Data not found");
            }
            AppError::FileNotFound(name) => {
                tracing::warn!(filename = %name, "Scratch file not found");
                return not_found("File not found");
            }

            AppError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg.clone()),

            AppError::RepositoryError(e) => {
                tracing::error!(error.source = ?e, "Repository error occurred");
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
            AppError::StorageError(e) => {
                tracing::error!(error.source = ?e, "Storage error occurred");
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
            AppError::RenderError(e) => {
                tracing::error!(error.source = ?e, "Render error occurred");
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
            AppError::ConfigError(msg) => {
                tracing::error!("Configuration error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Server configuration error".to_string())
            }
            AppError::InitError(msg) => {
                tracing::error!("Initialization error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Server initialization error".to_string())
            }
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal server error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg.clone())
            }
        };

        tracing::error!(error.message = %error_message, error.status = %status, "Responding with error");

        let body = Json(serde_json::json!({ "error": error_message }));
        (status, body).into_response()
    }
}

fn not_found(message: &str) -> Response {
    let body = Json(serde_json::json!({ "status": "error", "message": message }));
    (StatusCode::NOT_FOUND, body).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn record_not_found_uses_status_envelope() {
        let response = AppError::from(RepoError::NotFound(7)).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let json = body_json(response).await;
        assert_eq!(json["status"], "error");
        assert_eq!(json["message"], "Data not found");
    }

    #[tokio::test]
    async fn render_failure_carries_underlying_message() {
        let err = RenderError::SourceFetch("connection refused".into());
        let response = AppError::from(err).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let json = body_json(response).await;
        let message = json["error"].as_str().unwrap();
        assert!(message.contains("connection refused"), "{message}");
    }

    #[test]
    fn invalid_file_names_map_to_not_found() {
        let err = AppError::from(StorageError::InvalidName("../secret".into()));
        assert!(matches!(err, AppError::FileNotFound(_)));
    }
}
