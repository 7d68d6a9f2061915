use crate::{
    errors::AppError,
    models::{DataResponse, MessageResponse, NewMeme, ProcessImageResponse, RenderRequest},
    AppState,
};
use axum::{
    body::Body,
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::{header, HeaderMap, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

/// Handler for POST /process_image
pub async fn process_image(
    State(state): State<Arc<AppState>>,
    uri: Uri,
    headers: HeaderMap,
    payload: Result<Json<RenderRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(request) = payload?;
    tracing::debug!(source = %request.image_url, font_size = request.font_size, "Processing image");

    let artifact = state.compositor.render(&request).await?;
    let base = base_url(state.public_base_url.as_deref(), &headers, &uri);
    let img = format!("{}{}", base, artifact.cdn_path());

    Ok(Json(ProcessImageResponse {
        status: "success",
        img,
    }))
}

/// Handler for GET /cdn/{filename}
pub async fn serve_file(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> Result<Response, AppError> {
    tracing::debug!(filename = %filename, "Serving scratch file");

    let data = state.file_storage.read(&filename).await?;

    let content_type = mime_guess::from_path(&filename)
        .first_raw()
        .unwrap_or("application/octet-stream");

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .body(Body::from(data))
        .map_err(|e| AppError::InternalServerError(format!("Failed to build file response: {}", e)))?;

    Ok(response)
}

/// Handler for POST /storeapi
pub async fn store_meme(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<NewMeme>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(new_meme) = payload?;
    let record = state.meme_repo.insert(&new_meme).await?;
    tracing::info!(record_id = record.id, "Meme record stored");
    Ok(Json(DataResponse::success(record)))
}

/// Handler for GET /api/get_all
pub async fn list_memes(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, AppError> {
    let records = state.meme_repo.list_all().await?;
    tracing::debug!("Handler retrieved {} meme records", records.len());
    Ok(Json(DataResponse::success(records)))
}

/// Handler for GET /api/get/{id}
pub async fn get_meme(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path(id) = id?;
    let record = state.meme_repo.get_by_id(id).await?;
    Ok(Json(DataResponse::success(record)))
}

/// Handler for DELETE /api/delete/{id}
pub async fn delete_meme(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path(id) = id?;
    state.meme_repo.delete_by_id(id).await?;
    tracing::info!(record_id = id, "Meme record deleted");
    Ok(Json(MessageResponse {
        status: "success",
        message: "Data deleted successfully",
    }))
}

// Scheme and host the client reached us on, unless a public base URL is configured.
// HTTP/2 requests carry the host in the URI authority rather than a Host header.
fn base_url(public_base_url: Option<&str>, headers: &HeaderMap, uri: &Uri) -> String {
    if let Some(base) = public_base_url {
        return base.to_string();
    }
    let host = headers
        .get(header::HOST)
        .and_then(|value| value.to_str().ok())
        .or_else(|| uri.authority().map(|authority| authority.as_str()))
        .unwrap_or("localhost");
    let scheme = headers
        .get("x-forwarded-proto")
        .and_then(|value| value.to_str().ok())
        .or_else(|| uri.scheme_str())
        .unwrap_or("http");
    format!("{}://{}", scheme, host)
}
