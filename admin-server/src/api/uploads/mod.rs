//! Upload Routes
//!
//! Serves images stored by the item and user forms. Public, so the storefront
//! can show them.

use axum::{
    Router,
    body::Bytes,
    extract::{Path, State},
    response::{IntoResponse, Response},
    routing::get,
};
use http::{StatusCode, header};

use crate::core::ServerState;
use crate::utils::AppResult;

/// Build upload router
pub fn router() -> Router<ServerState> {
    Router::new().route("/uploads/{filename}", get(serve_uploaded_file))
}

/// Serve uploaded file handler
async fn serve_uploaded_file(
    State(state): State<ServerState>,
    Path(filename): Path<String>,
) -> AppResult<Response> {
    // path traversal is rejected by the store
    let Some(content) = state.images.read(&filename).await? else {
        tracing::debug!(filename = %filename, "Uploaded file not found");
        return Ok((StatusCode::NOT_FOUND, "File not found").into_response());
    };

    let mime = mime_guess::from_path(&filename).first_or_octet_stream();
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, mime.essence_str().to_string()),
            (header::CACHE_CONTROL, "public, max-age=31536000, immutable".to_string()),
        ],
        Bytes::from(content),
    )
        .into_response())
}
