//! Static assets embedded in the binary from server/assets

use axum::body::Body;
use axum::extract::Path;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::Response;
use rust_embed::RustEmbed;

use super::types::ApiError;

#[derive(RustEmbed)]
#[folder = "assets"]
pub struct Assets;

// Asset names are not content-hashed, so browsers revalidate against the etag
const CACHE_REVALIDATE: &str = "public, max-age=0, must-revalidate";

pub async fn serve_static(Path(path): Path<String>, headers: HeaderMap) -> Result<Response, ApiError> {
    let path = path.trim_start_matches('/');
    let Some(file) = Assets::get(path) else {
        tracing::debug!(path, "Static asset not found");
        return Err(ApiError::not_found("ASSET_NOT_FOUND", format!("No asset at /static/{path}")));
    };

    let etag = format!("\"{}\"", hex::encode(file.metadata.sha256_hash()));
    let builder = Response::builder()
        .header(header::CACHE_CONTROL, CACHE_REVALIDATE)
        .header(header::ETAG, &etag);

    let not_modified = headers
        .get(header::IF_NONE_MATCH)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == etag);

    let response = if not_modified {
        builder.status(StatusCode::NOT_MODIFIED).body(Body::empty())
    } else {
        let mime = mime_guess::from_path(path).first_or_octet_stream();
        builder
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, mime.as_ref())
            .body(Body::from(file.data.into_owned()))
    };

    response.map_err(|e| ApiError::internal(format!("Failed to build asset response: {e}")))
}
