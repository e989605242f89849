//! Catch-all for unmatched routes

use axum::extract::OriginalUri;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

/// Fallback handler: 404 with the requested path echoed back
pub async fn not_found(OriginalUri(uri): OriginalUri) -> impl IntoResponse {
    let path = uri
        .path_and_query()
        .map(|pq| pq.as_str().to_owned())
        .unwrap_or_else(|| uri.path().to_owned());

    tracing::debug!(%path, "no route");
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "success": false,
            "message": "endpoint not found",
            "path": path
        })),
    )
}
