//! API root: server name, version and endpoint map

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::db::repos::MessageRepo;
use crate::http::envelope::now_rfc3339;
use crate::http::error::ApiError;
use crate::http::server::AppState;

#[derive(Serialize)]
pub struct ApiInfo {
    pub name: &'static str,
    pub version: &'static str,
    pub description: &'static str,
    pub status: &'static str,
    pub message_count: i64,
    pub endpoints: BTreeMap<&'static str, &'static str>,
    pub timestamp: String,
}

/// GET /api
async fn info(State(state): State<Arc<AppState>>) -> Result<Json<ApiInfo>, ApiError> {
    let message_count = MessageRepo::new(&state.pool).count().await?;

    let endpoints = BTreeMap::from([
        ("GET /api/messages", "list all messages, newest first"),
        ("POST /api/messages", "post a new message"),
        ("GET /api/messages/{id}", "fetch one message"),
        ("DELETE /api/messages/{id}", "delete a message"),
        ("PUT /api/messages/{id}/like", "like a message"),
        ("GET /health", "liveness check"),
    ]);

    Ok(Json(ApiInfo {
        name: "Treehole API",
        version: env!("CARGO_PKG_VERSION"),
        description: "Anonymous class message board over SQLite",
        status: "running",
        message_count,
        endpoints,
        timestamp: now_rfc3339(),
    }))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/api", get(info))
}
