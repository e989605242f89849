//! Message endpoints

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::db::repos::{Message, MessageRepo};
use crate::http::envelope::Envelope;
use crate::http::error::ApiError;
use crate::http::extractors::{ClientIp, ValidMessageId};
use crate::http::server::AppState;
use crate::models::{MessageContent, Nickname, ValidationError};

/// Create message request.
///
/// Fields are loose JSON so a non-string `content` is reported as empty
/// content and a non-string `nickname` falls back to the default. An
/// unreadable body is treated as one with no content.
#[derive(Debug, Deserialize)]
pub struct CreateMessageRequest {
    #[serde(default)]
    pub content: Option<Value>,
    #[serde(default)]
    pub nickname: Option<Value>,
}

/// Message as returned by the API
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub id: i64,
    pub content: String,
    pub nickname: String,
    pub likes: i64,
    /// Server-local `YYYY-MM-DD HH:MM:SS`
    pub time: String,
}

impl From<Message> for MessageResponse {
    fn from(m: Message) -> Self {
        let time = m.local_time();
        Self {
            id: m.id,
            content: m.content,
            nickname: m.nickname,
            likes: m.likes,
            time,
        }
    }
}

/// Payload for a successful delete
#[derive(Debug, Serialize)]
pub struct DeletedMessage {
    pub id: i64,
}

/// GET /api/messages - all messages, newest first
async fn list_messages(
    State(state): State<Arc<AppState>>,
) -> Result<Envelope<Vec<MessageResponse>>, ApiError> {
    let messages = MessageRepo::new(&state.pool).list_all().await?;
    tracing::info!(count = messages.len(), "listed messages");

    let items = messages.into_iter().map(MessageResponse::from).collect();
    Ok(Envelope::ok(items, "messages retrieved"))
}

/// POST /api/messages - post a new message
async fn create_message(
    State(state): State<Arc<AppState>>,
    ClientIp(ip): ClientIp,
    body: Result<Json<CreateMessageRequest>, JsonRejection>,
) -> Result<(StatusCode, Envelope<MessageResponse>), ApiError> {
    let Json(req) = body.map_err(|rejection| {
        tracing::debug!(%rejection, "unreadable create body");
        ValidationError::Empty {
            field: "message content",
        }
    })?;

    let content = MessageContent::new(req.content.as_ref().and_then(Value::as_str).unwrap_or(""))?;
    let nickname = Nickname::from_input(req.nickname.as_ref().and_then(Value::as_str));

    let message = MessageRepo::new(&state.pool)
        .insert(&content, &nickname, Some(ip.as_str()))
        .await?;

    tracing::info!(id = message.id, nickname = %message.nickname, "message posted");
    Ok((
        StatusCode::CREATED,
        Envelope::ok(MessageResponse::from(message), "message posted"),
    ))
}

/// GET /api/messages/{id} - fetch one message
async fn get_message(
    State(state): State<Arc<AppState>>,
    ValidMessageId(id): ValidMessageId,
) -> Result<Envelope<MessageResponse>, ApiError> {
    let message = MessageRepo::new(&state.pool)
        .get_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("message", id))?;

    Ok(Envelope::ok(MessageResponse::from(message), "message retrieved"))
}

/// DELETE /api/messages/{id} - permanently delete a message
async fn delete_message(
    State(state): State<Arc<AppState>>,
    ValidMessageId(id): ValidMessageId,
) -> Result<Envelope<DeletedMessage>, ApiError> {
    let repo = MessageRepo::new(&state.pool);

    // Check first so "already gone" stays a 404 rather than a failed delete
    if repo.get_by_id(id).await?.is_none() {
        return Err(ApiError::not_found("message", id));
    }

    if !repo.delete(id).await? {
        // Removed by a concurrent request between the check and the delete
        return Err(ApiError::not_found("message", id));
    }

    tracing::info!(id = id.get(), "message deleted");
    Ok(Envelope::ok(DeletedMessage { id: id.get() }, "message deleted"))
}

/// PUT /api/messages/{id}/like - add one like
async fn like_message(
    State(state): State<Arc<AppState>>,
    ValidMessageId(id): ValidMessageId,
) -> Result<Envelope<MessageResponse>, ApiError> {
    let message = MessageRepo::new(&state.pool).increment_likes(id).await?;

    tracing::info!(id = message.id, likes = message.likes, "message liked");
    Ok(Envelope::ok(MessageResponse::from(message), "message liked"))
}

/// Message routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/messages", get(list_messages).post(create_message))
        .route("/api/messages/{id}", get(get_message).delete(delete_message))
        .route("/api/messages/{id}/like", put(like_message))
}
