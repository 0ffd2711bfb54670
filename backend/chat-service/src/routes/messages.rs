use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::middleware::guards::CurrentMember;
use crate::models::message::{HistoryCursor, MessageRecord};
use crate::routes::{ok, Envelope};
use crate::services::message_service::{MessageService, SendMessageInput};
use crate::services::read_state_service::{ReadStateService, UnreadCount};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct SendMessageResponse {
    pub message: MessageRecord,
}

/// POST /messages
pub async fn send_message(
    State(state): State<AppState>,
    member: CurrentMember,
    Json(body): Json<SendMessageInput>,
) -> Result<(StatusCode, Json<Envelope<SendMessageResponse>>), AppError> {
    let message = MessageService::send(&state.db, &member.id, &body).await?;
    Ok((StatusCode::CREATED, ok(SendMessageResponse { message })))
}

#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    pub chat_id: Option<String>,
    pub limit: Option<i64>,
    pub cursor: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub messages: Vec<MessageRecord>,
    pub next_cursor: Option<String>,
}

/// GET /messages?chat_id=...&limit=...&cursor=...
///
/// Without a chat id the request is rejected unless the operator switched on
/// the unscoped administrative mode.
pub async fn get_messages(
    State(state): State<AppState>,
    member: CurrentMember,
    Query(params): Query<HistoryParams>,
) -> Result<Json<Envelope<HistoryResponse>>, AppError> {
    let cursor = params
        .cursor
        .as_deref()
        .map(HistoryCursor::decode)
        .transpose()?;

    let (messages, next_cursor) = match &params.chat_id {
        Some(chat_id) => {
            let target = MessageService::resolve_chat_access(&state.db, &member.id, chat_id).await?;
            MessageService::history(&state.db, &target.chat_id, params.limit, cursor).await?
        }
        None => {
            if !state.config.allow_unscoped_history {
                return Err(AppError::Validation("chat_id is required".into()));
            }
            tracing::warn!(member = %member.id, "serving unscoped message history");
            MessageService::history_unscoped(&state.db, params.limit, cursor).await?
        }
    };

    Ok(ok(HistoryResponse {
        messages,
        next_cursor,
    }))
}

#[derive(Debug, Deserialize)]
pub struct MarkReadRequest {
    pub chat_id: String,
}

#[derive(Debug, Serialize)]
pub struct MarkReadResponse {
    pub chat_id: String,
}

/// POST /messages/mark-read
pub async fn mark_read(
    State(state): State<AppState>,
    member: CurrentMember,
    Json(body): Json<MarkReadRequest>,
) -> Result<Json<Envelope<MarkReadResponse>>, AppError> {
    ReadStateService::mark_read(&state.db, &member.id, &body.chat_id).await?;
    Ok(ok(MarkReadResponse {
        chat_id: body.chat_id,
    }))
}

#[derive(Debug, Serialize)]
pub struct UnreadCountsResponse {
    pub counts: Vec<UnreadCount>,
}

/// GET /messages/unread-counts
pub async fn unread_counts(
    State(state): State<AppState>,
    member: CurrentMember,
) -> Result<Json<Envelope<UnreadCountsResponse>>, AppError> {
    let counts = ReadStateService::unread_counts(&state.db, &member.id).await?;
    Ok(ok(UnreadCountsResponse { counts }))
}
