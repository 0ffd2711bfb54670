use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::middleware::guards::CurrentMember;
use crate::models::conversation::parse_chat_id;
use crate::routes::{ok, Envelope};
use crate::services::typing_service::TypingService;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct TypingRequest {
    pub chat_id: String,
}

#[derive(Debug, Serialize)]
pub struct TypingAck {
    pub chat_id: String,
    pub member_id: String,
    pub typing: bool,
}

/// POST /typing/start
pub async fn start_typing(
    State(state): State<AppState>,
    member: CurrentMember,
    Json(body): Json<TypingRequest>,
) -> Result<Json<Envelope<TypingAck>>, AppError> {
    parse_chat_id(&body.chat_id)?;
    TypingService::start(
        &state.redis,
        &body.chat_id,
        &member.id,
        state.config.typing_ttl_seconds,
    )
    .await?;
    Ok(ok(TypingAck {
        chat_id: body.chat_id,
        member_id: member.id,
        typing: true,
    }))
}

/// POST /typing/stop
pub async fn stop_typing(
    State(state): State<AppState>,
    member: CurrentMember,
    Json(body): Json<TypingRequest>,
) -> Result<Json<Envelope<TypingAck>>, AppError> {
    parse_chat_id(&body.chat_id)?;
    TypingService::stop(&state.redis, &body.chat_id, &member.id).await?;
    Ok(ok(TypingAck {
        chat_id: body.chat_id,
        member_id: member.id,
        typing: false,
    }))
}

#[derive(Debug, Deserialize)]
pub struct ListTypingParams {
    pub chat_id: String,
}

#[derive(Debug, Serialize)]
pub struct TypingListResponse {
    pub chat_id: String,
    pub typing: Vec<String>,
}

/// GET /typing?chat_id=...
pub async fn list_typing(
    State(state): State<AppState>,
    _member: CurrentMember,
    Query(params): Query<ListTypingParams>,
) -> Result<Json<Envelope<TypingListResponse>>, AppError> {
    parse_chat_id(&params.chat_id)?;
    let typing = TypingService::active(&state.redis, &params.chat_id).await?;
    Ok(ok(TypingListResponse {
        chat_id: params.chat_id,
        typing,
    }))
}
