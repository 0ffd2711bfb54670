use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::middleware::guards::CurrentMember;
use crate::models::conversation::normalize_id;
use crate::routes::{ok, Envelope};
use crate::services::presence_service::{PresenceEntry, PresenceService};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HeartbeatResponse {
    pub member_id: String,
    pub ttl_seconds: u64,
}

/// POST /presence/heartbeat
///
/// Clients call this while open; going silent lets the TTL mark them
/// offline.
pub async fn heartbeat(
    State(state): State<AppState>,
    member: CurrentMember,
) -> Result<Json<Envelope<HeartbeatResponse>>, AppError> {
    PresenceService::heartbeat(
        &state.db,
        &state.redis,
        &member.id,
        state.config.presence_ttl_seconds,
    )
    .await?;
    Ok(ok(HeartbeatResponse {
        member_id: member.id,
        ttl_seconds: state.config.presence_ttl_seconds,
    }))
}

#[derive(Debug, Deserialize)]
pub struct PresenceParams {
    /// Comma-separated member ids
    pub members: String,
}

#[derive(Debug, Serialize)]
pub struct PresenceResponse {
    pub presence: Vec<PresenceEntry>,
}

/// GET /presence?members=a@x.com,b@x.com
pub async fn presence_snapshot(
    State(state): State<AppState>,
    _member: CurrentMember,
    Query(params): Query<PresenceParams>,
) -> Result<Json<Envelope<PresenceResponse>>, AppError> {
    let ids: Vec<String> = params
        .members
        .split(',')
        .map(normalize_id)
        .filter(|id| !id.is_empty())
        .collect();
    if ids.is_empty() {
        return Err(AppError::Validation("members is required".into()));
    }

    let presence = PresenceService::snapshot(&state.db, &state.redis, &ids).await?;
    Ok(ok(PresenceResponse { presence }))
}
