use axum::{extract::State, Json};
use serde::Serialize;

use crate::error::AppError;
use crate::middleware::guards::CurrentMember;
use crate::models::member::MemberProfile;
use crate::routes::{ok, Envelope};
use crate::services::member_service::MemberService;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct MembersResponse {
    pub members: Vec<MemberProfile>,
    pub count: usize,
}

/// GET /members
pub async fn list_members(
    State(state): State<AppState>,
    _member: CurrentMember,
) -> Result<Json<Envelope<MembersResponse>>, AppError> {
    let members = MemberService::list(&state.db, &state.redis).await?;
    let count = members.len();
    Ok(ok(MembersResponse { members, count }))
}
