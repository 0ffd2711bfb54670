use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::guards::CurrentMember;
use crate::models::group::Group;
use crate::routes::{ok, Envelope};
use crate::services::group_service::GroupService;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateGroupRequest {
    pub name: String,
    #[serde(default)]
    pub member_ids: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct GroupResponse {
    pub group: Group,
}

/// POST /groups
pub async fn create_group(
    State(state): State<AppState>,
    member: CurrentMember,
    Json(body): Json<CreateGroupRequest>,
) -> Result<(StatusCode, Json<Envelope<GroupResponse>>), AppError> {
    let group = GroupService::create(&state.db, &member.id, &body.name, body.member_ids).await?;
    Ok((StatusCode::CREATED, ok(GroupResponse { group })))
}

#[derive(Debug, Deserialize)]
pub struct ListGroupsParams {
    pub member: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GroupsResponse {
    pub groups: Vec<Group>,
    pub count: usize,
}

/// GET /groups?member=...
pub async fn list_groups(
    State(state): State<AppState>,
    _member: CurrentMember,
    Query(params): Query<ListGroupsParams>,
) -> Result<Json<Envelope<GroupsResponse>>, AppError> {
    let groups = GroupService::list(&state.db, params.member.as_deref()).await?;
    let count = groups.len();
    Ok(ok(GroupsResponse { groups, count }))
}

#[derive(Debug, Deserialize)]
pub struct AddMemberRequest {
    pub member_id: String,
}

/// PUT /groups/{id}/members
pub async fn add_member(
    State(state): State<AppState>,
    _member: CurrentMember,
    Path(group_id): Path<Uuid>,
    Json(body): Json<AddMemberRequest>,
) -> Result<Json<Envelope<GroupResponse>>, AppError> {
    let group = GroupService::add_member(&state.db, group_id, &body.member_id).await?;
    Ok(ok(GroupResponse { group }))
}

/// DELETE /groups/{id}/members/{member_id}
pub async fn remove_member(
    State(state): State<AppState>,
    _member: CurrentMember,
    Path((group_id, member_id)): Path<(Uuid, String)>,
) -> Result<Json<Envelope<GroupResponse>>, AppError> {
    let group = GroupService::remove_member(&state.db, group_id, &member_id).await?;
    Ok(ok(GroupResponse { group }))
}

#[derive(Debug, Serialize)]
pub struct DeleteGroupResponse {
    pub id: Uuid,
}

/// DELETE /groups/{id}
pub async fn delete_group(
    State(state): State<AppState>,
    _member: CurrentMember,
    Path(group_id): Path<Uuid>,
) -> Result<Json<Envelope<DeleteGroupResponse>>, AppError> {
    GroupService::delete(&state.db, group_id).await?;
    Ok(ok(DeleteGroupResponse { id: group_id }))
}
