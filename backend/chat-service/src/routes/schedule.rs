use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::middleware::guards::CurrentMember;
use crate::models::conversation::normalize_id;
use crate::models::schedule::{WorkSchedule, WorkScheduleRecord};
use crate::routes::{ok, Envelope};
use crate::services::schedule_service::ScheduleService;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ScheduleParams {
    pub member: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ScheduleResponse {
    pub schedule: WorkScheduleRecord,
}

/// GET /work-schedule?member=...
///
/// Defaults to the caller's own schedule.
pub async fn get_work_schedule(
    State(state): State<AppState>,
    member: CurrentMember,
    Query(params): Query<ScheduleParams>,
) -> Result<Json<Envelope<ScheduleResponse>>, AppError> {
    let member_id = params
        .member
        .as_deref()
        .map(normalize_id)
        .unwrap_or(member.id);

    let record = ScheduleService::get(&state.db, &member_id)
        .await?
        .ok_or(AppError::NotFound("work schedule"))?;

    Ok(ok(ScheduleResponse { schedule: record }))
}

/// PUT /work-schedule
///
/// Members can only write their own schedule.
pub async fn put_work_schedule(
    State(state): State<AppState>,
    member: CurrentMember,
    Json(body): Json<WorkSchedule>,
) -> Result<Json<Envelope<ScheduleResponse>>, AppError> {
    let record = ScheduleService::put(&state.db, &member.id, body).await?;
    Ok(ok(ScheduleResponse { schedule: record }))
}
