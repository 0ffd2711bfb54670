use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres};

use crate::error::AppError;
use crate::models::schedule::{WorkSchedule, WorkScheduleRecord};

pub struct ScheduleService;

impl ScheduleService {
    pub async fn get(
        db: &Pool<Postgres>,
        member_id: &str,
    ) -> Result<Option<WorkScheduleRecord>, AppError> {
        let row = sqlx::query_as::<_, (serde_json::Value, DateTime<Utc>)>(
            "SELECT schedule, updated_at FROM work_schedules WHERE member_id = $1",
        )
        .bind(member_id)
        .fetch_optional(db)
        .await?;

        let Some((value, updated_at)) = row else {
            return Ok(None);
        };

        let schedule: WorkSchedule = serde_json::from_value(value).map_err(|e| {
            tracing::error!(member = %member_id, error = %e, "stored schedule is malformed");
            AppError::Internal
        })?;

        Ok(Some(WorkScheduleRecord {
            member_id: member_id.to_string(),
            schedule,
            updated_at,
        }))
    }

    pub async fn put(
        db: &Pool<Postgres>,
        member_id: &str,
        schedule: WorkSchedule,
    ) -> Result<WorkScheduleRecord, AppError> {
        schedule.validate()?;

        let value = serde_json::to_value(&schedule).map_err(|e| {
            tracing::error!(error = %e, "failed to serialize schedule");
            AppError::Internal
        })?;

        let (updated_at,) = sqlx::query_as::<_, (DateTime<Utc>,)>(
            "INSERT INTO work_schedules (member_id, schedule, updated_at) \
             VALUES ($1, $2, now()) \
             ON CONFLICT (member_id) DO UPDATE \
                 SET schedule = EXCLUDED.schedule, updated_at = now() \
             RETURNING updated_at",
        )
        .bind(member_id)
        .bind(&value)
        .fetch_one(db)
        .await?;

        Ok(WorkScheduleRecord {
            member_id: member_id.to_string(),
            schedule,
            updated_at,
        })
    }
}
