use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use sqlx::{Pool, Postgres};

use crate::error::AppError;
use crate::redis_client::RedisClient;

const PRESENCE_PREFIX: &str = "presence:";

#[derive(Debug, Serialize)]
pub struct PresenceEntry {
    pub member_id: String,
    pub online: bool,
    pub last_active_at: Option<DateTime<Utc>>,
}

fn presence_key(member_id: &str) -> String {
    format!("{PRESENCE_PREFIX}{member_id}")
}

/// Server-side liveness. Clients heartbeat while open; the key's TTL turns a
/// silent client offline without any cleanup pass.
pub struct PresenceService;

impl PresenceService {
    pub async fn heartbeat(
        db: &Pool<Postgres>,
        redis: &RedisClient,
        member_id: &str,
        ttl_seconds: u64,
    ) -> Result<(), AppError> {
        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
        redis
            .set_ex(&presence_key(member_id), &now, ttl_seconds)
            .await?;

        sqlx::query("UPDATE members SET last_active_at = now() WHERE id = $1")
            .bind(member_id)
            .execute(db)
            .await?;

        Ok(())
    }

    /// Online flags for the given ids, in input order
    pub async fn online_flags(
        redis: &RedisClient,
        member_ids: &[String],
    ) -> Result<Vec<bool>, AppError> {
        let keys: Vec<String> = member_ids.iter().map(|id| presence_key(id)).collect();
        let values = redis.mget(&keys).await?;
        Ok(values.into_iter().map(|v| v.is_some()).collect())
    }

    /// Presence plus last-seen for the given ids
    pub async fn snapshot(
        db: &Pool<Postgres>,
        redis: &RedisClient,
        member_ids: &[String],
    ) -> Result<Vec<PresenceEntry>, AppError> {
        let online = Self::online_flags(redis, member_ids).await?;

        let rows = sqlx::query_as::<_, (String, Option<DateTime<Utc>>)>(
            "SELECT id, last_active_at FROM members WHERE id = ANY($1)",
        )
        .bind(member_ids)
        .fetch_all(db)
        .await?;

        let last_seen: std::collections::HashMap<String, Option<DateTime<Utc>>> =
            rows.into_iter().collect();

        Ok(member_ids
            .iter()
            .zip(online)
            .map(|(id, online)| PresenceEntry {
                member_id: id.clone(),
                online,
                last_active_at: last_seen.get(id).copied().flatten(),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presence_key_is_namespaced() {
        assert_eq!(presence_key("alice@example.com"), "presence:alice@example.com");
    }
}
