use chrono::{SecondsFormat, Utc};

use crate::error::AppError;
use crate::redis_client::RedisClient;

const TYPING_PREFIX: &str = "typing:";

fn typing_key(chat_id: &str, member_id: &str) -> String {
    format!("{TYPING_PREFIX}{chat_id}:{member_id}")
}

/// Ephemeral composition signals. Every start carries a TTL, so a client
/// that crashes mid-composition stops "typing" once the key expires; no
/// reaper is needed.
pub struct TypingService;

impl TypingService {
    pub async fn start(
        redis: &RedisClient,
        chat_id: &str,
        member_id: &str,
        ttl_seconds: u64,
    ) -> Result<(), AppError> {
        let started_at = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
        redis
            .set_ex(&typing_key(chat_id, member_id), &started_at, ttl_seconds)
            .await?;
        Ok(())
    }

    pub async fn stop(
        redis: &RedisClient,
        chat_id: &str,
        member_id: &str,
    ) -> Result<(), AppError> {
        redis.del(&typing_key(chat_id, member_id)).await?;
        Ok(())
    }

    /// Member ids currently typing in the conversation
    pub async fn active(redis: &RedisClient, chat_id: &str) -> Result<Vec<String>, AppError> {
        let prefix = format!("{TYPING_PREFIX}{chat_id}:");
        let keys = redis.scan_match(&format!("{prefix}*")).await?;
        let mut members: Vec<String> = keys
            .into_iter()
            .filter_map(|key| key.strip_prefix(&prefix).map(|m| m.to_string()))
            .collect();
        members.sort();
        Ok(members)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typing_key_scopes_by_chat_and_member() {
        assert_eq!(
            typing_key("DIRECT#a@x.com#b@x.com", "a@x.com"),
            "typing:DIRECT#a@x.com#b@x.com:a@x.com"
        );
    }
}
