use serde::Serialize;
use sqlx::{Pool, Postgres};

use crate::error::AppError;
use crate::models::conversation::parse_chat_id;

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct UnreadCount {
    pub chat_id: String,
    pub unread: i64,
}

pub struct ReadStateService;

impl ReadStateService {
    /// Record that the member has seen the conversation up to now
    pub async fn mark_read(
        db: &Pool<Postgres>,
        member_id: &str,
        chat_id: &str,
    ) -> Result<(), AppError> {
        // Only keys this service could have produced
        parse_chat_id(chat_id)?;

        sqlx::query(
            "INSERT INTO read_positions (member_id, chat_id, last_read_at) \
             VALUES ($1, $2, now()) \
             ON CONFLICT (member_id, chat_id) DO UPDATE SET last_read_at = EXCLUDED.last_read_at",
        )
        .bind(member_id)
        .bind(chat_id)
        .execute(db)
        .await?;

        Ok(())
    }

    /// Unread message count per conversation the member participates in.
    /// Direct chats count messages addressed to the member; group chats
    /// count messages in groups the member belongs to. Own messages never
    /// count as unread.
    pub async fn unread_counts(
        db: &Pool<Postgres>,
        member_id: &str,
    ) -> Result<Vec<UnreadCount>, AppError> {
        let counts = sqlx::query_as::<_, UnreadCount>(
            "SELECT m.chat_id, COUNT(*) AS unread \
             FROM messages m \
             LEFT JOIN read_positions r \
               ON r.member_id = $1 AND r.chat_id = m.chat_id \
             WHERE m.sender <> $1 \
               AND (\
                   m.recipient = $1 \
                   OR m.group_id IN (\
                       SELECT group_id FROM group_members WHERE member_id = $1\
                   )\
               ) \
               AND m.created_at > COALESCE(r.last_read_at, 'epoch'::timestamptz) \
             GROUP BY m.chat_id \
             ORDER BY m.chat_id",
        )
        .bind(member_id)
        .fetch_all(db)
        .await?;

        Ok(counts)
    }
}
