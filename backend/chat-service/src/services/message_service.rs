use serde::Deserialize;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::guards::GroupMember;
use crate::models::conversation::{
    direct_chat_id, group_chat_id, normalize_id, parse_chat_id, ChatTarget,
};
use crate::models::message::{AttachmentRef, HistoryCursor, MessageRecord};
use crate::services::storage;

const HISTORY_MAX_LIMIT: i64 = 200;
const HISTORY_DEFAULT_LIMIT: i64 = 50;

/// Everything a sender may supply. Exactly one of recipient/group_id/chat_id
/// has to identify the conversation; a client-supplied timestamp is not
/// accepted, the server clock is authoritative.
#[derive(Debug, Clone, Deserialize)]
pub struct SendMessageInput {
    pub recipient: Option<String>,
    pub group_id: Option<Uuid>,
    pub chat_id: Option<String>,
    pub body: Option<String>,
    pub attachment: Option<AttachmentRef>,
    pub timestamp: Option<String>,
}

/// Where a validated message goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget {
    pub chat_id: String,
    pub recipient: Option<String>,
    pub group_id: Option<Uuid>,
}

pub struct MessageService;

impl MessageService {
    /// Input checks that need no store access
    pub fn validate(input: &SendMessageInput) -> Result<(), AppError> {
        if input.recipient.is_none() && input.group_id.is_none() && input.chat_id.is_none() {
            return Err(AppError::Validation(
                "one of recipient, group_id or chat_id is required".into(),
            ));
        }
        if input.recipient.is_some() && input.group_id.is_some() {
            return Err(AppError::Validation(
                "recipient and group_id are mutually exclusive".into(),
            ));
        }

        let has_text = input
            .body
            .as_deref()
            .map(|b| !b.trim().is_empty())
            .unwrap_or(false);
        let has_attachment = input.attachment.is_some();
        // A message is text, an attachment, or both; never neither
        if !has_text && !has_attachment {
            return Err(AppError::Validation(
                "message requires text or an attachment".into(),
            ));
        }

        if let Some(attachment) = &input.attachment {
            storage::validate_object_key(&attachment.key)?;
        }

        Ok(())
    }

    /// Derive the conversation key for the input, exactly the way the query
    /// path derives it. A supplied chat_id must agree with the derived one
    /// and must involve the sender.
    pub async fn resolve_target(
        db: &Pool<Postgres>,
        sender: &str,
        input: &SendMessageInput,
    ) -> Result<ResolvedTarget, AppError> {
        let derived = if let Some(group_id) = input.group_id {
            GroupMember::verify(db, group_id, sender).await?;
            Some(ResolvedTarget {
                chat_id: group_chat_id(group_id),
                recipient: None,
                group_id: Some(group_id),
            })
        } else if let Some(recipient) = &input.recipient {
            let recipient = normalize_id(recipient);
            if recipient.is_empty() {
                return Err(AppError::Validation("recipient is required".into()));
            }
            Some(ResolvedTarget {
                chat_id: direct_chat_id(sender, &recipient),
                recipient: Some(recipient),
                group_id: None,
            })
        } else {
            None
        };

        match (&input.chat_id, derived) {
            (Some(supplied), Some(derived)) => {
                if supplied != &derived.chat_id {
                    return Err(AppError::Validation(
                        "chat_id does not match the supplied target".into(),
                    ));
                }
                Ok(derived)
            }
            (None, Some(derived)) => Ok(derived),
            (Some(supplied), None) => Self::resolve_chat_access(db, sender, supplied).await,
            (None, None) => Err(AppError::Validation(
                "one of recipient, group_id or chat_id is required".into(),
            )),
        }
    }

    /// An explicit chat id on its own: the caller must be a participant.
    /// Shared by the send path and the history path so both enforce the
    /// same access rule.
    pub async fn resolve_chat_access(
        db: &Pool<Postgres>,
        sender: &str,
        chat_id: &str,
    ) -> Result<ResolvedTarget, AppError> {
        match parse_chat_id(chat_id)? {
            ChatTarget::Direct { a, b } => {
                let recipient = if sender == a {
                    b
                } else if sender == b {
                    a
                } else {
                    return Err(AppError::Forbidden);
                };
                Ok(ResolvedTarget {
                    chat_id: direct_chat_id(sender, &recipient),
                    recipient: Some(recipient),
                    group_id: None,
                })
            }
            ChatTarget::Group(group_id) => {
                GroupMember::verify(db, group_id, sender).await?;
                Ok(ResolvedTarget {
                    chat_id: group_chat_id(group_id),
                    recipient: None,
                    group_id: Some(group_id),
                })
            }
        }
    }

    /// Persist one message and return the stored record. Single write, no
    /// fan-out; readers poll.
    pub async fn send(
        db: &Pool<Postgres>,
        sender: &str,
        input: &SendMessageInput,
    ) -> Result<MessageRecord, AppError> {
        Self::validate(input)?;
        if input.timestamp.is_some() {
            tracing::debug!(sender = %sender, "ignoring client-supplied timestamp");
        }

        let target = Self::resolve_target(db, sender, input).await?;
        let id = Uuid::new_v4();
        let body = input
            .body
            .as_deref()
            .map(str::trim)
            .filter(|b| !b.is_empty());
        let attachment = input.attachment.as_ref();

        let record = sqlx::query_as::<_, MessageRecord>(
            "INSERT INTO messages \
                 (id, chat_id, sender, recipient, group_id, body, \
                  attachment_url, attachment_key, attachment_content_type) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING id, chat_id, sender, recipient, group_id, body, \
                       attachment_url, attachment_key, attachment_content_type, created_at",
        )
        .bind(id)
        .bind(&target.chat_id)
        .bind(sender)
        .bind(&target.recipient)
        .bind(target.group_id)
        .bind(body)
        .bind(attachment.and_then(|a| a.url.as_deref()))
        .bind(attachment.map(|a| a.key.as_str()))
        .bind(attachment.and_then(|a| a.content_type.as_deref()))
        .fetch_one(db)
        .await?;

        tracing::debug!(message = %record.id, chat = %record.chat_id, "message stored");
        Ok(record)
    }

    /// Messages for one conversation, oldest first. Ordering is
    /// `(created_at, id)` so concurrent sends with equal timestamps page
    /// deterministically; the returned cursor continues after the last row.
    pub async fn history(
        db: &Pool<Postgres>,
        chat_id: &str,
        limit: Option<i64>,
        cursor: Option<HistoryCursor>,
    ) -> Result<(Vec<MessageRecord>, Option<String>), AppError> {
        let limit = limit.unwrap_or(HISTORY_DEFAULT_LIMIT).clamp(1, HISTORY_MAX_LIMIT);

        let rows = sqlx::query_as::<_, MessageRecord>(
            "SELECT id, chat_id, sender, recipient, group_id, body, \
                    attachment_url, attachment_key, attachment_content_type, created_at \
             FROM messages \
             WHERE chat_id = $1 \
               AND ($2::timestamptz IS NULL OR (created_at, id) > ($2::timestamptz, $3::uuid)) \
             ORDER BY created_at ASC, id ASC \
             LIMIT $4",
        )
        .bind(chat_id)
        .bind(cursor.as_ref().map(|c| c.created_at))
        .bind(cursor.as_ref().map(|c| c.id))
        .bind(limit + 1)
        .fetch_all(db)
        .await?;

        Ok(Self::paginate(rows, limit))
    }

    /// Administrative mode: every message across every conversation. Only
    /// reachable when the operator enabled it; see routes::messages.
    pub async fn history_unscoped(
        db: &Pool<Postgres>,
        limit: Option<i64>,
        cursor: Option<HistoryCursor>,
    ) -> Result<(Vec<MessageRecord>, Option<String>), AppError> {
        let limit = limit.unwrap_or(HISTORY_DEFAULT_LIMIT).clamp(1, HISTORY_MAX_LIMIT);

        let rows = sqlx::query_as::<_, MessageRecord>(
            "SELECT id, chat_id, sender, recipient, group_id, body, \
                    attachment_url, attachment_key, attachment_content_type, created_at \
             FROM messages \
             WHERE ($1::timestamptz IS NULL OR (created_at, id) > ($1::timestamptz, $2::uuid)) \
             ORDER BY created_at ASC, id ASC \
             LIMIT $3",
        )
        .bind(cursor.as_ref().map(|c| c.created_at))
        .bind(cursor.as_ref().map(|c| c.id))
        .bind(limit + 1)
        .fetch_all(db)
        .await?;

        Ok(Self::paginate(rows, limit))
    }

    fn paginate(
        mut rows: Vec<MessageRecord>,
        limit: i64,
    ) -> (Vec<MessageRecord>, Option<String>) {
        let has_more = rows.len() as i64 > limit;
        if has_more {
            rows.truncate(limit as usize);
        }
        let next_cursor = if has_more {
            rows.last().map(|last| {
                HistoryCursor {
                    created_at: last.created_at,
                    id: last.id,
                }
                .encode()
            })
        } else {
            None
        };
        (rows, next_cursor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn input(
        recipient: Option<&str>,
        group_id: Option<Uuid>,
        chat_id: Option<&str>,
        body: Option<&str>,
        attachment: Option<AttachmentRef>,
    ) -> SendMessageInput {
        SendMessageInput {
            recipient: recipient.map(String::from),
            group_id,
            chat_id: chat_id.map(String::from),
            body: body.map(String::from),
            attachment,
            timestamp: None,
        }
    }

    fn attachment() -> AttachmentRef {
        AttachmentRef {
            key: "uploads/2024-03-05/1709642445000-deadbeef-photo.png".into(),
            url: None,
            content_type: Some("image/png".into()),
        }
    }

    #[test]
    fn requires_some_target() {
        let err = MessageService::validate(&input(None, None, None, Some("hi"), None));
        assert!(matches!(err, Err(AppError::Validation(_))));
    }

    #[test]
    fn rejects_ambiguous_target() {
        let err = MessageService::validate(&input(
            Some("bob@example.com"),
            Some(Uuid::new_v4()),
            None,
            Some("hi"),
            None,
        ));
        assert!(matches!(err, Err(AppError::Validation(_))));
    }

    #[test]
    fn requires_text_or_attachment() {
        let err = MessageService::validate(&input(Some("bob@example.com"), None, None, None, None));
        assert!(matches!(err, Err(AppError::Validation(_))));

        let err = MessageService::validate(&input(
            Some("bob@example.com"),
            None,
            None,
            Some("   "),
            None,
        ));
        assert!(matches!(err, Err(AppError::Validation(_))));
    }

    #[test]
    fn attachment_only_message_is_valid() {
        let ok = MessageService::validate(&input(
            Some("bob@example.com"),
            None,
            None,
            None,
            Some(attachment()),
        ));
        assert!(ok.is_ok());
    }

    #[test]
    fn attachment_key_is_checked_for_traversal() {
        let bad = AttachmentRef {
            key: "uploads/../secrets".into(),
            url: None,
            content_type: None,
        };
        let err = MessageService::validate(&input(
            Some("bob@example.com"),
            None,
            None,
            None,
            Some(bad),
        ));
        assert!(matches!(err, Err(AppError::Validation(_))));
    }

    #[test]
    fn paginate_emits_cursor_only_when_more_rows_remain() {
        let make = |n: u32| MessageRecord {
            id: Uuid::new_v4(),
            chat_id: "DIRECT#a@x.com#b@x.com".into(),
            sender: "a@x.com".into(),
            recipient: Some("b@x.com".into()),
            group_id: None,
            body: Some(format!("m{n}")),
            attachment_url: None,
            attachment_key: None,
            attachment_content_type: None,
            created_at: Utc::now(),
        };

        let (page, cursor) = MessageService::paginate(vec![make(1), make(2), make(3)], 2);
        assert_eq!(page.len(), 2);
        let cursor = cursor.expect("cursor expected when a third row was fetched");
        let decoded = HistoryCursor::decode(&cursor).unwrap();
        assert_eq!(decoded.id, page[1].id);

        let (page, cursor) = MessageService::paginate(vec![make(1)], 2);
        assert_eq!(page.len(), 1);
        assert!(cursor.is_none());
    }
}
