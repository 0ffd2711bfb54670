use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::AppError;

/// A persisted message. Immutable once created; `created_at` is both the
/// sort key and the display time.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct MessageRecord {
    pub id: Uuid,
    pub chat_id: String,
    pub sender: String,
    pub recipient: Option<String>,
    pub group_id: Option<Uuid>,
    pub body: Option<String>,
    pub attachment_url: Option<String>,
    pub attachment_key: Option<String>,
    pub attachment_content_type: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Attachment reference carried by a message; the payload itself lives in
/// the object store
#[derive(Debug, Clone, Deserialize)]
pub struct AttachmentRef {
    pub key: String,
    pub url: Option<String>,
    pub content_type: Option<String>,
}

/// Opaque continuation token for history paging. Encodes the position of the
/// last row returned; ordering (and therefore the cursor) ties break on the
/// message id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryCursor {
    pub created_at: DateTime<Utc>,
    pub id: Uuid,
}

impl HistoryCursor {
    pub fn encode(&self) -> String {
        let raw = format!(
            "{}|{}",
            self.created_at.to_rfc3339_opts(SecondsFormat::Micros, true),
            self.id
        );
        URL_SAFE_NO_PAD.encode(raw)
    }

    pub fn decode(token: &str) -> Result<Self, AppError> {
        let raw = URL_SAFE_NO_PAD
            .decode(token)
            .map_err(|_| AppError::Validation("malformed cursor".into()))?;
        let raw =
            String::from_utf8(raw).map_err(|_| AppError::Validation("malformed cursor".into()))?;
        let (ts, id) = raw
            .split_once('|')
            .ok_or_else(|| AppError::Validation("malformed cursor".into()))?;
        let created_at = DateTime::parse_from_rfc3339(ts)
            .map_err(|_| AppError::Validation("malformed cursor".into()))?
            .with_timezone(&Utc);
        let id = Uuid::parse_str(id).map_err(|_| AppError::Validation("malformed cursor".into()))?;
        Ok(Self { created_at, id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_round_trips() {
        let cursor = HistoryCursor {
            created_at: Utc::now(),
            id: Uuid::new_v4(),
        };
        let decoded = HistoryCursor::decode(&cursor.encode()).unwrap();
        // rfc3339 micros keeps enough precision for a postgres timestamptz
        assert_eq!(decoded.id, cursor.id);
        assert_eq!(
            decoded.created_at.timestamp_micros(),
            cursor.created_at.timestamp_micros()
        );
    }

    #[test]
    fn cursor_rejects_garbage() {
        assert!(HistoryCursor::decode("not-base64!!!").is_err());
        assert!(HistoryCursor::decode(&URL_SAFE_NO_PAD.encode("no-separator")).is_err());
        assert!(HistoryCursor::decode(&URL_SAFE_NO_PAD.encode("2024-01-01T00:00:00Z|nope")).is_err());
    }
}
