use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// Full member row; only read inside the service, never serialized
#[derive(Debug, Clone, FromRow)]
pub struct Member {
    pub id: String,
    pub display_name: String,
    pub password_hash: String,
    pub role: Option<String>,
    pub last_active_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// What listing endpoints expose. The password hash never leaves the row
/// type above.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct MemberProfile {
    pub id: String,
    pub display_name: String,
    pub role: Option<String>,
    pub last_active_at: Option<DateTime<Utc>>,
    #[sqlx(default)]
    pub online: bool,
}
