use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct GroupRecord {
    pub id: Uuid,
    pub name: String,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

/// Group with its membership attached, as returned to clients
#[derive(Debug, Clone, Serialize)]
pub struct Group {
    pub id: Uuid,
    pub name: String,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub members: Vec<String>,
}

impl Group {
    pub fn from_record(record: GroupRecord, members: Vec<String>) -> Self {
        Self {
            id: record.id,
            name: record.name,
            created_by: record.created_by,
            created_at: record.created_at,
            members,
        }
    }
}
