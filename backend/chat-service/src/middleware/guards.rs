//! Authorization guards that enforce permission checks at the type level

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::auth::AuthMember;

/// The authenticated member extracted from the session token
#[derive(Debug, Clone)]
pub struct CurrentMember {
    pub id: String,
    pub display_name: String,
    pub role: Option<String>,
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentMember
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let member = parts
            .extensions
            .get::<AuthMember>()
            .cloned()
            .ok_or(AppError::Unauthorized)?;

        Ok(CurrentMember {
            id: member.id,
            display_name: member.display_name,
            role: member.role,
        })
    }
}

/// A verified group membership. Construction is the only way handlers get
/// one, so a group send or mutation cannot skip the check.
#[derive(Debug, Clone)]
pub struct GroupMember {
    pub group_id: Uuid,
    pub member_id: String,
}

impl GroupMember {
    /// One query checks both that the group exists and that the member
    /// belongs to it
    pub async fn verify(db: &PgPool, group_id: Uuid, member_id: &str) -> Result<Self, AppError> {
        let row = sqlx::query_as::<_, (bool, bool)>(
            r#"
            SELECT
                EXISTS(SELECT 1 FROM groups WHERE id = $1) AS group_exists,
                EXISTS(
                    SELECT 1 FROM group_members
                    WHERE group_id = $1 AND member_id = $2
                ) AS is_member
            "#,
        )
        .bind(group_id)
        .bind(member_id)
        .fetch_one(db)
        .await?;

        let (group_exists, is_member) = row;
        if !group_exists {
            return Err(AppError::NotFound("group"));
        }
        if !is_member {
            return Err(AppError::Forbidden);
        }

        Ok(GroupMember {
            group_id,
            member_id: member_id.to_string(),
        })
    }
}
