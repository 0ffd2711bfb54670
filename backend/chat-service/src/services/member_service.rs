use sqlx::{PgPool, Pool, Postgres};

use crate::error::AppError;
use crate::models::conversation::normalize_id;
use crate::models::member::{Member, MemberProfile};
use crate::redis_client::RedisClient;
use crate::security::password;
use crate::services::presence_service::PresenceService;

pub struct MemberService;

impl MemberService {
    /// Create a member. The id is the lowercased registration email; a
    /// duplicate registration conflicts and leaves the stored hash untouched.
    pub async fn register(
        db: &Pool<Postgres>,
        email: &str,
        display_name: &str,
        plaintext_password: &str,
    ) -> Result<MemberProfile, AppError> {
        let id = normalize_id(email);
        if id.is_empty() || !id.contains('@') {
            return Err(AppError::Validation("a valid email is required".into()));
        }
        let display_name = display_name.trim();
        if display_name.is_empty() {
            return Err(AppError::Validation("display name is required".into()));
        }

        let password_hash = password::hash_password(plaintext_password)?;

        let inserted = sqlx::query(
            "INSERT INTO members (id, display_name, password_hash) VALUES ($1, $2, $3) \
             ON CONFLICT (id) DO NOTHING",
        )
        .bind(&id)
        .bind(display_name)
        .bind(&password_hash)
        .execute(db)
        .await?
        .rows_affected();

        if inserted == 0 {
            return Err(AppError::Conflict("member already registered".into()));
        }

        tracing::info!(member = %id, "member registered");

        Ok(MemberProfile {
            id,
            display_name: display_name.to_string(),
            role: None,
            last_active_at: None,
            online: false,
        })
    }

    /// Verify credentials. Unknown id and wrong password are deliberately
    /// indistinguishable to the caller.
    pub async fn authenticate(
        db: &Pool<Postgres>,
        email: &str,
        plaintext_password: &str,
    ) -> Result<Member, AppError> {
        let id = normalize_id(email);

        let member = sqlx::query_as::<_, Member>(
            "SELECT id, display_name, password_hash, role, last_active_at, created_at \
             FROM members WHERE id = $1",
        )
        .bind(&id)
        .fetch_optional(db)
        .await?;

        let Some(member) = member else {
            return Err(AppError::Unauthorized);
        };

        if !password::verify_password(plaintext_password, &member.password_hash)? {
            return Err(AppError::Unauthorized);
        }

        sqlx::query("UPDATE members SET last_active_at = now() WHERE id = $1")
            .bind(&id)
            .execute(db)
            .await?;

        tracing::info!(member = %id, "member authenticated");
        Ok(member)
    }

    /// All member profiles with a live online flag from the presence store
    pub async fn list(db: &PgPool, redis: &RedisClient) -> Result<Vec<MemberProfile>, AppError> {
        let mut profiles = sqlx::query_as::<_, MemberProfile>(
            "SELECT id, display_name, role, last_active_at, FALSE AS online \
             FROM members ORDER BY display_name, id",
        )
        .fetch_all(db)
        .await?;

        let ids: Vec<String> = profiles.iter().map(|p| p.id.clone()).collect();
        let online = PresenceService::online_flags(redis, &ids).await?;
        for (profile, online) in profiles.iter_mut().zip(online) {
            profile.online = online;
        }

        Ok(profiles)
    }
}
