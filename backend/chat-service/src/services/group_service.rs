use std::collections::{BTreeSet, HashMap};

use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::conversation::normalize_id;
use crate::models::group::{Group, GroupRecord};

pub struct GroupService;

impl GroupService {
    /// Create a group. The creator is always a member; member ids are
    /// lowercased and de-duplicated before insert.
    pub async fn create(
        db: &Pool<Postgres>,
        creator: &str,
        name: &str,
        member_ids: Vec<String>,
    ) -> Result<Group, AppError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("group name is required".into()));
        }

        let mut members: BTreeSet<String> = member_ids
            .iter()
            .map(|id| normalize_id(id))
            .filter(|id| !id.is_empty())
            .collect();
        members.insert(normalize_id(creator));

        let id = Uuid::new_v4();
        let mut tx = db.begin().await?;

        let record = sqlx::query_as::<_, GroupRecord>(
            "INSERT INTO groups (id, name, created_by) VALUES ($1, $2, $3) \
             RETURNING id, name, created_by, created_at",
        )
        .bind(id)
        .bind(name)
        .bind(normalize_id(creator))
        .fetch_one(&mut *tx)
        .await?;

        for member in &members {
            sqlx::query(
                "INSERT INTO group_members (group_id, member_id) VALUES ($1, $2) \
                 ON CONFLICT (group_id, member_id) DO NOTHING",
            )
            .bind(id)
            .bind(member)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        tracing::info!(group = %id, members = members.len(), "group created");
        Ok(Group::from_record(record, members.into_iter().collect()))
    }

    /// List groups, optionally only those containing the given member
    pub async fn list(
        db: &Pool<Postgres>,
        member_filter: Option<&str>,
    ) -> Result<Vec<Group>, AppError> {
        let records = match member_filter {
            Some(member) => {
                sqlx::query_as::<_, GroupRecord>(
                    "SELECT g.id, g.name, g.created_by, g.created_at FROM groups g \
                     WHERE EXISTS (\
                         SELECT 1 FROM group_members gm \
                         WHERE gm.group_id = g.id AND gm.member_id = $1\
                     ) \
                     ORDER BY g.created_at, g.id",
                )
                .bind(normalize_id(member))
                .fetch_all(db)
                .await?
            }
            None => {
                sqlx::query_as::<_, GroupRecord>(
                    "SELECT id, name, created_by, created_at FROM groups ORDER BY created_at, id",
                )
                .fetch_all(db)
                .await?
            }
        };

        if records.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = records.iter().map(|r| r.id).collect();
        let membership_rows = sqlx::query_as::<_, (Uuid, String)>(
            "SELECT group_id, member_id FROM group_members \
             WHERE group_id = ANY($1) ORDER BY member_id",
        )
        .bind(&ids)
        .fetch_all(db)
        .await?;

        let mut members_by_group: HashMap<Uuid, Vec<String>> = HashMap::new();
        for (group_id, member_id) in membership_rows {
            members_by_group.entry(group_id).or_default().push(member_id);
        }

        Ok(records
            .into_iter()
            .map(|record| {
                let members = members_by_group.remove(&record.id).unwrap_or_default();
                Group::from_record(record, members)
            })
            .collect())
    }

    pub async fn get(db: &Pool<Postgres>, group_id: Uuid) -> Result<Group, AppError> {
        let record = Self::fetch_record(db, group_id).await?;
        let members = Self::members_of(db, group_id).await?;
        Ok(Group::from_record(record, members))
    }

    /// Add a member. The composite primary key makes this atomic and
    /// idempotent: adding an existing member is a no-op.
    pub async fn add_member(
        db: &Pool<Postgres>,
        group_id: Uuid,
        member_id: &str,
    ) -> Result<Group, AppError> {
        Self::fetch_record(db, group_id).await?;
        let member_id = normalize_id(member_id);
        if member_id.is_empty() {
            return Err(AppError::Validation("member id is required".into()));
        }

        sqlx::query(
            "INSERT INTO group_members (group_id, member_id) VALUES ($1, $2) \
             ON CONFLICT (group_id, member_id) DO NOTHING",
        )
        .bind(group_id)
        .bind(&member_id)
        .execute(db)
        .await?;

        Self::get(db, group_id).await
    }

    /// Remove a member; removing an absent member is a no-op
    pub async fn remove_member(
        db: &Pool<Postgres>,
        group_id: Uuid,
        member_id: &str,
    ) -> Result<Group, AppError> {
        Self::fetch_record(db, group_id).await?;

        sqlx::query("DELETE FROM group_members WHERE group_id = $1 AND member_id = $2")
            .bind(group_id)
            .bind(normalize_id(member_id))
            .execute(db)
            .await?;

        Self::get(db, group_id).await
    }

    /// Delete the group and its membership rows
    pub async fn delete(db: &Pool<Postgres>, group_id: Uuid) -> Result<(), AppError> {
        let mut tx = db.begin().await?;

        sqlx::query("DELETE FROM group_members WHERE group_id = $1")
            .bind(group_id)
            .execute(&mut *tx)
            .await?;

        let deleted = sqlx::query("DELETE FROM groups WHERE id = $1")
            .bind(group_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if deleted == 0 {
            tx.rollback().await?;
            return Err(AppError::NotFound("group"));
        }

        tx.commit().await?;
        tracing::info!(group = %group_id, "group deleted");
        Ok(())
    }

    pub async fn members_of(db: &Pool<Postgres>, group_id: Uuid) -> Result<Vec<String>, AppError> {
        let rows = sqlx::query_as::<_, (String,)>(
            "SELECT member_id FROM group_members WHERE group_id = $1 ORDER BY member_id",
        )
        .bind(group_id)
        .fetch_all(db)
        .await?;
        Ok(rows.into_iter().map(|(m,)| m).collect())
    }

    async fn fetch_record(db: &Pool<Postgres>, group_id: Uuid) -> Result<GroupRecord, AppError> {
        sqlx::query_as::<_, GroupRecord>(
            "SELECT id, name, created_by, created_at FROM groups WHERE id = $1",
        )
        .bind(group_id)
        .fetch_optional(db)
        .await?
        .ok_or(AppError::NotFound("group"))
    }
}
