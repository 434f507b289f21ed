//! PostgreSQL implementation of MemberReader.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::domain::foundation::{DomainError, GroupId, MemberId, Timestamp, UserId};
use crate::domain::group::{Member, MemberRole, MemberStatus};
use crate::ports::MemberReader;

use super::conversions::{db_error, parse_column};

/// PostgreSQL implementation of MemberReader.
#[derive(Clone)]
pub struct PostgresMemberReader {
    pool: PgPool,
}

impl PostgresMemberReader {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch(&self, group_id: &GroupId, active_only: bool) -> Result<Vec<Member>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT id, group_id, user_id, role, status, joined_at
            FROM group_members
            WHERE group_id = $1 AND ($2 = FALSE OR status = 'active')
            ORDER BY joined_at ASC, id ASC
            "#,
        )
        .bind(group_id.as_uuid())
        .bind(active_only)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("fetch group members", e))?;

        rows.into_iter().map(row_to_member).collect()
    }
}

#[async_trait]
impl MemberReader for PostgresMemberReader {
    async fn find_active_by_group(&self, group_id: &GroupId) -> Result<Vec<Member>, DomainError> {
        self.fetch(group_id, true).await
    }

    async fn find_by_group(&self, group_id: &GroupId) -> Result<Vec<Member>, DomainError> {
        self.fetch(group_id, false).await
    }
}

fn row_to_member(row: sqlx::postgres::PgRow) -> Result<Member, DomainError> {
    let id: Uuid = row.get("id");
    let group_id: Uuid = row.get("group_id");
    let user_id: String = row.get("user_id");
    let role: String = row.get("role");
    let status: String = row.get("status");
    let joined_at: DateTime<Utc> = row.get("joined_at");

    Ok(Member {
        id: MemberId::from_uuid(id),
        group_id: GroupId::from_uuid(group_id),
        user_id: UserId::new(user_id)?,
        role: parse_column("role", &role, MemberRole::parse)?,
        status: parse_column("status", &status, MemberStatus::parse)?,
        joined_at: Timestamp::from_datetime(joined_at),
    })
}
