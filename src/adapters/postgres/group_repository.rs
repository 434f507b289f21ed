//! PostgreSQL implementation of GroupRepository.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::domain::foundation::{
    DomainError, ErrorCode, GroupId, Money, Timestamp, UserId,
};
use crate::domain::group::{
    ContributionFrequency, FeePolicy, Group, GroupStatus, GroupTerms, PayoutOrderMethod,
};
use crate::ports::GroupRepository;

use super::conversions::{db_error, parse_column, to_i32, to_u32};

const GROUP_COLUMNS: &str = r#"
    id, name, organizer_id, members_limit, contribution_amount, frequency,
    start_date, payout_order_method, fee_type, fee_value, status,
    created_at, updated_at
"#;

/// PostgreSQL implementation of GroupRepository.
#[derive(Clone)]
pub struct PostgresGroupRepository {
    pool: PgPool,
}

impl PostgresGroupRepository {
    /// Creates a new PostgresGroupRepository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GroupRepository for PostgresGroupRepository {
    async fn find_by_id(&self, id: &GroupId) -> Result<Option<Group>, DomainError> {
        let row = sqlx::query(&format!("SELECT {} FROM groups WHERE id = $1", GROUP_COLUMNS))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("fetch group", e))?;

        row.map(row_to_group).transpose()
    }

    async fn update(&self, group: &Group) -> Result<(), DomainError> {
        let fee_policy = group.fee_policy();
        let result = sqlx::query(
            r#"
            UPDATE groups SET
                name = $2,
                members_limit = $3,
                contribution_amount = $4,
                frequency = $5,
                start_date = $6,
                payout_order_method = $7,
                fee_type = $8,
                fee_value = $9,
                status = $10,
                updated_at = $11
            WHERE id = $1
            "#,
        )
        .bind(group.id().as_uuid())
        .bind(group.name())
        .bind(to_i32("members_limit", group.members_limit())?)
        .bind(group.contribution_amount().minor_units())
        .bind(group.frequency().as_str())
        .bind(group.start_date())
        .bind(group.payout_order_method().as_str())
        .bind(fee_policy.fee_type().as_str())
        .bind(fee_policy.raw_value())
        .bind(group.status().as_str())
        .bind(group.updated_at().as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("update group", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::GroupNotFound,
                format!("Group not found: {}", group.id()),
            )
            .with_detail("group_id", group.id().to_string()));
        }

        Ok(())
    }

    async fn find_active(&self) -> Result<Vec<Group>, DomainError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM groups WHERE status = 'active' ORDER BY id",
            GROUP_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("fetch active groups", e))?;

        rows.into_iter().map(row_to_group).collect()
    }
}

fn row_to_group(row: sqlx::postgres::PgRow) -> Result<Group, DomainError> {
    let id: Uuid = row.get("id");
    let organizer_id: String = row.get("organizer_id");
    let members_limit: i32 = row.get("members_limit");
    let frequency: String = row.get("frequency");
    let start_date: NaiveDate = row.get("start_date");
    let method: String = row.get("payout_order_method");
    let fee_type: String = row.get("fee_type");
    let fee_value: i64 = row.get("fee_value");
    let status: String = row.get("status");
    let created_at: DateTime<Utc> = row.get("created_at");
    let updated_at: DateTime<Utc> = row.get("updated_at");

    let terms = GroupTerms {
        name: row.get("name"),
        organizer_id: UserId::new(organizer_id)?,
        members_limit: to_u32("members_limit", members_limit)?,
        contribution_amount: Money::from_minor(row.get("contribution_amount")),
        frequency: parse_column("frequency", &frequency, ContributionFrequency::parse)?,
        start_date,
        payout_order_method: parse_column("payout_order_method", &method, PayoutOrderMethod::parse)?,
        fee_policy: FeePolicy::from_parts(&fee_type, fee_value)?,
    };

    Ok(Group::reconstitute(
        GroupId::from_uuid(id),
        terms,
        parse_column("status", &status, GroupStatus::parse)?,
        Timestamp::from_datetime(created_at),
        Timestamp::from_datetime(updated_at),
    ))
}
