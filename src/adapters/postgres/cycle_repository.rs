//! PostgreSQL implementation of CycleRepository.
//!
//! `create_schedule` writes all cycles in one transaction. A concurrent
//! activation that loses the race hits `cycles_group_id_cycle_number_key`
//! and is reported as `AlreadyGenerated`.

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::domain::cycle::{Cycle, CycleStatus};
use crate::domain::foundation::{
    CycleId, DomainError, ErrorCode, GroupId, MemberId, UserId,
};
use crate::ports::CycleRepository;

use super::conversions::{db_error, parse_column, to_i32, to_u32};

const SCHEDULE_CONSTRAINT: &str = "cycles_group_id_cycle_number_key";

/// PostgreSQL implementation of CycleRepository.
#[derive(Clone)]
pub struct PostgresCycleRepository {
    pool: PgPool,
}

impl PostgresCycleRepository {
    /// Creates a new PostgresCycleRepository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn already_generated(group_id: &GroupId) -> DomainError {
    DomainError::new(
        ErrorCode::AlreadyGenerated,
        format!("Cycles already generated for group {}", group_id),
    )
    .with_detail("group_id", group_id.to_string())
}

#[async_trait]
impl CycleRepository for PostgresCycleRepository {
    async fn exists_for_group(&self, group_id: &GroupId) -> Result<bool, DomainError> {
        let result: (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM cycles WHERE group_id = $1)")
                .bind(group_id.as_uuid())
                .fetch_one(&self.pool)
                .await
                .map_err(|e| db_error("check cycle existence", e))?;

        Ok(result.0)
    }

    async fn create_schedule(&self, group_id: &GroupId, cycles: &[Cycle]) -> Result<(), DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("begin transaction", e))?;

        let existing: (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM cycles WHERE group_id = $1)")
                .bind(group_id.as_uuid())
                .fetch_one(&mut *tx)
                .await
                .map_err(|e| db_error("check cycle existence", e))?;
        if existing.0 {
            return Err(already_generated(group_id));
        }

        for cycle in cycles {
            sqlx::query(
                r#"
                INSERT INTO cycles (
                    id, group_id, cycle_number, due_date,
                    payout_member_id, payout_user_id, status
                ) VALUES ($1, $2, $3, $4, $5, $6, $7)
                "#,
            )
            .bind(cycle.id.as_uuid())
            .bind(group_id.as_uuid())
            .bind(to_i32("cycle_number", cycle.cycle_number)?)
            .bind(cycle.due_date)
            .bind(cycle.payout_member_id.as_uuid())
            .bind(cycle.payout_user_id.as_str())
            .bind(cycle.status.as_str())
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e {
                    if db_err.constraint() == Some(SCHEDULE_CONSTRAINT) {
                        return already_generated(group_id);
                    }
                }
                db_error("insert cycle", e)
            })?;
        }

        // Dropping the transaction on any early return rolls back every insert.
        tx.commit().await.map_err(|e| db_error("commit transaction", e))?;

        Ok(())
    }

    async fn find_by_group(&self, group_id: &GroupId) -> Result<Vec<Cycle>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT id, group_id, cycle_number, due_date,
                   payout_member_id, payout_user_id, status
            FROM cycles
            WHERE group_id = $1
            ORDER BY cycle_number ASC
            "#,
        )
        .bind(group_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("fetch cycles", e))?;

        rows.into_iter().map(row_to_cycle).collect()
    }

    async fn update_status(&self, id: &CycleId, status: CycleStatus) -> Result<(), DomainError> {
        let result = sqlx::query("UPDATE cycles SET status = $2 WHERE id = $1")
            .bind(id.as_uuid())
            .bind(status.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("update cycle status", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::CycleNotFound,
                format!("Cycle not found: {}", id),
            ));
        }

        Ok(())
    }

    async fn delete_schedule(&self, group_id: &GroupId) -> Result<(), DomainError> {
        sqlx::query("DELETE FROM cycles WHERE group_id = $1")
            .bind(group_id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("delete cycle schedule", e))?;

        Ok(())
    }
}

fn row_to_cycle(row: sqlx::postgres::PgRow) -> Result<Cycle, DomainError> {
    let id: Uuid = row.get("id");
    let group_id: Uuid = row.get("group_id");
    let cycle_number: i32 = row.get("cycle_number");
    let due_date: NaiveDate = row.get("due_date");
    let payout_member_id: Uuid = row.get("payout_member_id");
    let payout_user_id: String = row.get("payout_user_id");
    let status: String = row.get("status");

    Ok(Cycle {
        id: CycleId::from_uuid(id),
        group_id: GroupId::from_uuid(group_id),
        cycle_number: to_u32("cycle_number", cycle_number)?,
        due_date,
        payout_member_id: MemberId::from_uuid(payout_member_id),
        payout_user_id: UserId::new(payout_user_id)?,
        status: parse_column("status", &status, CycleStatus::parse)?,
    })
}
