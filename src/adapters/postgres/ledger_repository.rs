//! PostgreSQL implementation of LedgerRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::domain::foundation::{
    DomainError, ErrorCode, GroupId, LedgerEntryId, MemberId, Money, Timestamp, UserId,
};
use crate::domain::ledger::{EntryKind, LedgerEntry};
use crate::ports::LedgerRepository;

use super::conversions::{db_error, parse_column, to_i32, to_u32};

const ENTRY_COLUMNS: &str = r#"
    id, group_id, member_id, user_id, cycle_number, kind,
    amount_due, amount_paid, paid_at
"#;

/// PostgreSQL implementation of LedgerRepository.
#[derive(Clone)]
pub struct PostgresLedgerRepository {
    pool: PgPool,
}

impl PostgresLedgerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LedgerRepository for PostgresLedgerRepository {
    async fn find_by_group(&self, group_id: &GroupId) -> Result<Vec<LedgerEntry>, DomainError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM ledger_entries WHERE group_id = $1 ORDER BY cycle_number, member_id, kind",
            ENTRY_COLUMNS
        ))
        .bind(group_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("fetch ledger entries", e))?;

        rows.into_iter().map(row_to_entry).collect()
    }

    async fn find_by_member(&self, member_id: &MemberId) -> Result<Vec<LedgerEntry>, DomainError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM ledger_entries WHERE member_id = $1 ORDER BY cycle_number, kind",
            ENTRY_COLUMNS
        ))
        .bind(member_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("fetch member ledger entries", e))?;

        rows.into_iter().map(row_to_entry).collect()
    }

    async fn find_by_id(&self, id: &LedgerEntryId) -> Result<Option<LedgerEntry>, DomainError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM ledger_entries WHERE id = $1",
            ENTRY_COLUMNS
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("fetch ledger entry", e))?;

        row.map(row_to_entry).transpose()
    }

    async fn create_entries(&self, entries: &[LedgerEntry]) -> Result<(), DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("begin transaction", e))?;

        for entry in entries {
            sqlx::query(
                r#"
                INSERT INTO ledger_entries (
                    id, group_id, member_id, user_id, cycle_number, kind,
                    amount_due, amount_paid, paid_at
                ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                ON CONFLICT ON CONSTRAINT ledger_entries_member_cycle_kind_key DO NOTHING
                "#,
            )
            .bind(entry.id.as_uuid())
            .bind(entry.group_id.as_uuid())
            .bind(entry.member_id.as_uuid())
            .bind(entry.user_id.as_str())
            .bind(to_i32("cycle_number", entry.cycle_number)?)
            .bind(entry.kind.as_str())
            .bind(entry.amount_due.minor_units())
            .bind(entry.amount_paid.minor_units())
            .bind(entry.paid_at.map(|t| *t.as_datetime()))
            .execute(&mut *tx)
            .await
            .map_err(|e| db_error("insert ledger entry", e))?;
        }

        tx.commit().await.map_err(|e| db_error("commit transaction", e))?;
        Ok(())
    }

    async fn update(&self, entry: &LedgerEntry, read_amount_paid: Money) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE ledger_entries SET
                amount_paid = $2,
                paid_at = $3
            WHERE id = $1
              AND amount_paid = $4
              AND $2 >= amount_paid
            "#,
        )
        .bind(entry.id.as_uuid())
        .bind(entry.amount_paid.minor_units())
        .bind(entry.paid_at.map(|t| *t.as_datetime()))
        .bind(read_amount_paid.minor_units())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("update ledger entry", e))?;

        if result.rows_affected() == 0 {
            let exists: bool =
                sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM ledger_entries WHERE id = $1)")
                    .bind(entry.id.as_uuid())
                    .fetch_one(&self.pool)
                    .await
                    .map_err(|e| db_error("check ledger entry", e))?;

            let err = if exists {
                DomainError::new(
                    ErrorCode::ConcurrencyConflict,
                    format!("Ledger entry {} changed since it was read", entry.id),
                )
            } else {
                DomainError::new(
                    ErrorCode::LedgerEntryNotFound,
                    format!("Ledger entry not found: {}", entry.id),
                )
            };
            return Err(err.with_detail("entry_id", entry.id.to_string()));
        }

        Ok(())
    }
}

fn row_to_entry(row: sqlx::postgres::PgRow) -> Result<LedgerEntry, DomainError> {
    let id: Uuid = row.get("id");
    let group_id: Uuid = row.get("group_id");
    let member_id: Uuid = row.get("member_id");
    let user_id: String = row.get("user_id");
    let cycle_number: i32 = row.get("cycle_number");
    let kind: String = row.get("kind");
    let amount_due: i64 = row.get("amount_due");
    let amount_paid: i64 = row.get("amount_paid");
    let paid_at: Option<DateTime<Utc>> = row.get("paid_at");

    Ok(LedgerEntry {
        id: LedgerEntryId::from_uuid(id),
        group_id: GroupId::from_uuid(group_id),
        member_id: MemberId::from_uuid(member_id),
        user_id: UserId::new(user_id)?,
        cycle_number: to_u32("cycle_number", cycle_number)?,
        kind: parse_column("kind", &kind, EntryKind::parse)?,
        amount_due: Money::from_minor(amount_due),
        amount_paid: Money::from_minor(amount_paid),
        paid_at: paid_at.map(Timestamp::from_datetime),
    })
}
