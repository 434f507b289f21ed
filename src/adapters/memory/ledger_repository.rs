//! In-memory LedgerRepository.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, ErrorCode, GroupId, LedgerEntryId, MemberId, Money};
use crate::domain::ledger::LedgerEntry;
use crate::ports::LedgerRepository;

/// Ledger entries keyed by id.
#[derive(Debug, Default)]
pub struct InMemoryLedgerRepository {
    entries: RwLock<HashMap<LedgerEntryId, LedgerEntry>>,
}

impl InMemoryLedgerRepository {
    pub fn new() -> Self {
        Self::default()
    }

    async fn matching(&self, predicate: impl Fn(&LedgerEntry) -> bool) -> Vec<LedgerEntry> {
        let mut found: Vec<LedgerEntry> = self
            .entries
            .read()
            .await
            .values()
            .filter(|e| predicate(e))
            .cloned()
            .collect();
        found.sort_by(|a, b| {
            (a.cycle_number, a.member_id, a.kind).cmp(&(b.cycle_number, b.member_id, b.kind))
        });
        found
    }
}

#[async_trait]
impl LedgerRepository for InMemoryLedgerRepository {
    async fn find_by_group(&self, group_id: &GroupId) -> Result<Vec<LedgerEntry>, DomainError> {
        Ok(self.matching(|e| &e.group_id == group_id).await)
    }

    async fn find_by_member(&self, member_id: &MemberId) -> Result<Vec<LedgerEntry>, DomainError> {
        Ok(self.matching(|e| &e.member_id == member_id).await)
    }

    async fn find_by_id(&self, id: &LedgerEntryId) -> Result<Option<LedgerEntry>, DomainError> {
        Ok(self.entries.read().await.get(id).cloned())
    }

    /// Skips an entry whose (member, cycle, kind) is already recorded.
    async fn create_entries(&self, entries: &[LedgerEntry]) -> Result<(), DomainError> {
        let mut stored = self.entries.write().await;
        for entry in entries {
            let duplicate = stored.values().any(|e| {
                e.member_id == entry.member_id
                    && e.cycle_number == entry.cycle_number
                    && e.kind == entry.kind
            });
            if !duplicate {
                stored.insert(entry.id, entry.clone());
            }
        }
        Ok(())
    }

    async fn update(&self, entry: &LedgerEntry, read_amount_paid: Money) -> Result<(), DomainError> {
        let mut stored = self.entries.write().await;
        match stored.get_mut(&entry.id) {
            Some(existing) => {
                if existing.amount_paid != read_amount_paid
                    || entry.amount_paid < existing.amount_paid
                {
                    return Err(DomainError::new(
                        ErrorCode::ConcurrencyConflict,
                        format!(
                            "Ledger entry {} holds {}, expected {}",
                            entry.id, existing.amount_paid, read_amount_paid
                        ),
                    )
                    .with_detail("entry_id", entry.id.to_string()));
                }
                existing.amount_paid = entry.amount_paid;
                existing.paid_at = entry.paid_at;
                Ok(())
            }
            None => Err(DomainError::new(
                ErrorCode::LedgerEntryNotFound,
                format!("Ledger entry not found: {}", entry.id),
            )
            .with_detail("entry_id", entry.id.to_string())),
        }
    }
}
