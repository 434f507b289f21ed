//! Ledger repository port.
//!
//! Entries are append-only records. `update` is a compare-and-set on
//! `amount_paid`, so two payments racing on one entry cannot overwrite each
//! other or lower the paid amount.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, GroupId, LedgerEntryId, MemberId, Money};
use crate::domain::ledger::LedgerEntry;

/// Repository port for contribution and fee records.
#[async_trait]
pub trait LedgerRepository: Send + Sync {
    /// All entries of a group ordered by cycle number.
    async fn find_by_group(&self, group_id: &GroupId) -> Result<Vec<LedgerEntry>, DomainError>;

    /// Entries of one member ordered by cycle number.
    async fn find_by_member(&self, member_id: &MemberId) -> Result<Vec<LedgerEntry>, DomainError>;

    /// Find an entry by its ID.
    ///
    /// Returns `None` if not found.
    async fn find_by_id(&self, id: &LedgerEntryId) -> Result<Option<LedgerEntry>, DomainError>;

    /// Insert new entries.
    async fn create_entries(&self, entries: &[LedgerEntry]) -> Result<(), DomainError>;

    /// Store the entry's new `amount_paid` and `paid_at`, provided the stored
    /// amount still equals `read_amount_paid` and the new amount is not lower.
    ///
    /// # Errors
    ///
    /// - `LedgerEntryNotFound` if the entry doesn't exist
    /// - `ConcurrencyConflict` if the stored amount changed since it was read
    /// - `DatabaseError` on persistence failure
    async fn update(&self, entry: &LedgerEntry, read_amount_paid: Money) -> Result<(), DomainError>;
}
