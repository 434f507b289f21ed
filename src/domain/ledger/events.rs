//! Ledger events.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    domain_event, EventId, GroupId, LedgerEntryId, MemberId, Money, Timestamp,
};

use super::EntryKind;

/// A payment was applied to a ledger entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRecorded {
    pub event_id: EventId,
    pub entry_id: LedgerEntryId,
    pub group_id: GroupId,
    pub member_id: MemberId,
    pub cycle_number: u32,
    pub kind: EntryKind,
    pub amount: Money,
    pub amount_paid: Money,
    pub fully_paid: bool,
    pub occurred_at: Timestamp,
}

domain_event!(
    PaymentRecorded,
    event_type = "ledger.payment_recorded.v1",
    aggregate_id = entry_id,
    aggregate_type = "LedgerEntry",
    occurred_at = occurred_at,
    event_id = event_id
);
