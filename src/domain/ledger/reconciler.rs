//! Ledger Reconciler - read-side aggregation of ledger entries.
//!
//! Pure functions over slices of entries; nothing here mutates a record.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{MemberId, Money, UserId};

use super::{EntryKind, LedgerEntry};

/// Paid/unpaid totals over a set of entries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSummary {
    pub total_paid: Money,
    pub total_unpaid: Money,
    pub paid_count: usize,
    pub unpaid_count: usize,
}

/// Totals for one member, as consumed by reports and exports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberLedgerSummary {
    pub member_id: MemberId,
    pub user_id: UserId,
    pub summary: LedgerSummary,
}

/// Stateless reconciliation service.
pub struct LedgerReconciler;

impl LedgerReconciler {
    /// Sums paid and outstanding amounts; an entry is paid once
    /// `amount_paid >= amount_due`.
    pub fn reconcile<'a, I>(entries: I) -> LedgerSummary
    where
        I: IntoIterator<Item = &'a LedgerEntry>,
    {
        entries
            .into_iter()
            .fold(LedgerSummary::default(), |mut acc, entry| {
                acc.total_paid += entry.amount_paid;
                acc.total_unpaid += entry.outstanding();
                if entry.is_paid() {
                    acc.paid_count += 1;
                } else {
                    acc.unpaid_count += 1;
                }
                acc
            })
    }

    /// One summary per member, ordered by member id.
    pub fn summarize_by_member(entries: &[LedgerEntry]) -> Vec<MemberLedgerSummary> {
        let mut by_member: BTreeMap<MemberId, (&UserId, Vec<&LedgerEntry>)> = BTreeMap::new();
        for entry in entries {
            by_member
                .entry(entry.member_id)
                .or_insert_with(|| (&entry.user_id, Vec::new()))
                .1
                .push(entry);
        }

        by_member
            .into_iter()
            .map(|(member_id, (user_id, member_entries))| MemberLedgerSummary {
                member_id,
                user_id: user_id.clone(),
                summary: Self::reconcile(member_entries),
            })
            .collect()
    }

    pub fn summarize_by_kind(entries: &[LedgerEntry]) -> BTreeMap<EntryKind, LedgerSummary> {
        let mut by_kind: BTreeMap<EntryKind, Vec<&LedgerEntry>> = BTreeMap::new();
        for entry in entries {
            by_kind.entry(entry.kind).or_default().push(entry);
        }
        by_kind
            .into_iter()
            .map(|(kind, kind_entries)| (kind, Self::reconcile(kind_entries)))
            .collect()
    }

    /// Cycle numbers whose contribution payments reach `gross_pool`.
    pub fn funded_cycles(entries: &[LedgerEntry], gross_pool: Money) -> HashSet<u32> {
        let mut collected: BTreeMap<u32, Money> = BTreeMap::new();
        for entry in entries.iter().filter(|e| e.kind == EntryKind::Contribution) {
            *collected.entry(entry.cycle_number).or_default() += entry.amount_paid;
        }
        collected
            .into_iter()
            .filter(|(_, paid)| gross_pool.is_positive() && *paid >= gross_pool)
            .map(|(cycle_number, _)| cycle_number)
            .collect()
    }
}
