//! Ledger entries - what each member owes and has paid per cycle.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::cycle::Cycle;
use crate::domain::foundation::{GroupId, LedgerEntryId, MemberId, Money, Timestamp, UserId};
use crate::domain::group::{EngineError, Group, Member};

/// What an entry is charged for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Contribution,
    SetupFee,
    MonthlyFee,
}

impl EntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::Contribution => "contribution",
            EntryKind::SetupFee => "setup_fee",
            EntryKind::MonthlyFee => "monthly_fee",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "contribution" => Some(EntryKind::Contribution),
            "setup_fee" => Some(EntryKind::SetupFee),
            "monthly_fee" => Some(EntryKind::MonthlyFee),
            _ => None,
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One charge against one member for one cycle.
///
/// # Invariants
///
/// - `0 <= amount_paid <= amount_due`
/// - `paid_at` is set exactly when `amount_paid == amount_due`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: LedgerEntryId,
    pub group_id: GroupId,
    pub member_id: MemberId,
    pub user_id: UserId,
    pub cycle_number: u32,
    pub kind: EntryKind,
    pub amount_due: Money,
    pub amount_paid: Money,
    pub paid_at: Option<Timestamp>,
}

impl LedgerEntry {
    /// Creates an unpaid entry for `member`.
    pub fn new(member: &Member, cycle_number: u32, kind: EntryKind, amount_due: Money) -> Self {
        Self {
            id: LedgerEntryId::new(),
            group_id: member.group_id,
            member_id: member.id,
            user_id: member.user_id.clone(),
            cycle_number,
            kind,
            amount_due,
            amount_paid: Money::ZERO,
            paid_at: None,
        }
    }

    /// One contribution entry per active member for a cycle that just opened.
    pub fn contributions_for_cycle(group: &Group, cycle: &Cycle, members: &[Member]) -> Vec<Self> {
        members
            .iter()
            .filter(|m| m.is_active() && m.group_id == group.id())
            .map(|m| {
                Self::new(
                    m,
                    cycle.cycle_number,
                    EntryKind::Contribution,
                    group.contribution_amount(),
                )
            })
            .collect()
    }

    pub fn is_paid(&self) -> bool {
        self.amount_paid >= self.amount_due
    }

    /// Amount still owed, never negative.
    pub fn outstanding(&self) -> Money {
        self.amount_due.saturating_sub_floor_zero(self.amount_paid)
    }

    /// Applies a payment.
    ///
    /// # Errors
    ///
    /// `Validation` for a non-positive amount or one larger than the
    /// outstanding balance.
    pub fn record_payment(&mut self, amount: Money, at: Timestamp) -> Result<(), EngineError> {
        if !amount.is_positive() {
            return Err(EngineError::validation("amount", "payment must be positive"));
        }
        let outstanding = self.outstanding();
        if amount > outstanding {
            return Err(EngineError::validation(
                "amount",
                format!("payment {} exceeds outstanding balance {}", amount, outstanding),
            ));
        }

        self.amount_paid += amount;
        if self.is_paid() {
            self.paid_at = Some(at);
        }
        Ok(())
    }
}
