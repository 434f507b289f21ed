//! Calendar projection - due and payout events derived from a schedule.
//!
//! # Design Decisions
//!
//! - **Derived, never stored**: events are rebuilt on every query from
//!   cycles, fees and ledger entries
//! - **Explicit requester**: the querying user is a parameter, never
//!   ambient request state
//! - **Net amounts**: payout events always carry the net payout

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::domain::cycle::{Cycle, CycleStatus};
use crate::domain::foundation::{Money, UserId};
use crate::domain::group::{Group, Member};
use crate::domain::payout::FeeBreakdown;

use super::{EntryKind, LedgerEntry};

/// Kind of calendar event. Due events sort before payouts on the same day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalendarEventType {
    ContributionDue,
    Payout,
}

impl CalendarEventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CalendarEventType::ContributionDue => "contribution_due",
            CalendarEventType::Payout => "payout",
        }
    }
}

/// One entry on a member's calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    /// Stable id: `<cycle id>-<event type>`.
    pub id: String,
    pub date: NaiveDate,
    pub event_type: CalendarEventType,
    pub cycle_number: u32,
    pub amount: Money,
    pub status: CycleStatus,
    pub payout_member: Option<Member>,
    pub is_requesting_user_payout: bool,
    /// The requester's own contribution state for this cycle, if one exists.
    pub requester_paid: Option<bool>,
}

/// Projects a group's schedule into calendar events for `requesting_user`.
///
/// Per cycle: one `contribution_due` event on the due date and, when the
/// payout member can be resolved, one `payout` event on
/// `due_date + payout_delay_days`. Ordered by date, cycle number, then type.
pub fn derive_calendar_events(
    group: &Group,
    fees: &FeeBreakdown,
    cycles: &[Cycle],
    members: &[Member],
    entries: &[LedgerEntry],
    requesting_user: &UserId,
    payout_delay_days: u32,
) -> Vec<CalendarEvent> {
    let mut events = Vec::with_capacity(cycles.len() * 2);

    for cycle in cycles {
        let payout_member = members
            .iter()
            .find(|m| m.id == cycle.payout_member_id)
            .cloned();
        let is_requesting_user_payout = cycle.pays_out_to(requesting_user);
        let requester_paid = entries
            .iter()
            .find(|e| {
                e.kind == EntryKind::Contribution
                    && e.cycle_number == cycle.cycle_number
                    && &e.user_id == requesting_user
            })
            .map(LedgerEntry::is_paid);

        events.push(CalendarEvent {
            id: format!("{}-{}", cycle.id, CalendarEventType::ContributionDue.as_str()),
            date: cycle.due_date,
            event_type: CalendarEventType::ContributionDue,
            cycle_number: cycle.cycle_number,
            amount: group.contribution_amount(),
            status: cycle.status,
            payout_member: payout_member.clone(),
            is_requesting_user_payout,
            requester_paid,
        });

        if let Some(member) = payout_member {
            let payout_date = cycle
                .due_date
                .checked_add_days(Days::new(u64::from(payout_delay_days)))
                .unwrap_or(cycle.due_date);
            events.push(CalendarEvent {
                id: format!("{}-{}", cycle.id, CalendarEventType::Payout.as_str()),
                date: payout_date,
                event_type: CalendarEventType::Payout,
                cycle_number: cycle.cycle_number,
                amount: fees.net_payout,
                status: cycle.status,
                payout_member: Some(member),
                is_requesting_user_payout,
                requester_paid,
            });
        }
    }

    events.sort_by(|a, b| {
        (a.date, a.cycle_number, a.event_type).cmp(&(b.date, b.cycle_number, b.event_type))
    });
    events
}
