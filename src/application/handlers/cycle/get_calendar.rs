//! GetCalendarHandler - Query handler for a group's calendar.
//!
//! Returns contribution-due and payout events for every cycle, marked from
//! the requesting user's point of view.

use std::sync::Arc;

use crate::domain::foundation::{GroupId, UserId};
use crate::domain::group::EngineError;
use crate::domain::ledger::{derive_calendar_events, CalendarEvent};
use crate::domain::payout::FeeCalculator;
use crate::ports::{CycleRepository, GroupRepository, LedgerRepository, MemberReader};

/// Query for a group's calendar.
#[derive(Debug, Clone)]
pub struct GetCalendarQuery {
    pub group_id: GroupId,
    pub requesting_user: UserId,
}

pub struct GetCalendarHandler {
    group_repository: Arc<dyn GroupRepository>,
    member_reader: Arc<dyn MemberReader>,
    cycle_repository: Arc<dyn CycleRepository>,
    ledger_repository: Arc<dyn LedgerRepository>,
    payout_delay_days: u32,
}

impl GetCalendarHandler {
    pub fn new(
        group_repository: Arc<dyn GroupRepository>,
        member_reader: Arc<dyn MemberReader>,
        cycle_repository: Arc<dyn CycleRepository>,
        ledger_repository: Arc<dyn LedgerRepository>,
    ) -> Self {
        Self {
            group_repository,
            member_reader,
            cycle_repository,
            ledger_repository,
            payout_delay_days: 0,
        }
    }

    pub fn with_payout_delay_days(mut self, days: u32) -> Self {
        self.payout_delay_days = days;
        self
    }

    pub async fn handle(&self, query: GetCalendarQuery) -> Result<Vec<CalendarEvent>, EngineError> {
        let group = self
            .group_repository
            .find_by_id(&query.group_id)
            .await?
            .ok_or(EngineError::GroupNotFound(query.group_id))?;

        let cycles = self.cycle_repository.find_by_group(&query.group_id).await?;
        if cycles.is_empty() {
            return Ok(Vec::new());
        }

        let fees = FeeCalculator::breakdown(
            group.contribution_amount(),
            group.members_limit(),
            &group.fee_policy(),
        )?;
        // Removed members still appear as past payout recipients.
        let members = self.member_reader.find_by_group(&query.group_id).await?;
        let entries = self.ledger_repository.find_by_group(&query.group_id).await?;

        Ok(derive_calendar_events(
            &group,
            &fees,
            &cycles,
            &members,
            &entries,
            &query.requesting_user,
            self.payout_delay_days,
        ))
    }
}
