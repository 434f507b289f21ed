//! Cycle Generator - builds the full schedule when a group activates.
//!
//! Pure: it computes fees once, orders payouts once and steps the due date
//! once per cycle. Persisting the result atomically is the caller's job
//! (`CycleRepository::create_schedule`).

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{CycleId, MemberId, UserId};
use crate::domain::group::{add_period, EngineError, FeeBounds, Group, GroupStatus, Member};
use crate::domain::payout::{
    FeeBreakdown, FeeCalculator, LotterySeed, OrganizerAssignment, PayoutOrder,
    PayoutOrderAssigner,
};

use super::{Cycle, CycleStatus};

/// Everything produced by one activation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedSchedule {
    pub fees: FeeBreakdown,
    pub order: PayoutOrder,
    /// Ordered by cycle number, 1..=N.
    pub cycles: Vec<Cycle>,
}

impl GeneratedSchedule {
    pub fn first_due_date(&self) -> Option<NaiveDate> {
        self.cycles.first().map(|c| c.due_date)
    }

    pub fn last_due_date(&self) -> Option<NaiveDate> {
        self.cycles.last().map(|c| c.due_date)
    }
}

/// Stateless schedule generation service.
pub struct CycleGenerator;

impl CycleGenerator {
    /// Generates N cycles for a forming group with exactly N active members.
    ///
    /// Members that are not active are ignored. Cycle 1 starts `Open` when
    /// its due date is on or before `today`; every other cycle starts
    /// `Upcoming`.
    ///
    /// # Errors
    ///
    /// - `NotForming` if the group has already left `Forming`
    /// - `ActivationPrecondition` if the active member count differs from N
    /// - fee and assignment errors propagate unchanged
    pub fn generate(
        group: &Group,
        members: &[Member],
        mapping: Option<&OrganizerAssignment>,
        seed: LotterySeed,
        today: NaiveDate,
        bounds: &FeeBounds,
    ) -> Result<GeneratedSchedule, EngineError> {
        if group.status() != GroupStatus::Forming {
            return Err(EngineError::NotForming {
                group_id: group.id(),
                status: group.status(),
            });
        }

        let active: Vec<Member> = members.iter().filter(|m| m.is_active()).cloned().collect();
        let actual = u32::try_from(active.len()).unwrap_or(u32::MAX);
        if actual != group.members_limit() {
            return Err(EngineError::ActivationPrecondition {
                expected: group.members_limit(),
                actual,
            });
        }

        let fees = FeeCalculator::compute(
            group.contribution_amount(),
            group.members_limit(),
            &group.fee_policy(),
            bounds,
        )?;
        let order = PayoutOrderAssigner::assign(&active, group.payout_order_method(), mapping, seed)?;

        let users: HashMap<MemberId, &UserId> = active.iter().map(|m| (m.id, &m.user_id)).collect();

        let mut cycles = Vec::with_capacity(order.len());
        for (index, member_id) in (0u32..).zip(order.members.iter()) {
            let due_date = add_period(group.start_date(), group.frequency(), index).ok_or_else(|| {
                EngineError::validation("start_date", "schedule runs past the supported date range")
            })?;
            let payout_user_id = users
                .get(member_id)
                .map(|u| (*u).clone())
                .ok_or_else(|| EngineError::infrastructure("payout order names a non-member"))?;
            let status = if index == 0 && due_date <= today {
                CycleStatus::Open
            } else {
                CycleStatus::Upcoming
            };

            cycles.push(Cycle {
                id: CycleId::new(),
                group_id: group.id(),
                cycle_number: index + 1,
                due_date,
                payout_member_id: *member_id,
                payout_user_id,
                status,
            });
        }

        Ok(GeneratedSchedule {
            fees,
            order,
            cycles,
        })
    }
}
