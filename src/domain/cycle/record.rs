//! Cycle record - one rotation period of a group.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{CycleId, GroupId, MemberId, StateMachine, UserId};
use crate::domain::group::EngineError;

use super::CycleStatus;

/// One payout cycle.
///
/// Everything except `status` is fixed at generation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cycle {
    pub id: CycleId,
    pub group_id: GroupId,
    /// 1-based, contiguous within the group.
    pub cycle_number: u32,
    pub due_date: NaiveDate,
    pub payout_member_id: MemberId,
    pub payout_user_id: UserId,
    pub status: CycleStatus,
}

impl Cycle {
    /// Applies a single validated status step.
    pub fn transition_to(&mut self, target: CycleStatus) -> Result<(), EngineError> {
        self.status = self.status.transition_to(target).map_err(|_| {
            EngineError::invalid_state(
                format!("cycle {} {}", self.cycle_number, self.status),
                format!("move to {}", target),
            )
        })?;
        Ok(())
    }

    pub fn pays_out_to(&self, user_id: &UserId) -> bool {
        &self.payout_user_id == user_id
    }
}
