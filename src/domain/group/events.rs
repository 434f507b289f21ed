//! Group lifecycle events.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{domain_event, EventId, GroupId, Money, Timestamp};

use super::PayoutOrderMethod;

/// The cycle schedule was generated and the group became active.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupActivated {
    pub event_id: EventId,
    pub group_id: GroupId,
    pub cycle_count: u32,
    pub payout_order_method: PayoutOrderMethod,
    /// Seed that drove a lottery draw, kept for audit and replay.
    pub lottery_seed: Option<u64>,
    pub gross_pool: Money,
    pub fee_amount: Money,
    pub net_payout: Money,
    pub first_due_date: NaiveDate,
    pub last_due_date: NaiveDate,
    pub occurred_at: Timestamp,
}

domain_event!(
    GroupActivated,
    event_type = "group.activated.v1",
    aggregate_id = group_id,
    aggregate_type = "Group",
    occurred_at = occurred_at,
    event_id = event_id
);

/// Every cycle of the group completed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupCompleted {
    pub event_id: EventId,
    pub group_id: GroupId,
    pub occurred_at: Timestamp,
}

domain_event!(
    GroupCompleted,
    event_type = "group.completed.v1",
    aggregate_id = group_id,
    aggregate_type = "Group",
    occurred_at = occurred_at,
    event_id = event_id
);
