//! Cycle events.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{domain_event, CycleId, EventId, GroupId, Timestamp};

use super::CycleStatus;

/// A cycle took one status step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleStatusChanged {
    pub event_id: EventId,
    pub cycle_id: CycleId,
    pub group_id: GroupId,
    pub cycle_number: u32,
    pub from: CycleStatus,
    pub to: CycleStatus,
    pub occurred_at: Timestamp,
}

domain_event!(
    CycleStatusChanged,
    event_type = "cycle.status_changed.v1",
    aggregate_id = cycle_id,
    aggregate_type = "Cycle",
    occurred_at = occurred_at,
    event_id = event_id
);
