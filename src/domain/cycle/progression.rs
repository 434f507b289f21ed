//! Cycle Progression - what a cycle's status should be on a given day.
//!
//! The engine owns no clock. A periodic trigger passes `today` in and
//! applies the returned single-step changes, so a cycle that skipped
//! several days still moves through every intermediate state.

use std::collections::HashSet;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::domain::foundation::CycleId;

use super::{Cycle, CycleStatus};

/// One validated status step for one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChange {
    pub cycle_id: CycleId,
    pub cycle_number: u32,
    pub from: CycleStatus,
    pub to: CycleStatus,
}

/// Stateless progression rules.
pub struct CycleProgression;

impl CycleProgression {
    /// Target status of `cycle` on `today`.
    pub fn evaluate(cycle: &Cycle, today: NaiveDate, funded: bool, grace_days: u32) -> CycleStatus {
        if cycle.status == CycleStatus::Completed {
            return CycleStatus::Completed;
        }
        if today < cycle.due_date {
            return CycleStatus::Upcoming;
        }
        if funded {
            return CycleStatus::Completed;
        }
        let grace_end = cycle
            .due_date
            .checked_add_days(Days::new(u64::from(grace_days)))
            .unwrap_or(NaiveDate::MAX);
        if today >= grace_end {
            CycleStatus::Missed
        } else {
            CycleStatus::Open
        }
    }

    /// Evaluates a whole schedule in cycle-number order.
    ///
    /// Returns the single steps needed, in application order. A cycle is
    /// held `Upcoming` while its predecessor remains `Upcoming`.
    pub fn advance_schedule(
        cycles: &[Cycle],
        today: NaiveDate,
        funded_cycles: &HashSet<u32>,
        grace_days: u32,
    ) -> Vec<StatusChange> {
        let mut ordered: Vec<&Cycle> = cycles.iter().collect();
        ordered.sort_by_key(|c| c.cycle_number);

        let mut changes = Vec::new();
        let mut predecessor_upcoming = false;

        for cycle in ordered {
            let target = if predecessor_upcoming {
                CycleStatus::Upcoming
            } else {
                let funded = funded_cycles.contains(&cycle.cycle_number);
                Self::evaluate(cycle, today, funded, grace_days)
            };

            let steps = path(cycle.status, target);
            let mut from = cycle.status;
            for to in steps {
                changes.push(StatusChange {
                    cycle_id: cycle.id,
                    cycle_number: cycle.cycle_number,
                    from,
                    to,
                });
                from = to;
            }

            predecessor_upcoming = from == CycleStatus::Upcoming;
        }

        changes
    }
}

/// Valid single steps from `from` to `to`; empty when no forward path exists.
fn path(from: CycleStatus, to: CycleStatus) -> Vec<CycleStatus> {
    use CycleStatus::*;
    match (from, to) {
        (Upcoming, Open) => vec![Open],
        (Upcoming, Completed) => vec![Open, Completed],
        (Upcoming, Missed) => vec![Open, Missed],
        (Open, Completed) | (Open, Missed) | (Missed, Completed) => vec![to],
        _ => vec![],
    }
}
