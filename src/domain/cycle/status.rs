//! CycleStatus enum for tracking a payout cycle's lifecycle.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::StateMachine;

/// Lifecycle status of one payout cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CycleStatus {
    /// Due date not reached yet.
    #[default]
    Upcoming,
    /// Contributions are being collected.
    Open,
    /// Pool funded and paid out.
    Completed,
    /// Grace period elapsed without a funded pool.
    Missed,
}

impl CycleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CycleStatus::Upcoming => "upcoming",
            CycleStatus::Open => "open",
            CycleStatus::Completed => "completed",
            CycleStatus::Missed => "missed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "upcoming" => Some(CycleStatus::Upcoming),
            "open" => Some(CycleStatus::Open),
            "completed" => Some(CycleStatus::Completed),
            "missed" => Some(CycleStatus::Missed),
            _ => None,
        }
    }

    /// Returns true once the due date has been reached.
    pub fn is_started(&self) -> bool {
        !matches!(self, CycleStatus::Upcoming)
    }
}

impl StateMachine for CycleStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use CycleStatus::*;
        matches!(
            (self, target),
            (Upcoming, Open) | (Open, Completed) | (Open, Missed) | (Missed, Completed)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use CycleStatus::*;
        match self {
            Upcoming => vec![Open],
            Open => vec![Completed, Missed],
            Missed => vec![Completed],
            Completed => vec![],
        }
    }
}

impl fmt::Display for CycleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
