//! Group status state machine.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::StateMachine;

/// Lifecycle status of a savings group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GroupStatus {
    /// Accepting members; no cycles exist yet.
    #[default]
    Forming,
    /// Cycles generated; rotation in progress.
    Active,
    /// Every cycle completed.
    Completed,
    /// Abandoned by the organizer.
    Cancelled,
}

impl GroupStatus {
    /// Returns true while fee policy and payout method may still change.
    pub fn is_configurable(&self) -> bool {
        matches!(self, GroupStatus::Forming)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GroupStatus::Forming => "forming",
            GroupStatus::Active => "active",
            GroupStatus::Completed => "completed",
            GroupStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "forming" => Some(GroupStatus::Forming),
            "active" => Some(GroupStatus::Active),
            "completed" => Some(GroupStatus::Completed),
            "cancelled" => Some(GroupStatus::Cancelled),
            _ => None,
        }
    }
}

impl StateMachine for GroupStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use GroupStatus::*;
        matches!(
            (self, target),
            (Forming, Active) | (Forming, Cancelled) | (Active, Completed) | (Active, Cancelled)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use GroupStatus::*;
        match self {
            Forming => vec![Active, Cancelled],
            Active => vec![Completed, Cancelled],
            Completed => vec![],
            Cancelled => vec![],
        }
    }
}

impl fmt::Display for GroupStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
