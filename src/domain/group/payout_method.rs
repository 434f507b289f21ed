//! Payout order method.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Policy that decides the sequence in which members receive the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayoutOrderMethod {
    /// Join order.
    Fixed,
    /// Seeded uniform shuffle.
    Lottery,
    /// Explicit mapping supplied by the organizer.
    OrganizerAssigned,
}

impl PayoutOrderMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PayoutOrderMethod::Fixed => "fixed",
            PayoutOrderMethod::Lottery => "lottery",
            PayoutOrderMethod::OrganizerAssigned => "organizer_assigned",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "fixed" => Some(PayoutOrderMethod::Fixed),
            "lottery" => Some(PayoutOrderMethod::Lottery),
            "organizer_assigned" => Some(PayoutOrderMethod::OrganizerAssigned),
            _ => None,
        }
    }
}

impl fmt::Display for PayoutOrderMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
