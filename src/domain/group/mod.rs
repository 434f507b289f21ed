//! Group domain module.
//!
//! # Module Structure
//!
//! - `aggregate` - Group aggregate and its creation terms
//! - `status` - GroupStatus state machine
//! - `member` - Member entity, role and status
//! - `frequency` - Contribution frequency and calendar date stepping
//! - `fee_policy` - Organizer fee policy, rates and bounds
//! - `payout_method` - Payout order method
//! - `errors` - Engine error taxonomy
//! - `events` - Group lifecycle events

mod aggregate;
mod errors;
mod events;
mod fee_policy;
mod frequency;
mod member;
mod payout_method;
mod status;

#[cfg(test)]
pub(crate) use aggregate::test_support;
pub use aggregate::{Group, GroupTerms};
pub use errors::{AssignmentDefect, EngineError};
pub use events::{GroupActivated, GroupCompleted};
pub use fee_policy::{FeeBounds, FeePolicy, FeeRate, FeeType, BASIS_POINTS_PER_WHOLE};
pub use frequency::{add_period, ContributionFrequency};
pub use member::{Member, MemberRole, MemberStatus};
pub use payout_method::PayoutOrderMethod;
pub use status::GroupStatus;
