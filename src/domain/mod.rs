//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (value objects, IDs, errors, events)
//! - `group` - Group aggregate, members, fee policy and the engine error taxonomy
//! - `payout` - Fee Calculator and Payout Order Assigner
//! - `cycle` - Cycle records, status machine, schedule generation and progression
//! - `ledger` - Ledger entries, reconciliation and the calendar projection

pub mod cycle;
pub mod foundation;
pub mod group;
pub mod ledger;
pub mod payout;
