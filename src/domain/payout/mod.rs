//! Payout domain - fee computation and payout ordering.

mod fee_calculator;
mod order_assigner;

pub use fee_calculator::{FeeBreakdown, FeeCalculator};
pub use order_assigner::{
    LotterySeed, OrganizerAssignment, PayoutOrder, PayoutOrderAssigner, SlotAssignment,
};
