//! Fee Calculator - gross pool, organizer fee and net payout.
//!
//! # Design Decisions
//!
//! - **Integer arithmetic**: percentages are basis points and the fee is
//!   computed on minor units with round-half-up
//! - **Pool-level fee**: the fee is charged against each cycle's pool, never
//!   split per member
//! - **Computed once**: fees are fixed for a group's lifetime, so the
//!   generator calls this exactly once per activation

use serde::{Deserialize, Serialize};

use crate::domain::foundation::Money;
use crate::domain::group::{EngineError, FeeBounds, FeePolicy, BASIS_POINTS_PER_WHOLE};

/// Result of a fee computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeBreakdown {
    /// contribution × members_limit
    pub gross_pool: Money,
    pub fee_amount: Money,
    /// gross_pool − fee_amount
    pub net_payout: Money,
}

/// Stateless fee computation service.
pub struct FeeCalculator;

impl FeeCalculator {
    /// Computes the per-cycle fee breakdown for a group's terms.
    ///
    /// # Errors
    ///
    /// `InvalidFeeConfiguration` when the contribution is not positive, the
    /// member limit is zero, a percentage lies outside `bounds`, a fixed fee
    /// is negative or not below the gross pool, or the arithmetic overflows.
    pub fn compute(
        contribution: Money,
        members_limit: u32,
        policy: &FeePolicy,
        bounds: &FeeBounds,
    ) -> Result<FeeBreakdown, EngineError> {
        if !contribution.is_positive() {
            return Err(EngineError::invalid_fee(format!(
                "contribution must be positive, got {}",
                contribution
            )));
        }
        if members_limit == 0 {
            return Err(EngineError::invalid_fee("members limit must be at least 1"));
        }

        let gross_pool = contribution
            .checked_mul(i64::from(members_limit))
            .ok_or_else(|| EngineError::invalid_fee("gross pool overflows"))?;

        let fee_amount = match policy {
            FeePolicy::Percentage(rate) => {
                if !bounds.contains(*rate) {
                    return Err(EngineError::invalid_fee(format!(
                        "percentage {} outside allowed range {}..={}",
                        rate, bounds.min, bounds.max
                    )));
                }
                percentage_of(gross_pool, rate.basis_points())?
            }
            FeePolicy::Fixed(amount) => {
                if amount.is_negative() {
                    return Err(EngineError::invalid_fee(format!(
                        "fixed fee must not be negative, got {}",
                        amount
                    )));
                }
                if *amount >= gross_pool {
                    return Err(EngineError::invalid_fee(format!(
                        "fixed fee {} must be below the gross pool {}",
                        amount, gross_pool
                    )));
                }
                *amount
            }
        };

        let net_payout = gross_pool
            .checked_sub(fee_amount)
            .filter(|net| !net.is_negative())
            .ok_or_else(|| EngineError::invalid_fee("net payout would be negative"))?;

        Ok(FeeBreakdown {
            gross_pool,
            fee_amount,
            net_payout,
        })
    }

    /// Breakdown for terms already accepted at activation.
    ///
    /// The percentage is not re-checked against the configured bounds; those
    /// only gate activation and previews.
    pub fn breakdown(
        contribution: Money,
        members_limit: u32,
        policy: &FeePolicy,
    ) -> Result<FeeBreakdown, EngineError> {
        Self::compute(contribution, members_limit, policy, &FeeBounds::UNBOUNDED)
    }
}

/// `round_half_up(amount × bps / 10_000)` for non-negative amounts.
fn percentage_of(amount: Money, bps: u32) -> Result<Money, EngineError> {
    let whole = i128::from(BASIS_POINTS_PER_WHOLE);
    let scaled = i128::from(amount.minor_units()) * i128::from(bps);
    let rounded = (scaled + whole / 2) / whole;
    i64::try_from(rounded)
        .map(Money::from_minor)
        .map_err(|_| EngineError::invalid_fee("fee amount overflows"))
}
