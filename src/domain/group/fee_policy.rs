//! Organizer fee policy value objects.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::{Money, ValidationError};

/// Basis points in one hundred percent.
pub const BASIS_POINTS_PER_WHOLE: u32 = 10_000;

/// A percentage expressed in basis points (1% = 100 bps).
///
/// Basis points keep fractional rates such as 2.5% exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeeRate(u32);

impl FeeRate {
    pub const ZERO: Self = Self(0);
    pub const HUNDRED_PERCENT: Self = Self(BASIS_POINTS_PER_WHOLE);

    /// Creates a rate from basis points, rejecting anything above 100%.
    pub fn from_basis_points(bps: u32) -> Result<Self, ValidationError> {
        if bps > BASIS_POINTS_PER_WHOLE {
            return Err(ValidationError::out_of_range(
                "fee_percentage_bps",
                0,
                i64::from(BASIS_POINTS_PER_WHOLE),
                i64::from(bps),
            ));
        }
        Ok(Self(bps))
    }

    /// Creates a rate from whole percent (5 = 5%).
    pub fn from_percent(percent: u32) -> Result<Self, ValidationError> {
        if percent > 100 {
            return Err(ValidationError::out_of_range(
                "fee_percentage",
                0,
                100,
                i64::from(percent),
            ));
        }
        Ok(Self(percent * 100))
    }

    pub fn basis_points(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for FeeRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}%", self.0 / 100, self.0 % 100)
    }
}

/// Configured bounds for percentage fees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeBounds {
    pub min: FeeRate,
    pub max: FeeRate,
}

impl FeeBounds {
    /// Every representable rate.
    pub const UNBOUNDED: Self = Self {
        min: FeeRate::ZERO,
        max: FeeRate::HUNDRED_PERCENT,
    };

    pub fn new(min: FeeRate, max: FeeRate) -> Result<Self, ValidationError> {
        if min > max {
            return Err(ValidationError::invalid_format(
                "fee_bounds",
                format!("minimum {} exceeds maximum {}", min, max),
            ));
        }
        Ok(Self { min, max })
    }

    pub fn contains(&self, rate: FeeRate) -> bool {
        rate >= self.min && rate <= self.max
    }
}

impl Default for FeeBounds {
    /// 0% to 20%.
    fn default() -> Self {
        Self {
            min: FeeRate::ZERO,
            max: FeeRate(2_000),
        }
    }
}

/// Discriminant of a fee policy, as stored alongside the group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeeType {
    Percentage,
    Fixed,
}

impl FeeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeeType::Percentage => "percentage",
            FeeType::Fixed => "fixed",
        }
    }
}

/// How the organizer fee is deducted from each cycle's pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum FeePolicy {
    /// A share of the gross pool.
    Percentage(FeeRate),
    /// A flat amount per cycle.
    Fixed(Money),
}

impl FeePolicy {
    /// No organizer fee.
    pub fn none() -> Self {
        FeePolicy::Fixed(Money::ZERO)
    }

    pub fn fee_type(&self) -> FeeType {
        match self {
            FeePolicy::Percentage(_) => FeeType::Percentage,
            FeePolicy::Fixed(_) => FeeType::Fixed,
        }
    }

    /// Rebuilds a policy from its persisted (type, raw value) pair.
    ///
    /// Percentage values are basis points; fixed values are minor units.
    pub fn from_parts(fee_type: &str, value: i64) -> Result<Self, ValidationError> {
        match fee_type {
            "percentage" => {
                let bps = u32::try_from(value).map_err(|_| {
                    ValidationError::out_of_range(
                        "fee_percentage_bps",
                        0,
                        i64::from(BASIS_POINTS_PER_WHOLE),
                        value,
                    )
                })?;
                Ok(FeePolicy::Percentage(FeeRate::from_basis_points(bps)?))
            }
            "fixed" => Ok(FeePolicy::Fixed(Money::from_minor(value))),
            other => Err(ValidationError::invalid_format(
                "fee_type",
                format!("unknown fee type '{}'", other),
            )),
        }
    }

    /// Raw value for persistence, the inverse of [`FeePolicy::from_parts`].
    pub fn raw_value(&self) -> i64 {
        match self {
            FeePolicy::Percentage(rate) => i64::from(rate.basis_points()),
            FeePolicy::Fixed(amount) => amount.minor_units(),
        }
    }
}
