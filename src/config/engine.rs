//! Engine configuration - fee bounds, grace period, payout timing and the
//! lottery seed.

use serde::Deserialize;

use crate::domain::group::{FeeBounds, FeeRate, BASIS_POINTS_PER_WHOLE};
use crate::domain::payout::LotterySeed;

use super::error::ValidationError;

/// Tunables for schedule generation and status progression.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct EngineConfig {
    /// Lowest organizer fee percentage accepted, in basis points
    #[serde(default)]
    pub min_fee_percentage_bps: u32,

    /// Highest organizer fee percentage accepted, in basis points
    #[serde(default = "default_max_fee_bps")]
    pub max_fee_percentage_bps: u32,

    /// Days after the due date before an unfunded cycle is missed
    #[serde(default = "default_grace_period_days")]
    pub grace_period_days: u32,

    /// Days between a cycle's due date and its payout date
    #[serde(default)]
    pub payout_delay_days: u32,

    /// Fixed lottery seed for reproducible draws outside production
    #[serde(default)]
    pub lottery_seed: Option<u64>,
}

impl EngineConfig {
    /// Fee bounds as a domain value.
    pub fn fee_bounds(&self) -> Result<FeeBounds, ValidationError> {
        self.check_fee_bounds()?;
        let min = FeeRate::from_basis_points(self.min_fee_percentage_bps)
            .map_err(|_| ValidationError::FeeAboveHundredPercent(self.min_fee_percentage_bps))?;
        let max = FeeRate::from_basis_points(self.max_fee_percentage_bps)
            .map_err(|_| ValidationError::FeeAboveHundredPercent(self.max_fee_percentage_bps))?;
        FeeBounds::new(min, max).map_err(|_| ValidationError::InvalidFeeBounds {
            min: self.min_fee_percentage_bps,
            max: self.max_fee_percentage_bps,
        })
    }

    /// Seed source for lottery draws. A configured seed is ignored in
    /// production.
    pub fn lottery_seed(&self, is_production: bool) -> LotterySeed {
        match self.lottery_seed {
            Some(seed) if !is_production => LotterySeed::Fixed(seed),
            _ => LotterySeed::Entropy,
        }
    }

    pub fn validate(&self, is_production: bool) -> Result<(), ValidationError> {
        self.check_fee_bounds()?;
        if is_production && self.lottery_seed.is_some() {
            return Err(ValidationError::FixedLotterySeedInProduction);
        }
        Ok(())
    }

    fn check_fee_bounds(&self) -> Result<(), ValidationError> {
        if self.max_fee_percentage_bps > BASIS_POINTS_PER_WHOLE {
            return Err(ValidationError::FeeAboveHundredPercent(self.max_fee_percentage_bps));
        }
        if self.min_fee_percentage_bps > self.max_fee_percentage_bps {
            return Err(ValidationError::InvalidFeeBounds {
                min: self.min_fee_percentage_bps,
                max: self.max_fee_percentage_bps,
            });
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_fee_percentage_bps: 0,
            max_fee_percentage_bps: default_max_fee_bps(),
            grace_period_days: default_grace_period_days(),
            payout_delay_days: 0,
            lottery_seed: None,
        }
    }
}

fn default_max_fee_bps() -> u32 {
    2000
}

fn default_grace_period_days() -> u32 {
    3
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_allow_up_to_twenty_percent() {
        let config = EngineConfig::default();
        let bounds = config.fee_bounds().unwrap();

        assert!(bounds.contains(FeeRate::from_basis_points(2000).unwrap()));
        assert!(!bounds.contains(FeeRate::from_basis_points(2001).unwrap()));
        assert_eq!(config.grace_period_days, 3);
        assert_eq!(config.payout_delay_days, 0);
    }

    #[test]
    fn inverted_bounds_fail_validation() {
        let config = EngineConfig {
            min_fee_percentage_bps: 500,
            max_fee_percentage_bps: 100,
            ..EngineConfig::default()
        };

        assert_eq!(
            config.validate(false),
            Err(ValidationError::InvalidFeeBounds { min: 500, max: 100 })
        );
        assert!(config.fee_bounds().is_err());
    }

    #[test]
    fn max_above_hundred_percent_fails_validation() {
        let config = EngineConfig {
            max_fee_percentage_bps: 10_001,
            ..EngineConfig::default()
        };

        assert_eq!(
            config.validate(false),
            Err(ValidationError::FeeAboveHundredPercent(10_001))
        );
    }

    #[test]
    fn fixed_seed_only_honoured_outside_production() {
        let config = EngineConfig {
            lottery_seed: Some(42),
            ..EngineConfig::default()
        };

        assert_eq!(config.lottery_seed(false), LotterySeed::Fixed(42));
        assert_eq!(config.lottery_seed(true), LotterySeed::Entropy);
        assert_eq!(
            config.validate(true),
            Err(ValidationError::FixedLotterySeedInProduction)
        );
        assert!(config.validate(false).is_ok());
    }

    #[test]
    fn no_seed_means_entropy() {
        assert_eq!(EngineConfig::default().lottery_seed(false), LotterySeed::Entropy);
    }
}
