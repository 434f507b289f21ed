//! Contribution frequency and calendar date stepping.

use chrono::{Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How often members contribute, and therefore how far apart cycles are.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContributionFrequency {
    Weekly,
    Biweekly,
    Monthly,
}

impl ContributionFrequency {
    /// Returns `date` advanced by `n` periods of this frequency.
    ///
    /// Monthly steps clamp to the last valid day of the target month
    /// (Jan 31 + 1 month = Feb 28/29). Returns `None` only when the result
    /// falls outside chrono's supported date range.
    pub fn add_periods(&self, date: NaiveDate, n: u32) -> Option<NaiveDate> {
        match self {
            ContributionFrequency::Weekly => date.checked_add_days(Days::new(7 * u64::from(n))),
            ContributionFrequency::Biweekly => {
                date.checked_add_days(Days::new(14 * u64::from(n)))
            }
            ContributionFrequency::Monthly => date.checked_add_months(Months::new(n)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ContributionFrequency::Weekly => "weekly",
            ContributionFrequency::Biweekly => "biweekly",
            ContributionFrequency::Monthly => "monthly",
        }
    }

    /// Parses the persisted snake_case form.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "weekly" => Some(ContributionFrequency::Weekly),
            "biweekly" => Some(ContributionFrequency::Biweekly),
            "monthly" => Some(ContributionFrequency::Monthly),
            _ => None,
        }
    }
}

impl fmt::Display for ContributionFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Returns `date` advanced by `n` periods of `frequency`.
pub fn add_period(date: NaiveDate, frequency: ContributionFrequency, n: u32) -> Option<NaiveDate> {
    frequency.add_periods(date, n)
}
