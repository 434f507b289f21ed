//! Group aggregate - one rotating savings association.
//!
//! # Design Decisions
//!
//! - **Money in minor units**: contribution is an integer `Money`, never a float
//! - **Frozen terms**: fee policy and payout method are locked once the group
//!   leaves `Forming`, because generated cycles depend on them
//! - **Calendar dates**: the start date is a `NaiveDate`; schedules never
//!   depend on a time zone

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{GroupId, Money, StateMachine, Timestamp, UserId, ValidationError};

use super::{ContributionFrequency, EngineError, FeePolicy, GroupStatus, PayoutOrderMethod};

/// Terms a new group is created with.
#[derive(Debug, Clone)]
pub struct GroupTerms {
    pub name: String,
    pub organizer_id: UserId,
    pub members_limit: u32,
    pub contribution_amount: Money,
    pub frequency: ContributionFrequency,
    pub start_date: NaiveDate,
    pub payout_order_method: PayoutOrderMethod,
    pub fee_policy: FeePolicy,
}

/// Group aggregate root.
///
/// # Invariants
///
/// - `members_limit > 0`
/// - `contribution_amount > 0`
/// - fee policy and payout method change only while `Forming`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    id: GroupId,
    name: String,
    organizer_id: UserId,
    members_limit: u32,
    contribution_amount: Money,
    frequency: ContributionFrequency,
    start_date: NaiveDate,
    payout_order_method: PayoutOrderMethod,
    fee_policy: FeePolicy,
    status: GroupStatus,
    created_at: Timestamp,
    updated_at: Timestamp,
}

impl Group {
    /// Creates a new forming group.
    pub fn create(id: GroupId, terms: GroupTerms) -> Result<Self, ValidationError> {
        if terms.name.trim().is_empty() {
            return Err(ValidationError::empty_field("name"));
        }
        if terms.members_limit == 0 {
            return Err(ValidationError::out_of_range(
                "members_limit",
                1,
                i64::from(u32::MAX),
                0,
            ));
        }
        if !terms.contribution_amount.is_positive() {
            return Err(ValidationError::out_of_range(
                "contribution_amount",
                1,
                i64::MAX,
                terms.contribution_amount.minor_units(),
            ));
        }

        let now = Timestamp::now();
        Ok(Self {
            id,
            name: terms.name,
            organizer_id: terms.organizer_id,
            members_limit: terms.members_limit,
            contribution_amount: terms.contribution_amount,
            frequency: terms.frequency,
            start_date: terms.start_date,
            payout_order_method: terms.payout_order_method,
            fee_policy: terms.fee_policy,
            status: GroupStatus::Forming,
            created_at: now,
            updated_at: now,
        })
    }

    /// Reconstitutes a group from persisted data without validation.
    pub fn reconstitute(
        id: GroupId,
        terms: GroupTerms,
        status: GroupStatus,
        created_at: Timestamp,
        updated_at: Timestamp,
    ) -> Self {
        Self {
            id,
            name: terms.name,
            organizer_id: terms.organizer_id,
            members_limit: terms.members_limit,
            contribution_amount: terms.contribution_amount,
            frequency: terms.frequency,
            start_date: terms.start_date,
            payout_order_method: terms.payout_order_method,
            fee_policy: terms.fee_policy,
            status,
            created_at,
            updated_at,
        }
    }

    // ───────────────────────────────────────────────────────────────
    // Accessors
    // ───────────────────────────────────────────────────────────────

    pub fn id(&self) -> GroupId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn organizer_id(&self) -> &UserId {
        &self.organizer_id
    }

    /// Fixed capacity N; also the number of cycles.
    pub fn members_limit(&self) -> u32 {
        self.members_limit
    }

    pub fn contribution_amount(&self) -> Money {
        self.contribution_amount
    }

    pub fn frequency(&self) -> ContributionFrequency {
        self.frequency
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    pub fn payout_order_method(&self) -> PayoutOrderMethod {
        self.payout_order_method
    }

    pub fn fee_policy(&self) -> FeePolicy {
        self.fee_policy
    }

    pub fn status(&self) -> GroupStatus {
        self.status
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn updated_at(&self) -> Timestamp {
        self.updated_at
    }

    // ───────────────────────────────────────────────────────────────
    // Commands
    // ───────────────────────────────────────────────────────────────

    /// Changes the organizer fee; only allowed while forming.
    pub fn change_fee_policy(&mut self, policy: FeePolicy) -> Result<(), EngineError> {
        self.ensure_configurable("change fee policy")?;
        self.fee_policy = policy;
        self.touch();
        Ok(())
    }

    /// Changes the payout order method; only allowed while forming.
    pub fn change_payout_order_method(
        &mut self,
        method: PayoutOrderMethod,
    ) -> Result<(), EngineError> {
        self.ensure_configurable("change payout order method")?;
        self.payout_order_method = method;
        self.touch();
        Ok(())
    }

    /// Forming → Active, after the cycle schedule has been persisted.
    pub fn activate(&mut self) -> Result<(), EngineError> {
        self.transition(GroupStatus::Active, "activate")
    }

    /// Active → Completed, once every cycle has completed.
    pub fn complete(&mut self) -> Result<(), EngineError> {
        self.transition(GroupStatus::Completed, "complete")
    }

    /// Forming/Active → Cancelled.
    pub fn cancel(&mut self) -> Result<(), EngineError> {
        self.transition(GroupStatus::Cancelled, "cancel")
    }

    fn ensure_configurable(&self, attempted: &str) -> Result<(), EngineError> {
        if !self.status.is_configurable() {
            return Err(EngineError::invalid_state(self.status.as_str(), attempted));
        }
        Ok(())
    }

    fn transition(&mut self, target: GroupStatus, attempted: &str) -> Result<(), EngineError> {
        self.status = self
            .status
            .transition_to(target)
            .map_err(|_| EngineError::invalid_state(self.status.as_str(), attempted))?;
        self.touch();
        Ok(())
    }

    fn touch(&mut self) {
        self.updated_at = Timestamp::now();
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn create_starts_forming() {
        let group = group();
        assert_eq!(group.status(), GroupStatus::Forming);
        assert_eq!(group.members_limit(), 10);
    }

    #[test]
    fn create_rejects_zero_capacity() {
        let mut t = terms();
        t.members_limit = 0;
        assert!(Group::create(GroupId::new(), t).is_err());
    }

    #[test]
    fn create_rejects_non_positive_contribution() {
        let mut t = terms();
        t.contribution_amount = Money::ZERO;
        assert!(Group::create(GroupId::new(), t).is_err());
    }

    #[test]
    fn create_rejects_blank_name() {
        let mut t = terms();
        t.name = "   ".to_string();
        assert!(Group::create(GroupId::new(), t).is_err());
    }

    #[test]
    fn fee_policy_is_editable_while_forming() {
        let mut group = group();
        group.change_fee_policy(FeePolicy::Fixed(Money::from_minor(100))).unwrap();
        assert_eq!(group.fee_policy(), FeePolicy::Fixed(Money::from_minor(100)));
    }

    #[test]
    fn terms_freeze_after_activation() {
        let mut group = group();
        group.activate().unwrap();

        let fee = group.change_fee_policy(FeePolicy::none());
        assert!(matches!(fee, Err(EngineError::InvalidState { .. })));

        let method = group.change_payout_order_method(PayoutOrderMethod::Lottery);
        assert!(matches!(method, Err(EngineError::InvalidState { .. })));
        assert_eq!(group.payout_order_method(), PayoutOrderMethod::Fixed);
    }

    #[test]
    fn cannot_complete_forming_group() {
        let mut group = group();
        assert!(group.complete().is_err());
        assert_eq!(group.status(), GroupStatus::Forming);
    }

    #[test]
    fn active_group_completes() {
        let mut group = group();
        group.activate().unwrap();
        group.complete().unwrap();
        assert_eq!(group.status(), GroupStatus::Completed);
    }
}
