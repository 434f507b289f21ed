//! PreviewFeesHandler - Query handler for a group's fee breakdown.
//!
//! Lets an organizer see gross pool, fee and net payout before activating,
//! optionally for a fee policy they are considering.

use std::sync::Arc;

use crate::domain::foundation::GroupId;
use crate::domain::group::{EngineError, FeeBounds, FeePolicy};
use crate::domain::payout::{FeeBreakdown, FeeCalculator};
use crate::ports::GroupRepository;

/// Query for a fee preview.
#[derive(Debug, Clone)]
pub struct PreviewFeesQuery {
    pub group_id: GroupId,
    /// Policy to evaluate instead of the group's current one.
    pub fee_policy: Option<FeePolicy>,
}

pub struct PreviewFeesHandler {
    group_repository: Arc<dyn GroupRepository>,
    fee_bounds: FeeBounds,
}

impl PreviewFeesHandler {
    pub fn new(group_repository: Arc<dyn GroupRepository>, fee_bounds: FeeBounds) -> Self {
        Self {
            group_repository,
            fee_bounds,
        }
    }

    pub async fn handle(&self, query: PreviewFeesQuery) -> Result<FeeBreakdown, EngineError> {
        let group = self
            .group_repository
            .find_by_id(&query.group_id)
            .await?
            .ok_or(EngineError::GroupNotFound(query.group_id))?;

        let policy = query.fee_policy.unwrap_or_else(|| group.fee_policy());
        FeeCalculator::compute(
            group.contribution_amount(),
            group.members_limit(),
            &policy,
            &self.fee_bounds,
        )
    }
}
