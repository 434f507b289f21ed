//! Cycle repository port.
//!
//! Defines the contract for persisting a group's cycle schedule.
//!
//! # Design
//!
//! - **Atomic schedule**: all N cycles are written together or not at all
//! - **Status-only updates**: due dates and payout members are immutable
//!   after generation, so the only mutation is `update_status`

use async_trait::async_trait;

use crate::domain::cycle::{Cycle, CycleStatus};
use crate::domain::foundation::{CycleId, DomainError, GroupId};

/// Repository port for cycle schedules.
#[async_trait]
pub trait CycleRepository: Send + Sync {
    /// Returns true if any cycle exists for the group.
    async fn exists_for_group(&self, group_id: &GroupId) -> Result<bool, DomainError>;

    /// Persist a complete schedule as one atomic unit.
    ///
    /// # Errors
    ///
    /// - `AlreadyGenerated` if the group already has cycles; the existing
    ///   schedule is left untouched
    /// - `DatabaseError` on persistence failure, with nothing written
    async fn create_schedule(&self, group_id: &GroupId, cycles: &[Cycle]) -> Result<(), DomainError>;

    /// All cycles of a group ordered by cycle number.
    async fn find_by_group(&self, group_id: &GroupId) -> Result<Vec<Cycle>, DomainError>;

    /// Persist a status step.
    ///
    /// # Errors
    ///
    /// - `CycleNotFound` if the cycle doesn't exist
    /// - `DatabaseError` on persistence failure
    async fn update_status(&self, id: &CycleId, status: CycleStatus) -> Result<(), DomainError>;

    /// Removes a group's whole schedule. Only used to undo an activation
    /// whose group update failed after the schedule was written.
    async fn delete_schedule(&self, group_id: &GroupId) -> Result<(), DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn CycleRepository) {}
    }
}
