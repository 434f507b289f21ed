//! In-memory CycleRepository.
//!
//! `create_schedule` checks and inserts under a single write lock, so two
//! concurrent activations cannot both succeed.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::domain::cycle::{Cycle, CycleStatus};
use crate::domain::foundation::{CycleId, DomainError, ErrorCode, GroupId};
use crate::ports::CycleRepository;

/// Schedules keyed by group id.
#[derive(Debug, Default)]
pub struct InMemoryCycleRepository {
    schedules: RwLock<HashMap<GroupId, Vec<Cycle>>>,
}

impl InMemoryCycleRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CycleRepository for InMemoryCycleRepository {
    async fn exists_for_group(&self, group_id: &GroupId) -> Result<bool, DomainError> {
        Ok(self
            .schedules
            .read()
            .await
            .get(group_id)
            .is_some_and(|cycles| !cycles.is_empty()))
    }

    async fn create_schedule(&self, group_id: &GroupId, cycles: &[Cycle]) -> Result<(), DomainError> {
        let mut schedules = self.schedules.write().await;
        if schedules.get(group_id).is_some_and(|c| !c.is_empty()) {
            return Err(DomainError::new(
                ErrorCode::AlreadyGenerated,
                format!("Cycles already generated for group {}", group_id),
            )
            .with_detail("group_id", group_id.to_string()));
        }

        let mut ordered = cycles.to_vec();
        ordered.sort_by_key(|c| c.cycle_number);
        schedules.insert(*group_id, ordered);
        Ok(())
    }

    async fn find_by_group(&self, group_id: &GroupId) -> Result<Vec<Cycle>, DomainError> {
        Ok(self
            .schedules
            .read()
            .await
            .get(group_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn update_status(&self, id: &CycleId, status: CycleStatus) -> Result<(), DomainError> {
        let mut schedules = self.schedules.write().await;
        let cycle = schedules
            .values_mut()
            .flat_map(|cycles| cycles.iter_mut())
            .find(|c| &c.id == id)
            .ok_or_else(|| DomainError::new(ErrorCode::CycleNotFound, format!("Cycle not found: {}", id)))?;
        cycle.status = status;
        Ok(())
    }

    async fn delete_schedule(&self, group_id: &GroupId) -> Result<(), DomainError> {
        self.schedules.write().await.remove(group_id);
        Ok(())
    }
}
