//! In-memory GroupRepository for tests and embedding callers.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, ErrorCode, GroupId};
use crate::domain::group::{Group, GroupStatus};
use crate::ports::GroupRepository;

/// Groups keyed by id behind a `tokio::sync::RwLock`.
#[derive(Debug, Default)]
pub struct InMemoryGroupRepository {
    groups: RwLock<HashMap<GroupId, Group>>,
}

impl InMemoryGroupRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a group, replacing any group with the same id.
    pub async fn insert(&self, group: Group) {
        self.groups.write().await.insert(group.id(), group);
    }
}

#[async_trait]
impl GroupRepository for InMemoryGroupRepository {
    async fn find_by_id(&self, id: &GroupId) -> Result<Option<Group>, DomainError> {
        Ok(self.groups.read().await.get(id).cloned())
    }

    async fn update(&self, group: &Group) -> Result<(), DomainError> {
        let mut groups = self.groups.write().await;
        match groups.get_mut(&group.id()) {
            Some(stored) => {
                *stored = group.clone();
                Ok(())
            }
            None => Err(DomainError::new(
                ErrorCode::GroupNotFound,
                format!("Group not found: {}", group.id()),
            )
            .with_detail("group_id", group.id().to_string())),
        }
    }

    async fn find_active(&self) -> Result<Vec<Group>, DomainError> {
        let mut active: Vec<Group> = self
            .groups
            .read()
            .await
            .values()
            .filter(|g| g.status() == GroupStatus::Active)
            .cloned()
            .collect();
        active.sort_by_key(|g| g.id());
        Ok(active)
    }
}
