//! Group repository port (write side).
//!
//! Defines the contract for persisting and retrieving Group aggregates.
//! Groups are created by the onboarding flow outside this crate; the engine
//! only loads them and saves status changes.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, GroupId};
use crate::domain::group::Group;

/// Repository port for Group aggregate persistence.
#[async_trait]
pub trait GroupRepository: Send + Sync {
    /// Find a group by its ID.
    ///
    /// Returns `None` if not found.
    async fn find_by_id(&self, id: &GroupId) -> Result<Option<Group>, DomainError>;

    /// Update an existing group.
    ///
    /// # Errors
    ///
    /// - `GroupNotFound` if the group doesn't exist
    /// - `DatabaseError` on persistence failure
    async fn update(&self, group: &Group) -> Result<(), DomainError>;

    /// All groups currently in `Active` status.
    ///
    /// Used by the periodic status sweep.
    async fn find_active(&self) -> Result<Vec<Group>, DomainError>;
}
