//! Member reader port (read side).
//!
//! Membership approval lives outside the engine; this port only exposes
//! the roster a group has at the moment it is read.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, GroupId};
use crate::domain::group::Member;

/// Reader port for group rosters.
#[async_trait]
pub trait MemberReader: Send + Sync {
    /// Active members of a group, in join order.
    async fn find_active_by_group(&self, group_id: &GroupId) -> Result<Vec<Member>, DomainError>;

    /// Every member of a group regardless of status, in join order.
    ///
    /// Calendar and report consumers need removed members to resolve
    /// historical payout recipients.
    async fn find_by_group(&self, group_id: &GroupId) -> Result<Vec<Member>, DomainError>;
}
