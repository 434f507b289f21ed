//! In-memory MemberReader.

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, GroupId};
use crate::domain::group::Member;
use crate::ports::MemberReader;

/// Member roster kept in insertion order.
#[derive(Debug, Default)]
pub struct InMemoryMemberStore {
    members: RwLock<Vec<Member>>,
}

impl InMemoryMemberStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add(&self, member: Member) {
        self.members.write().await.push(member);
    }

    pub async fn add_all(&self, members: impl IntoIterator<Item = Member>) {
        self.members.write().await.extend(members);
    }

    async fn by_group(&self, group_id: &GroupId, active_only: bool) -> Vec<Member> {
        let mut found: Vec<Member> = self
            .members
            .read()
            .await
            .iter()
            .filter(|m| &m.group_id == group_id && (!active_only || m.is_active()))
            .cloned()
            .collect();
        found.sort_by(|a, b| a.joined_at.cmp(&b.joined_at).then(a.id.cmp(&b.id)));
        found
    }
}

#[async_trait]
impl MemberReader for InMemoryMemberStore {
    async fn find_active_by_group(&self, group_id: &GroupId) -> Result<Vec<Member>, DomainError> {
        Ok(self.by_group(group_id, true).await)
    }

    async fn find_by_group(&self, group_id: &GroupId) -> Result<Vec<Member>, DomainError> {
        Ok(self.by_group(group_id, false).await)
    }
}
