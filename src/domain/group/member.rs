//! Group member entity.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{GroupId, MemberId, Timestamp, UserId};

/// Role a user plays inside one group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberRole {
    Organizer,
    Member,
}

impl MemberRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberRole::Organizer => "organizer",
            MemberRole::Member => "member",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "organizer" => Some(MemberRole::Organizer),
            "member" => Some(MemberRole::Member),
            _ => None,
        }
    }
}

/// Membership status within a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberStatus {
    /// Awaiting organizer approval.
    Pending,
    /// Participates in the rotation.
    Active,
    /// Left or was removed.
    Removed,
}

impl MemberStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberStatus::Pending => "pending",
            MemberStatus::Active => "active",
            MemberStatus::Removed => "removed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(MemberStatus::Pending),
            "active" => Some(MemberStatus::Active),
            "removed" => Some(MemberStatus::Removed),
            _ => None,
        }
    }
}

/// A user's membership in exactly one group.
///
/// `group_id` is a lookup reference; the group owns the member collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,
    pub group_id: GroupId,
    pub user_id: UserId,
    pub role: MemberRole,
    pub status: MemberStatus,
    pub joined_at: Timestamp,
}

impl Member {
    /// Creates an active member.
    pub fn active(group_id: GroupId, user_id: UserId, role: MemberRole, joined_at: Timestamp) -> Self {
        Self {
            id: MemberId::new(),
            group_id,
            user_id,
            role,
            status: MemberStatus::Active,
            joined_at,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == MemberStatus::Active
    }

    pub fn is_organizer(&self) -> bool {
        self.role == MemberRole::Organizer
    }
}
