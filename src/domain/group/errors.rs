//! Cycle and payout engine error types.
//!
//! # Taxonomy
//!
//! | Error | Caller action |
//! |-------|---------------|
//! | InvalidFeeConfiguration | fix fee inputs |
//! | IncompleteAssignment | organizer corrects the mapping |
//! | ActivationPrecondition / NotForming | organizer fixes membership; group stays forming |
//! | AlreadyGenerated | benign no-op for retried activations |
//! | PaymentConflict | re-read the entry and apply the payment again |
//! | Infrastructure | retry at the caller's discretion |

use std::str::FromStr;

use thiserror::Error;

use crate::domain::foundation::{
    DomainError, ErrorCode, GroupId, LedgerEntryId, MemberId, ValidationError,
};

use super::GroupStatus;

/// Why an organizer-supplied payout mapping is not a bijection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssignmentDefect {
    #[error("no active members to assign")]
    NoMembers,

    #[error("organizer_assigned requires a mapping")]
    MappingMissing,

    #[error("member {0} is assigned more than once")]
    DuplicateMember(MemberId),

    #[error("{0} is not an active member of this group")]
    UnknownMember(MemberId),

    #[error("active member {0} has no slot")]
    MissingMember(MemberId),

    #[error("slot {slot} is outside 1..={max}")]
    SlotOutOfRange { slot: u32, max: u32 },

    #[error("slot {0} is assigned more than once")]
    DuplicateSlot(u32),
}

/// Errors produced by the cycle and payout engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("Invalid fee configuration: {reason}")]
    InvalidFeeConfiguration { reason: String },

    #[error("Incomplete payout assignment: {0}")]
    IncompleteAssignment(AssignmentDefect),

    #[error("Group requires exactly {expected} active members to activate, found {actual}")]
    ActivationPrecondition { expected: u32, actual: u32 },

    #[error("Group {group_id} cannot be activated while {status}")]
    NotForming { group_id: GroupId, status: GroupStatus },

    #[error("Cycles already generated for group {0}")]
    AlreadyGenerated(GroupId),

    #[error("Group not found: {0}")]
    GroupNotFound(GroupId),

    #[error("Ledger entry not found: {0}")]
    LedgerEntryNotFound(LedgerEntryId),

    #[error("Ledger entry {0} changed since it was read")]
    PaymentConflict(LedgerEntryId),

    #[error("Cannot {attempted} while {current}")]
    InvalidState { current: String, attempted: String },

    #[error("Validation failed for '{field}': {message}")]
    Validation { field: String, message: String },

    #[error("Infrastructure error: {0}")]
    Infrastructure(String),
}

impl EngineError {
    pub fn invalid_fee(reason: impl Into<String>) -> Self {
        EngineError::InvalidFeeConfiguration {
            reason: reason.into(),
        }
    }

    pub fn invalid_state(current: impl Into<String>, attempted: impl Into<String>) -> Self {
        EngineError::InvalidState {
            current: current.into(),
            attempted: attempted.into(),
        }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        EngineError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn infrastructure(message: impl Into<String>) -> Self {
        EngineError::Infrastructure(message.into())
    }

    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            EngineError::InvalidFeeConfiguration { .. } => ErrorCode::InvalidFeeConfiguration,
            EngineError::IncompleteAssignment(_) => ErrorCode::IncompleteAssignment,
            EngineError::ActivationPrecondition { .. } | EngineError::NotForming { .. } => {
                ErrorCode::ActivationPrecondition
            }
            EngineError::AlreadyGenerated(_) => ErrorCode::AlreadyGenerated,
            EngineError::GroupNotFound(_) => ErrorCode::GroupNotFound,
            EngineError::LedgerEntryNotFound(_) => ErrorCode::LedgerEntryNotFound,
            EngineError::PaymentConflict(_) => ErrorCode::ConcurrencyConflict,
            EngineError::InvalidState { .. } => ErrorCode::InvalidStateTransition,
            EngineError::Validation { .. } => ErrorCode::ValidationFailed,
            EngineError::Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }

    /// True for outcomes that callers retrying activation treat as success.
    pub fn is_benign(&self) -> bool {
        matches!(self, EngineError::AlreadyGenerated(_))
    }

    /// Returns true if this error should trigger a retry.
    ///
    /// A payment conflict is retried by re-reading the entry.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            EngineError::Infrastructure(_) | EngineError::PaymentConflict(_)
        )
    }
}

impl From<ValidationError> for EngineError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::EmptyField { ref field }
            | ValidationError::OutOfRange { ref field, .. }
            | ValidationError::InvalidFormat { ref field, .. } => EngineError::Validation {
                field: field.clone(),
                message: err.to_string(),
            },
        }
    }
}

impl From<DomainError> for EngineError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::ValidationFailed
            | ErrorCode::EmptyField
            | ErrorCode::OutOfRange
            | ErrorCode::InvalidFormat => EngineError::Validation {
                field: err
                    .details
                    .get("field")
                    .cloned()
                    .unwrap_or_else(|| "unknown".to_string()),
                message: err.message,
            },
            ErrorCode::InvalidStateTransition => EngineError::InvalidState {
                current: "unknown".to_string(),
                attempted: err.message,
            },
            ErrorCode::InvalidFeeConfiguration => EngineError::InvalidFeeConfiguration {
                reason: err.message,
            },
            ErrorCode::AlreadyGenerated => match detail_id(&err, "group_id") {
                Some(group_id) => EngineError::AlreadyGenerated(group_id),
                None => EngineError::Infrastructure(err.to_string()),
            },
            ErrorCode::GroupNotFound => match detail_id(&err, "group_id") {
                Some(group_id) => EngineError::GroupNotFound(group_id),
                None => EngineError::Infrastructure(err.to_string()),
            },
            ErrorCode::LedgerEntryNotFound => match detail_id(&err, "entry_id") {
                Some(entry_id) => EngineError::LedgerEntryNotFound(entry_id),
                None => EngineError::Infrastructure(err.to_string()),
            },
            ErrorCode::ConcurrencyConflict => match detail_id(&err, "entry_id") {
                Some(entry_id) => EngineError::PaymentConflict(entry_id),
                None => EngineError::Infrastructure(err.to_string()),
            },
            _ => EngineError::Infrastructure(err.to_string()),
        }
    }
}

fn detail_id<T: FromStr>(err: &DomainError, key: &str) -> Option<T> {
    err.details.get(key).and_then(|v| v.parse().ok())
}

impl From<EngineError> for DomainError {
    fn from(err: EngineError) -> Self {
        let base = DomainError::new(err.code(), err.to_string());
        match err {
            EngineError::AlreadyGenerated(group_id)
            | EngineError::GroupNotFound(group_id)
            | EngineError::NotForming { group_id, .. } => {
                base.with_detail("group_id", group_id.to_string())
            }
            EngineError::LedgerEntryNotFound(entry_id) | EngineError::PaymentConflict(entry_id) => {
                base.with_detail("entry_id", entry_id.to_string())
            }
            EngineError::Validation { field, .. } => base.with_detail("field", field),
            _ => base,
        }
    }
}
