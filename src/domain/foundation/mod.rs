//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, error types, the state machine trait
//! and event infrastructure that form the vocabulary of the paluwagan domain.

mod command;
mod errors;
mod events;
mod ids;
mod money;
mod state_machine;
mod timestamp;

pub use command::CommandMetadata;
pub use errors::{DomainError, ErrorCode, ValidationError};
pub use events::{
    domain_event, DomainEvent, EventEnvelope, EventId, EventMetadata, SerializableDomainEvent,
};
pub use ids::{CycleId, GroupId, LedgerEntryId, MemberId, UserId};
pub use money::Money;
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
