//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `memory` - In-memory repositories and readers
//! - `postgres` - PostgreSQL repositories and readers (sqlx)
//! - `events` - Event bus implementations

pub mod events;
pub mod memory;
pub mod postgres;

pub use events::InMemoryEventBus;
pub use memory::{
    InMemoryCycleRepository, InMemoryGroupRepository, InMemoryLedgerRepository,
    InMemoryMemberStore,
};
pub use postgres::{
    PostgresCycleRepository, PostgresGroupRepository, PostgresLedgerRepository,
    PostgresMemberReader,
};
