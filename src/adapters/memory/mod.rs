//! In-memory adapters for every persistence port.
//!
//! Used by tests and by callers that embed the engine without a database.

mod cycle_repository;
mod group_repository;
mod ledger_repository;
mod member_store;

pub use cycle_repository::InMemoryCycleRepository;
pub use group_repository::InMemoryGroupRepository;
pub use ledger_repository::InMemoryLedgerRepository;
pub use member_store::InMemoryMemberStore;
