//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Persistence Ports
//!
//! - `GroupRepository` - Group aggregate load/save
//! - `MemberReader` - Group rosters
//! - `CycleRepository` - Atomic cycle schedules and status steps
//! - `LedgerRepository` - Contribution and fee records
//!
//! ## Event Ports
//!
//! - `EventPublisher` - Port for publishing domain events

mod cycle_repository;
mod event_publisher;
mod group_repository;
mod ledger_repository;
mod member_reader;

pub use cycle_repository::CycleRepository;
pub use event_publisher::EventPublisher;
pub use group_repository::GroupRepository;
pub use ledger_repository::LedgerRepository;
pub use member_reader::MemberReader;
