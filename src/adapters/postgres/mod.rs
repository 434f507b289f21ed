//! PostgreSQL adapters.
//!
//! Schema lives in `migrations/`; every adapter shares one `PgPool`.

mod conversions;
mod cycle_repository;
mod group_repository;
mod ledger_repository;
mod member_reader;

pub use cycle_repository::PostgresCycleRepository;
pub use group_repository::PostgresGroupRepository;
pub use ledger_repository::PostgresLedgerRepository;
pub use member_reader::PostgresMemberReader;
