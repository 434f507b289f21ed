//! Cycle domain module.
//!
//! # Module Structure
//!
//! - `record` - Cycle record
//! - `status` - CycleStatus state machine
//! - `generator` - Cycle Generator (schedule creation at activation)
//! - `progression` - status evaluation against a given day
//! - `events` - Cycle events

mod events;
mod generator;
mod progression;
mod record;
mod status;

pub use events::CycleStatusChanged;
pub use generator::{CycleGenerator, GeneratedSchedule};
pub use progression::{CycleProgression, StatusChange};
pub use record::Cycle;
pub use status::CycleStatus;
