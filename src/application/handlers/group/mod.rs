//! Group command and query handlers.

// Command handlers
mod activate_group;

// Query handlers
mod preview_fees;

pub use activate_group::{ActivateGroupCommand, ActivateGroupHandler, ActivateGroupResult};
pub use preview_fees::{PreviewFeesHandler, PreviewFeesQuery};
