//! Command context carried through handlers into emitted events.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{EventEnvelope, UserId};

/// Who issued a command and which request it belongs to.
///
/// The correlation id is fixed at construction, so every event emitted by
/// one command (one activation, one sweep of a group) shares it.
///
/// # Example
///
/// ```ignore
/// let metadata = CommandMetadata::new(organizer_id).with_source("api");
/// let envelope = metadata.stamp(activated.to_envelope()?);
/// publisher.publish(envelope).await?;
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandMetadata {
    /// The user (or system actor) issuing the command.
    pub actor: UserId,

    correlation_id: String,

    /// Origin of the command, e.g. "api" or "sweep".
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<String>,
}

impl CommandMetadata {
    /// Creates metadata for `actor` with a fresh correlation id.
    pub fn new(actor: UserId) -> Self {
        Self {
            actor,
            correlation_id: Uuid::new_v4().to_string(),
            source: None,
        }
    }

    /// Metadata for commands issued by the engine itself (no human actor).
    pub fn system(source: &str) -> Self {
        Self {
            actor: UserId::system(),
            correlation_id: Uuid::new_v4().to_string(),
            source: Some(source.to_string()),
        }
    }

    /// Builder: Replace the correlation id with one from the caller.
    pub fn with_correlation_id(mut self, id: impl Into<String>) -> Self {
        self.correlation_id = id.into();
        self
    }

    /// Builder: Add source identifier.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn correlation_id(&self) -> &str {
        &self.correlation_id
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// Copies correlation and actor onto an outgoing envelope.
    pub fn stamp(&self, envelope: EventEnvelope) -> EventEnvelope {
        envelope
            .with_correlation_id(self.correlation_id.clone())
            .with_user_id(self.actor.as_str())
    }
}

#[cfg(test)]
impl CommandMetadata {
    /// Test fixture with a stable correlation id.
    pub fn test_fixture() -> Self {
        Self::new(UserId::new("organizer").unwrap())
            .with_correlation_id("test-correlation-id")
            .with_source("test")
    }
}
