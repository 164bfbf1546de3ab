//! Error kinds for the conversation store and the operations built on it.

/// Failure of a core inbox operation. Every store, catalog, preview, aggregate
/// and ingest call fails with exactly one of these.
#[derive(Debug, thiserror::Error)]
pub enum InboxError {
    /// Missing platform, conversation, or record (also used for ids that are
    /// not valid record names).
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Stored thread exists but is not a JSON array of single-key messages.
    #[error("corrupt thread {platform}/{conversation}: {reason}")]
    Corrupt {
        platform: String,
        conversation: String,
        reason: String,
    },

    /// Platform metadata record is absent or unparseable.
    #[error("missing metadata for platform {platform}: {reason}")]
    MissingMetadata { platform: String, reason: String },

    /// Storage could not be enumerated or accessed.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),

    /// Thread has no position-0 message to preview.
    #[error("conversation {platform}/{conversation} has no messages")]
    EmptyConversation {
        platform: String,
        conversation: String,
    },
}

pub type InboxResult<T> = std::result::Result<T, InboxError>;

impl InboxError {
    pub fn platform_not_found(id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: "platform",
            id: id.into(),
        }
    }

    pub fn conversation_not_found(platform: &str, conversation: &str) -> Self {
        Self::NotFound {
            entity: "conversation",
            id: format!("{}/{}", platform, conversation),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
