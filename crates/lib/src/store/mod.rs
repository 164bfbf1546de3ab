//! Storage boundary: platforms, their metadata record, and per-conversation threads.
//!
//! The store is keyed by `(platform, conversation)`. [`FsStore`] maps that onto
//! `<root>/<platform>/<conversation>.json`; [`MemoryStore`] keeps everything in a map for tests.

mod fs;
mod memory;

pub use fs::FsStore;
pub use memory::MemoryStore;

use crate::error::{InboxError, InboxResult};
use crate::thread::Thread;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Reserved record name of the per-platform metadata (`properties.json` on disk).
pub const METADATA_RECORD: &str = "properties";

/// Per-platform side-car data. Both fields are opaque passthrough strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformMetadata {
    pub icon: String,
    #[serde(rename = "platform-API-URL")]
    pub api_url: String,
}

/// Hierarchical conversation store. Every call is a full read or a full replace.
#[async_trait]
pub trait ThreadStore: Send + Sync {
    /// Platform ids under the root, in storage order.
    async fn list_platforms(&self) -> InboxResult<Vec<String>>;

    /// Record names under one platform (metadata record included), in storage order.
    async fn list_records(&self, platform: &str) -> InboxResult<Vec<String>>;

    async fn read_thread(&self, platform: &str, conversation: &str) -> InboxResult<Thread>;

    /// Replace the whole thread record.
    async fn write_thread(
        &self,
        platform: &str,
        conversation: &str,
        thread: &Thread,
    ) -> InboxResult<()>;

    async fn read_metadata(&self, platform: &str) -> InboxResult<PlatformMetadata>;
}

/// True if `id` can name a platform or record: non-empty, not hidden, no path separators.
pub fn is_valid_id(id: &str) -> bool {
    !id.is_empty()
        && !id.starts_with('.')
        && !id.contains(['/', '\\', '\0'])
}

pub(crate) fn check_platform_id(platform: &str) -> InboxResult<()> {
    if is_valid_id(platform) {
        Ok(())
    } else {
        Err(InboxError::platform_not_found(platform))
    }
}

pub(crate) fn check_conversation_id(platform: &str, conversation: &str) -> InboxResult<()> {
    check_platform_id(platform)?;
    if is_valid_id(conversation) {
        Ok(())
    } else {
        Err(InboxError::conversation_not_found(platform, conversation))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_ids() {
        assert!(is_valid_id("Instagram"));
        assert!(is_valid_id("Mom"));
        assert!(is_valid_id("Best Friend"));
    }

    #[test]
    fn invalid_ids() {
        assert!(!is_valid_id(""));
        assert!(!is_valid_id(".."));
        assert!(!is_valid_id(".hidden"));
        assert!(!is_valid_id("a/b"));
        assert!(!is_valid_id("a\\b"));
    }

    #[test]
    fn metadata_uses_wire_field_names() {
        let m: PlatformMetadata = serde_json::from_str(
            r#"{"icon":"ig.png","platform-API-URL":"https://api.instagram.test"}"#,
        )
        .unwrap();
        assert_eq!(m.icon, "ig.png");
        assert_eq!(m.api_url, "https://api.instagram.test");
    }
}
