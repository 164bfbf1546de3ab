//! Platform catalog: which platforms exist and which conversations each one holds.
//!
//! Results are sorted so listings are stable across calls regardless of storage order.

use crate::error::InboxResult;
use crate::store::{ThreadStore, METADATA_RECORD};

/// Platform ids, sorted.
pub async fn list_platforms(store: &dyn ThreadStore) -> InboxResult<Vec<String>> {
    let mut platforms = store.list_platforms().await?;
    platforms.sort();
    platforms.dedup();
    Ok(platforms)
}

/// Conversation ids of one platform (metadata record excluded), sorted.
pub async fn list_conversations(
    store: &dyn ThreadStore,
    platform: &str,
) -> InboxResult<Vec<String>> {
    let mut conversations: Vec<String> = store
        .list_records(platform)
        .await?
        .into_iter()
        .filter(|r| r != METADATA_RECORD)
        .collect();
    conversations.sort();
    conversations.dedup();
    Ok(conversations)
}
