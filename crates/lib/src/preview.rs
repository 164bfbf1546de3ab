//! Conversation previews for listing views: sender id plus the start of the position-0 message.

use crate::error::{InboxError, InboxResult};
use crate::store::ThreadStore;
use futures_util::future::try_join_all;
use serde::{Deserialize, Serialize};

/// Maximum characters of the preview message shown in listings.
pub const PREVIEW_CHARS: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationPreview {
    /// Conversation id (record name without extension).
    pub sender: String,
    pub display_messages: String,
}

/// First `max` characters of `body`. Cuts on `char` boundaries.
pub fn truncate_chars(body: &str, max: usize) -> &str {
    match body.char_indices().nth(max) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}

async fn build_preview(
    store: &dyn ThreadStore,
    platform: &str,
    conversation: &str,
) -> InboxResult<ConversationPreview> {
    let thread = store.read_thread(platform, conversation).await?;
    let first = thread
        .preview()
        .ok_or_else(|| InboxError::EmptyConversation {
            platform: platform.to_string(),
            conversation: conversation.to_string(),
        })?;
    Ok(ConversationPreview {
        sender: conversation.to_string(),
        display_messages: truncate_chars(&first.body, PREVIEW_CHARS).to_string(),
    })
}

/// One preview per conversation id, in input order. Threads are read concurrently;
/// the first failure aborts the whole call.
pub async fn build_previews(
    store: &dyn ThreadStore,
    platform: &str,
    conversations: &[String],
) -> InboxResult<Vec<ConversationPreview>> {
    try_join_all(
        conversations
            .iter()
            .map(|c| build_preview(store, platform, c)),
    )
    .await
}
