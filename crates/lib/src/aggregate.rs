//! Platform summaries: metadata plus the previews of every conversation on the platform.

use crate::catalog;
use crate::error::InboxResult;
use crate::preview::{build_previews, ConversationPreview};
use crate::store::ThreadStore;
use futures_util::future::try_join_all;
use serde::{Deserialize, Serialize};

/// `{ platform, icon, api, messages }` as returned by `/getMessages`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformSummary {
    pub platform: String,
    pub icon: String,
    pub api: String,
    pub messages: Vec<ConversationPreview>,
}

pub async fn build_platform_summary(
    store: &dyn ThreadStore,
    platform: &str,
) -> InboxResult<PlatformSummary> {
    let metadata = store.read_metadata(platform).await?;
    let conversations = catalog::list_conversations(store, platform).await?;
    let messages = build_previews(store, platform, &conversations).await?;
    Ok(PlatformSummary {
        platform: platform.to_string(),
        icon: metadata.icon,
        api: metadata.api_url,
        messages,
    })
}

/// Summaries of every platform, sorted by id. Any failing platform fails the whole call.
pub async fn build_all_platform_summaries(
    store: &dyn ThreadStore,
) -> InboxResult<Vec<PlatformSummary>> {
    let platforms = catalog::list_platforms(store).await?;
    try_join_all(platforms.iter().map(|p| build_platform_summary(store, p))).await
}

/// One platform when given, otherwise all of them.
pub async fn collect_summaries(
    store: &dyn ThreadStore,
    platform: Option<&str>,
) -> InboxResult<Vec<PlatformSummary>> {
    match platform {
        Some(p) => Ok(vec![build_platform_summary(store, p).await?]),
        None => build_all_platform_summaries(store).await,
    }
}
