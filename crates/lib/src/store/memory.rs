//! In-memory store used by tests and demos. Platforms, metadata and threads live in a map.

use super::{
    check_conversation_id, check_platform_id, PlatformMetadata, ThreadStore, METADATA_RECORD,
};
use crate::error::{InboxError, InboxResult};
use crate::thread::Thread;
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Clone, Default)]
struct PlatformEntry {
    metadata: Option<PlatformMetadata>,
    threads: BTreeMap<String, Thread>,
}

/// Map-backed [`ThreadStore`]. Reads and writes yield to the scheduler so concurrent callers interleave.
#[derive(Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<HashMap<String, PlatformEntry>>>,
    writes: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create (or replace) a platform with the given metadata.
    pub async fn insert_platform(&self, platform: impl Into<String>, metadata: Option<PlatformMetadata>) {
        let mut g = self.inner.write().await;
        g.entry(platform.into()).or_default().metadata = metadata;
    }

    /// Seed a thread without counting it as a write.
    pub async fn insert_thread(
        &self,
        platform: impl Into<String>,
        conversation: impl Into<String>,
        thread: Thread,
    ) {
        let mut g = self.inner.write().await;
        g.entry(platform.into())
            .or_default()
            .threads
            .insert(conversation.into(), thread);
    }

    /// Number of successful `write_thread` calls.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ThreadStore for MemoryStore {
    async fn list_platforms(&self) -> InboxResult<Vec<String>> {
        Ok(self.inner.read().await.keys().cloned().collect())
    }

    async fn list_records(&self, platform: &str) -> InboxResult<Vec<String>> {
        check_platform_id(platform)?;
        let g = self.inner.read().await;
        let entry = g
            .get(platform)
            .ok_or_else(|| InboxError::platform_not_found(platform))?;
        let mut out: Vec<String> = entry.threads.keys().cloned().collect();
        if entry.metadata.is_some() {
            out.push(METADATA_RECORD.to_string());
        }
        Ok(out)
    }

    async fn read_thread(&self, platform: &str, conversation: &str) -> InboxResult<Thread> {
        check_conversation_id(platform, conversation)?;
        let thread = self
            .inner
            .read()
            .await
            .get(platform)
            .and_then(|p| p.threads.get(conversation))
            .cloned()
            .ok_or_else(|| InboxError::conversation_not_found(platform, conversation))?;
        tokio::task::yield_now().await;
        Ok(thread)
    }

    async fn write_thread(
        &self,
        platform: &str,
        conversation: &str,
        thread: &Thread,
    ) -> InboxResult<()> {
        check_conversation_id(platform, conversation)?;
        tokio::task::yield_now().await;
        let mut g = self.inner.write().await;
        let entry = g
            .get_mut(platform)
            .ok_or_else(|| InboxError::platform_not_found(platform))?;
        entry
            .threads
            .insert(conversation.to_string(), thread.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn read_metadata(&self, platform: &str) -> InboxResult<PlatformMetadata> {
        check_platform_id(platform)?;
        let g = self.inner.read().await;
        let entry = g
            .get(platform)
            .ok_or_else(|| InboxError::platform_not_found(platform))?;
        entry
            .metadata
            .clone()
            .ok_or_else(|| InboxError::MissingMetadata {
                platform: platform.to_string(),
                reason: "no metadata record".to_string(),
            })
    }
}
