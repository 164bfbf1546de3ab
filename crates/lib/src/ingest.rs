//! Message ingestion: append an outgoing message to an existing thread.
//!
//! Appending is a read-modify-write of the whole thread record. Appends to the same
//! `(platform, conversation)` are serialized through a per-conversation lock, so concurrent
//! callers in one process never drop each other's messages. Writers in other processes are
//! still last-write-wins. A lock entry lives only while some append on that conversation is
//! in flight.

use crate::error::InboxResult;
use crate::store::{check_conversation_id, ThreadStore};
use crate::thread::{Message, Thread};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Key for the per-conversation lock table.
#[derive(Debug, Clone, Hash, Eq, PartialEq)]
struct ConversationKey {
    platform: String,
    conversation: String,
}

/// Appends messages through a [`ThreadStore`], one writer per conversation at a time.
#[derive(Clone)]
pub struct MessageIngest {
    store: Arc<dyn ThreadStore>,
    locks: Arc<Mutex<HashMap<ConversationKey, Arc<Mutex<()>>>>>,
}

impl MessageIngest {
    pub fn new(store: Arc<dyn ThreadStore>) -> Self {
        Self {
            store,
            locks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Lock for one conversation, creating the table entry on first use.
    async fn acquire(&self, key: &ConversationKey) -> Arc<Mutex<()>> {
        self.locks
            .lock()
            .await
            .entry(key.clone())
            .or_default()
            .clone()
    }

    /// Drop the table entry once no other caller holds or waits on the lock.
    async fn release(&self, key: &ConversationKey, lock: Arc<Mutex<()>>) {
        let mut table = self.locks.lock().await;
        let ours = table.get(key).is_some_and(|l| Arc::ptr_eq(l, &lock));
        // Two references: the table entry and `lock`.
        if ours && Arc::strong_count(&lock) == 2 {
            table.remove(key);
        }
    }

    /// Append `{"Me": body}` to the end of the thread and return the updated thread.
    /// Fails with `NotFound` (and writes nothing) when the conversation does not exist.
    pub async fn append_message(
        &self,
        platform: &str,
        conversation: &str,
        body: &str,
    ) -> InboxResult<Thread> {
        check_conversation_id(platform, conversation)?;
        let key = ConversationKey {
            platform: platform.to_string(),
            conversation: conversation.to_string(),
        };
        let lock = self.acquire(&key).await;
        let result = {
            let _guard = lock.lock().await;
            self.append_locked(platform, conversation, body).await
        };
        self.release(&key, lock).await;
        result
    }

    async fn append_locked(
        &self,
        platform: &str,
        conversation: &str,
        body: &str,
    ) -> InboxResult<Thread> {
        let mut thread = self.store.read_thread(platform, conversation).await?;
        thread.push(Message::outgoing(body));
        self.store
            .write_thread(platform, conversation, &thread)
            .await?;
        log::debug!(
            "appended message to {}/{} ({} messages)",
            platform,
            conversation,
            thread.len()
        );
        Ok(thread)
    }
}
