//! Filesystem store: one directory per platform, one JSON file per conversation.

use super::{
    check_conversation_id, check_platform_id, PlatformMetadata, ThreadStore, METADATA_RECORD,
};
use crate::error::{InboxError, InboxResult};
use crate::thread::Thread;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

const RECORD_EXTENSION: &str = "json";

/// Store rooted at the platform directory (e.g. `~/.inbox/Platforms`).
#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn platform_dir(&self, platform: &str) -> PathBuf {
        self.root.join(platform)
    }

    fn record_path(&self, platform: &str, record: &str) -> PathBuf {
        self.platform_dir(platform)
            .join(format!("{}.{}", record, RECORD_EXTENSION))
    }

    async fn platform_exists(&self, platform: &str) -> bool {
        tokio::fs::metadata(self.platform_dir(platform))
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false)
    }
}

fn unavailable(path: &Path, e: std::io::Error) -> InboxError {
    InboxError::StorageUnavailable(format!("{}: {}", path.display(), e))
}

#[async_trait]
impl ThreadStore for FsStore {
    async fn list_platforms(&self) -> InboxResult<Vec<String>> {
        let mut dir = tokio::fs::read_dir(&self.root)
            .await
            .map_err(|e| unavailable(&self.root, e))?;
        let mut out = Vec::new();
        while let Some(entry) = dir
            .next_entry()
            .await
            .map_err(|e| unavailable(&self.root, e))?
        {
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            if name.starts_with('.') {
                continue;
            }
            let is_dir = entry
                .file_type()
                .await
                .map(|t| t.is_dir())
                .unwrap_or(false);
            if is_dir {
                out.push(name);
            } else {
                log::debug!("skipping non-directory entry {} in platform root", name);
            }
        }
        Ok(out)
    }

    async fn list_records(&self, platform: &str) -> InboxResult<Vec<String>> {
        check_platform_id(platform)?;
        let dir_path = self.platform_dir(platform);
        let mut dir = match tokio::fs::read_dir(&dir_path).await {
            Ok(d) => d,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(InboxError::platform_not_found(platform))
            }
            Err(e) => return Err(unavailable(&dir_path, e)),
        };
        let mut out = Vec::new();
        while let Some(entry) = dir
            .next_entry()
            .await
            .map_err(|e| unavailable(&dir_path, e))?
        {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(RECORD_EXTENSION) {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if stem.starts_with('.') {
                continue;
            }
            let is_file = entry
                .file_type()
                .await
                .map(|t| t.is_file())
                .unwrap_or(false);
            if is_file {
                out.push(stem.to_string());
            }
        }
        Ok(out)
    }

    async fn read_thread(&self, platform: &str, conversation: &str) -> InboxResult<Thread> {
        check_conversation_id(platform, conversation)?;
        let path = self.record_path(platform, conversation);
        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(s) => s,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(InboxError::conversation_not_found(platform, conversation))
            }
            Err(e) => return Err(unavailable(&path, e)),
        };
        serde_json::from_str(&raw).map_err(|e| InboxError::Corrupt {
            platform: platform.to_string(),
            conversation: conversation.to_string(),
            reason: e.to_string(),
        })
    }

    async fn write_thread(
        &self,
        platform: &str,
        conversation: &str,
        thread: &Thread,
    ) -> InboxResult<()> {
        check_conversation_id(platform, conversation)?;
        if !self.platform_exists(platform).await {
            return Err(InboxError::platform_not_found(platform));
        }
        let path = self.record_path(platform, conversation);
        let json = serde_json::to_vec(thread).map_err(|e| InboxError::Corrupt {
            platform: platform.to_string(),
            conversation: conversation.to_string(),
            reason: e.to_string(),
        })?;
        // Write a sibling temp file, then rename over the record so readers never see a partial file.
        let tmp = self.platform_dir(platform).join(format!(
            ".{}.{}.tmp",
            conversation,
            uuid::Uuid::new_v4()
        ));
        if let Err(e) = tokio::fs::write(&tmp, &json).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(unavailable(&tmp, e));
        }
        if let Err(e) = tokio::fs::rename(&tmp, &path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(unavailable(&path, e));
        }
        Ok(())
    }

    async fn read_metadata(&self, platform: &str) -> InboxResult<PlatformMetadata> {
        check_platform_id(platform)?;
        if !self.platform_exists(platform).await {
            return Err(InboxError::platform_not_found(platform));
        }
        let path = self.record_path(platform, METADATA_RECORD);
        let raw = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| InboxError::MissingMetadata {
                platform: platform.to_string(),
                reason: format!("{}: {}", path.display(), e),
            })?;
        serde_json::from_str(&raw).map_err(|e| InboxError::MissingMetadata {
            platform: platform.to_string(),
            reason: format!("{}: {}", path.display(), e),
        })
    }
}
