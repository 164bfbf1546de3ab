//! Contact-form submissions, appended one JSON object per line. Never read back.

use anyhow::{Context, Result};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};

/// A validated submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactSubmission {
    pub name: String,
    pub email: String,
    pub questions: String,
}

/// Raw form fields as posted; any of them may be missing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactForm {
    pub name: Option<String>,
    pub email: Option<String>,
    pub questions: Option<String>,
}

impl ContactForm {
    /// All three fields present and non-empty, or None. Whitespace counts as content.
    pub fn validate(self) -> Option<ContactSubmission> {
        fn field(v: Option<String>) -> Option<String> {
            v.filter(|s| !s.is_empty())
        }
        Some(ContactSubmission {
            name: field(self.name)?,
            email: field(self.email)?,
            questions: field(self.questions)?,
        })
    }
}

/// Append-only log file of submissions.
#[derive(Debug, Clone)]
pub struct ContactLog {
    path: PathBuf,
}

impl ContactLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one line under an exclusive file lock.
    pub async fn append(&self, submission: &ContactSubmission) -> Result<()> {
        let mut line = serde_json::to_string(submission).context("serializing submission")?;
        line.push('\n');
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || append_locked(&path, line.as_bytes()))
            .await
            .context("contact log writer panicked")?
    }
}

fn append_locked(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening contact log {}", path.display()))?;
    file.lock_exclusive()
        .with_context(|| format!("locking contact log {}", path.display()))?;
    // Lock is released when `file` is closed.
    file.write_all(bytes)
        .and_then(|_| file.flush())
        .with_context(|| format!("appending to contact log {}", path.display()))
}
