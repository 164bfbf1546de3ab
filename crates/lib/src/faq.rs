//! FAQ content: a static JSON file of questions mapped to answers.

use anyhow::{Context, Result};
use std::path::Path;

/// Read and parse the Q&A file. The JSON is returned as stored (key order preserved).
pub async fn load_questions(path: &Path) -> Result<serde_json::Value> {
    let s = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading questions from {}", path.display()))?;
    serde_json::from_str(&s).with_context(|| format!("parsing questions from {}", path.display()))
}
