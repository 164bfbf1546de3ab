//! Configuration types and loading.
//!
//! Config is loaded from a JSON file (e.g. `~/.inbox/config.json`) and environment.
//! The data root holds the platform tree, the Q&A file, the contact log and static assets.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Platform directories live here, under the data root.
pub const PLATFORMS_DIR: &str = "Platforms";
/// Static Q&A content, under the data root.
pub const QUESTIONS_FILE: &str = "question-answer.json";
/// Append-only contact-form log, under the data root.
pub const CONTACT_LOG_FILE: &str = "contact-form-info.json";
/// Static assets served at `/`, under the data root unless overridden.
pub const PUBLIC_DIR: &str = "public";

/// Top-level application config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Where the inbox data lives.
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Server bind and port.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    /// HTTP port (default 8000). Overridden by the PORT env var.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Bind address (default "127.0.0.1").
    #[serde(default = "default_bind")]
    pub bind: String,
}

/// Data locations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageConfig {
    /// Data root. Relative paths are resolved against the config file's parent. Default: the config file's parent.
    #[serde(default)]
    pub directory: Option<PathBuf>,
    /// Static asset directory. Relative paths are resolved against the data root. Default: `<data root>/public`.
    #[serde(default)]
    pub public_dir: Option<PathBuf>,
}

fn default_port() -> u16 {
    8000
}

fn default_bind() -> String {
    "127.0.0.1".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            bind: default_bind(),
        }
    }
}

/// Resolve the listen port: env PORT overrides config when it parses as a port.
pub fn resolve_port(config: &Config) -> u16 {
    std::env::var("PORT")
        .ok()
        .and_then(|s| {
            let t = s.trim();
            match t.parse::<u16>() {
                Ok(p) => Some(p),
                Err(_) => {
                    if !t.is_empty() {
                        log::warn!("ignoring invalid PORT value {:?}", t);
                    }
                    None
                }
            }
        })
        .unwrap_or(config.server.port)
}

/// Resolved file layout under the data root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPaths {
    pub root: PathBuf,
    pub platforms: PathBuf,
    pub questions: PathBuf,
    pub contact_log: PathBuf,
    pub public: PathBuf,
}

impl DataPaths {
    /// Fixed layout beneath `root`, with the default public directory.
    pub fn under(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            platforms: root.join(PLATFORMS_DIR),
            questions: root.join(QUESTIONS_FILE),
            contact_log: root.join(CONTACT_LOG_FILE),
            public: root.join(PUBLIC_DIR),
            root,
        }
    }
}

fn config_parent(config_path: &Path) -> &Path {
    config_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
}

/// Resolve the data root and its files from config (relative paths against the config file's parent).
pub fn resolve_data_paths(config: &Config, config_path: &Path) -> DataPaths {
    let parent = config_parent(config_path);
    let root = match &config.storage.directory {
        Some(d) if !d.as_os_str().is_empty() => {
            if d.is_absolute() {
                d.clone()
            } else {
                parent.join(d)
            }
        }
        _ => parent.to_path_buf(),
    };
    let mut paths = DataPaths::under(root);
    if let Some(p) = config
        .storage
        .public_dir
        .as_ref()
        .filter(|p| !p.as_os_str().is_empty())
    {
        paths.public = if p.is_absolute() {
            p.clone()
        } else {
            paths.root.join(p)
        };
    }
    paths
}

/// Resolve config path from env or default.
pub fn default_config_path() -> PathBuf {
    std::env::var("INBOX_CONFIG_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::home_dir()
                .map(|h| h.join(".inbox").join("config.json"))
                .unwrap_or_else(|| PathBuf::from("config.json"))
        })
}

/// Load config from the given path, INBOX_CONFIG_PATH, or the default. Missing file => default config.
/// Returns the config and the path that was used (for resolving the data root).
pub fn load_config(path: Option<PathBuf>) -> Result<(Config, PathBuf)> {
    let path = path.unwrap_or_else(default_config_path);
    let config = if !path.exists() {
        log::debug!("config file not found, using defaults: {}", path.display());
        Config::default()
    } else {
        let s = std::fs::read_to_string(&path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        serde_json::from_str(&s)
            .with_context(|| format!("parsing config from {}", path.display()))?
    };
    Ok((config, path))
}
