//! Initialize the data directory: default config, sample platforms, Q&A file, and a static page.
//!
//! Layout mirrors `crates/lib/seed/`: `seed/Platforms/` → `<data root>/Platforms/`, and so on.
//! Existing data is never overwritten.

use anyhow::{Context, Result};
use include_dir::{include_dir, Dir, File};
use std::path::Path;

use crate::config::{self, DataPaths, PLATFORMS_DIR, PUBLIC_DIR, QUESTIONS_FILE};

static SEED: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/seed");

/// Ensure the data root has been initialized (platform directory exists).
pub fn require_initialized(paths: &DataPaths) -> Result<()> {
    if !paths.platforms.is_dir() {
        anyhow::bail!(
            "data directory not initialized; run `inbox init` first (platform directory not found: {})",
            paths.platforms.display()
        );
    }
    Ok(())
}

/// Create the config file and seed the data root if they do not exist.
/// - Writes `config.json` with `{}` if missing.
/// - Extracts the sample platforms into `Platforms` if that directory does not exist.
/// - Writes the sample Q&A file if missing.
/// - Extracts the static page into the public directory if it does not exist.
pub fn init_data_dir(config_path: &Path) -> Result<DataPaths> {
    if let Some(dir) = config_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("creating config directory {}", dir.display()))?;
    }
    if !config_path.exists() {
        std::fs::write(config_path, b"{}")
            .with_context(|| format!("writing default config to {}", config_path.display()))?;
        log::info!("created default config at {}", config_path.display());
    }

    let (config, _) = config::load_config(Some(config_path.to_path_buf()))?;
    let paths = config::resolve_data_paths(&config, config_path);
    std::fs::create_dir_all(&paths.root)
        .with_context(|| format!("creating data directory {}", paths.root.display()))?;

    if !paths.platforms.exists() {
        extract_seed_dir(PLATFORMS_DIR, &paths.platforms)?;
        log::info!("seeded sample platforms at {}", paths.platforms.display());
    } else {
        log::debug!(
            "platform directory already exists at {}, skipping",
            paths.platforms.display()
        );
    }

    if !paths.questions.exists() {
        let file = SEED
            .get_file(QUESTIONS_FILE)
            .context("bundled seed is missing the Q&A file")?;
        std::fs::write(&paths.questions, file.contents())
            .with_context(|| format!("writing {}", paths.questions.display()))?;
        log::info!("wrote sample Q&A to {}", paths.questions.display());
    }

    if !paths.public.exists() {
        extract_seed_dir(PUBLIC_DIR, &paths.public)?;
        log::info!("wrote static page to {}", paths.public.display());
    }

    Ok(paths)
}

/// Copy the files of one bundled seed directory into `target`, keeping their relative layout.
fn extract_seed_dir(name: &str, target: &Path) -> Result<()> {
    let dir = SEED
        .get_dir(name)
        .with_context(|| format!("bundled seed is missing {}", name))?;
    let mut files = Vec::new();
    collect_files(dir, &mut files);
    for file in files {
        let rel = file.path().strip_prefix(name).unwrap_or(file.path());
        let dest = target.join(rel);
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        std::fs::write(&dest, file.contents())
            .with_context(|| format!("writing {}", dest.display()))?;
    }
    Ok(())
}

fn collect_files<'a>(dir: &'a Dir<'a>, out: &mut Vec<&'a File<'a>>) {
    out.extend(dir.files());
    for sub in dir.dirs() {
        collect_files(sub, out);
    }
}
