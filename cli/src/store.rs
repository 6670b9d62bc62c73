//! Persisted host state (JSON file)
//!
//! Each command loads the whole simulated world, runs one exchange call and
//! writes the result back. Failed calls never reach the write, so the file
//! always holds the last committed state.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use pairswap::MemoryHost;

use crate::config::CliConfig;

pub fn load(path: &Path) -> Result<MemoryHost> {
    if !path.exists() {
        anyhow::bail!(
            "State file not found: {}\n\
             Create one with: pairswap init",
            path.display()
        );
    }
    let data = fs::read_to_string(path)
        .with_context(|| format!("Failed to read state file: {}", path.display()))?;
    serde_json::from_str(&data)
        .with_context(|| format!("Failed to parse state file: {}", path.display()))
}

/// Write via a sibling temp file and rename, so a crash never leaves half a file
pub fn save(path: &Path, host: &MemoryHost) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create state directory: {}", parent.display()))?;
    }
    let data = serde_json::to_string_pretty(host).context("Failed to serialize state")?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, data).with_context(|| format!("Failed to write state file: {}", tmp.display()))?;
    fs::rename(&tmp, path).with_context(|| format!("Failed to replace state file: {}", path.display()))
}

/// Load, apply `op`, and save only if `op` succeeded
pub fn update<R>(config: &CliConfig, op: impl FnOnce(&mut MemoryHost) -> Result<R>) -> Result<R> {
    let mut host = load(&config.state_path)?;
    let result = op(&mut host)?;
    save(&config.state_path, &host)?;
    Ok(result)
}
