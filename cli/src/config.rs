//! CLI configuration: optional TOML file plus command-line overrides

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use pairswap::DEFAULT_FEE_BPS;

/// Config file read when `--config` is not given and the file exists
pub const DEFAULT_CONFIG_FILE: &str = "pairswap.toml";

/// State file used when neither flag nor config file names one
pub const DEFAULT_STATE_FILE: &str = "pairswap-state.json";

/// Raw contents of the TOML config file; every key is optional
#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub state_path: Option<String>,
    pub fee_bps: Option<u64>,
    pub log_level: Option<String>,
    pub token_name: Option<String>,
    pub token_symbol: Option<String>,
}

/// Resolved settings for one CLI invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliConfig {
    pub state_path: PathBuf,
    pub fee_bps: u64,
    pub log_level: Option<String>,
    pub token_name: String,
    pub token_symbol: String,
}

impl CliConfig {
    /// Merge the config file (if any) with the `--state` override
    pub fn load(config_path: Option<&Path>, state_override: Option<&str>) -> Result<Self> {
        let file = match config_path {
            Some(path) => read_file_config(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                read_file_config(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => FileConfig::default(),
        };
        Self::from_file_config(file, state_override)
    }

    fn from_file_config(file: FileConfig, state_override: Option<&str>) -> Result<Self> {
        let raw_state = state_override
            .map(str::to_string)
            .or(file.state_path)
            .unwrap_or_else(|| DEFAULT_STATE_FILE.to_string());

        Ok(Self {
            state_path: expand_path(&raw_state)?,
            fee_bps: file.fee_bps.unwrap_or(DEFAULT_FEE_BPS),
            log_level: file.log_level,
            token_name: file.token_name.unwrap_or_else(|| "Token".to_string()),
            token_symbol: file.token_symbol.unwrap_or_else(|| "TKN".to_string()),
        })
    }
}

fn read_file_config(path: &Path) -> Result<FileConfig> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    toml::from_str(&data).with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Expand `~` and environment variables in a path
fn expand_path(raw: &str) -> Result<PathBuf> {
    let expanded = shellexpand::full(raw).with_context(|| format!("Failed to expand path: {}", raw))?;
    Ok(PathBuf::from(expanded.as_ref()))
}
