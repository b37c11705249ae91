//! bandmark configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::model::TestModule;

/// Top-level bandmark configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandmarkConfig {
    /// Module assumed for answer keys that do not declare one.
    #[serde(default = "default_module")]
    pub default_module: TestModule,
    /// Time limit for timed attempts when the key does not set one.
    #[serde(default = "default_time_limit")]
    pub time_limit_minutes: u64,
    /// JSON-lines file that score records are appended to.
    #[serde(default = "default_history_path")]
    pub history_path: PathBuf,
    /// Output directory for score reports.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_module() -> TestModule {
    TestModule::AcademicReading
}
fn default_time_limit() -> u64 {
    60
}
fn default_history_path() -> PathBuf {
    PathBuf::from("./bandmark-results/history.jsonl")
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("./bandmark-results")
}

impl Default for BandmarkConfig {
    fn default() -> Self {
        Self {
            default_module: default_module(),
            time_limit_minutes: default_time_limit(),
            history_path: default_history_path(),
            output_dir: default_output_dir(),
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!(
                "{}{}{}",
                &result[..start],
                value,
                &result[start + end + 1..]
            );
        } else {
            break;
        }
    }
    result
}

fn resolve_path(path: &Path) -> PathBuf {
    PathBuf::from(resolve_env_vars(&path.to_string_lossy()))
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `bandmark.toml` in the current directory
/// 2. `~/.config/bandmark/config.toml`
///
/// Environment variable overrides: `BANDMARK_MODULE`, `BANDMARK_HISTORY`.
pub fn load_config() -> Result<BandmarkConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<BandmarkConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("bandmark.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<BandmarkConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => BandmarkConfig::default(),
    };

    // Apply env var overrides
    if let Ok(module) = std::env::var("BANDMARK_MODULE") {
        config.default_module = module
            .parse()
            .map_err(|e: String| anyhow::anyhow!("BANDMARK_MODULE: {}", e))?;
    }
    if let Ok(history) = std::env::var("BANDMARK_HISTORY") {
        config.history_path = PathBuf::from(history);
    }

    config.history_path = resolve_path(&config.history_path);
    config.output_dir = resolve_path(&config.output_dir);

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("bandmark"))
}
