use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Storage key the snapshot is kept under.
pub const DEFAULT_STORAGE_KEY: &str = "quill-state";

/// Overrides `[storage] dir` when set.
pub const DATA_DIR_ENV: &str = "QUILL_DATA_DIR";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuillConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub import: ImportConfig,
    #[serde(default)]
    pub compile: CompileConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding `<key>.json`. Defaults to the platform data dir.
    #[serde(default)]
    pub dir: Option<PathBuf>,
    #[serde(default = "default_key")]
    pub key: String,
    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: None,
            key: default_key(),
            lock_timeout_ms: default_lock_timeout_ms(),
        }
    }
}

impl StorageConfig {
    #[must_use]
    pub const fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportConfig {
    /// Run the integrity verifier on every import.
    #[serde(default)]
    pub strict: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompileConfig {
    #[serde(default = "default_true")]
    pub skip_hidden_lenses: bool,
}

impl Default for CompileConfig {
    fn default() -> Self {
        Self {
            skip_hidden_lenses: default_true(),
        }
    }
}

fn read_config(path: &Path) -> Result<QuillConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<QuillConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Load `.quill/config.toml` under `project_root`, falling back to the
/// user config file, then to defaults.
///
/// # Errors
///
/// Returns an error if a config file exists but cannot be read or parsed.
pub fn load_config(project_root: &Path) -> Result<QuillConfig> {
    let project = project_root.join(".quill/config.toml");
    if project.exists() {
        return read_config(&project);
    }

    let Some(config_dir) = dirs::config_dir() else {
        return Ok(QuillConfig::default());
    };
    let user = config_dir.join("quill/config.toml");
    if user.exists() {
        return read_config(&user);
    }

    Ok(QuillConfig::default())
}

/// Where the snapshot lives: explicit flag, then `QUILL_DATA_DIR`, then
/// the config file, then the platform data dir.
#[must_use]
pub fn resolve_data_dir(cli_dir: Option<&Path>, config: &StorageConfig) -> Option<PathBuf> {
    resolve_data_dir_with(
        cli_dir,
        env::var_os(DATA_DIR_ENV).map(PathBuf::from),
        config,
    )
}

fn resolve_data_dir_with(
    cli_dir: Option<&Path>,
    env_dir: Option<PathBuf>,
    config: &StorageConfig,
) -> Option<PathBuf> {
    if let Some(dir) = cli_dir {
        return Some(dir.to_path_buf());
    }
    if let Some(dir) = env_dir.filter(|d| !d.as_os_str().is_empty()) {
        return Some(dir);
    }
    if let Some(dir) = &config.dir {
        return Some(dir.clone());
    }
    dirs::data_dir().map(|d| d.join("quill"))
}

/// Output mode for the CLI: `json`, `pretty`, or `text`.
#[must_use]
pub fn resolve_output(cli_json: bool) -> &'static str {
    resolve_output_with(cli_json, env::var("FORMAT").ok(), std::io::stdout().is_terminal())
}

fn resolve_output_with(cli_json: bool, env_format: Option<String>, tty: bool) -> &'static str {
    fn normalize_output_mode(raw: &str) -> Option<&'static str> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pretty" | "human" => Some("pretty"),
            "text" | "plain" => Some("text"),
            "json" => Some("json"),
            _ => None,
        }
    }

    if cli_json {
        return "json";
    }

    if let Some(mode) = env_format.as_deref().and_then(normalize_output_mode) {
        return mode;
    }

    if tty { "pretty" } else { "text" }
}

fn default_key() -> String {
    DEFAULT_STORAGE_KEY.to_string()
}

const fn default_lock_timeout_ms() -> u64 {
    2_000
}

const fn default_true() -> bool {
    true
}
