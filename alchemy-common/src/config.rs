//! Configuration loading and corpus path resolution
//!
//! Settings come from, in priority order:
//! 1. Command-line argument
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default
//!
//! A missing config file is not fatal: a warning is logged and the compiled
//! defaults are used.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "ALCHEMY_CONFIG";

/// Environment variable naming the corpus file
pub const CORPUS_ENV_VAR: &str = "ALCHEMY_CORPUS_PATH";

/// Corpus file used when nothing else is configured
pub const DEFAULT_CORPUS_FILE: &str = "elements.json";

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, Deserialize)]
pub struct TomlConfig {
    /// Interface the HTTP server binds to
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Corpus JSON file (optional, see [`resolve_corpus_path`])
    #[serde(default)]
    pub corpus_path: Option<PathBuf>,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub limits: QueryLimits,

    #[serde(default)]
    pub animation: AnimationConfig,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
            corpus_path: None,
            logging: LoggingConfig::default(),
            limits: QueryLimits::default(),
            animation: AnimationConfig::default(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Caps applied to the `count` parameters of the query façade
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
pub struct QueryLimits {
    /// Upper bound for path endpoints
    #[serde(default = "default_max_path_count")]
    pub max_path_count: usize,

    /// Upper bound for tree endpoints (unless `all` is requested)
    #[serde(default = "default_max_tree_count")]
    pub max_tree_count: usize,

    /// Safety bound used when a caller asks for all trees
    #[serde(default = "default_all_trees_cap")]
    pub all_trees_cap: usize,
}

impl Default for QueryLimits {
    fn default() -> Self {
        Self {
            max_path_count: default_max_path_count(),
            max_tree_count: default_max_tree_count(),
            all_trees_cap: default_all_trees_cap(),
        }
    }
}

/// Animation pacing
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
pub struct AnimationConfig {
    /// Delay between consecutive animation events
    #[serde(default = "default_step_delay_ms")]
    pub step_delay_ms: u64,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            step_delay_ms: default_step_delay_ms(),
        }
    }
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_path_count() -> usize {
    10
}

fn default_max_tree_count() -> usize {
    10
}

fn default_all_trees_cap() -> usize {
    1000
}

fn default_step_delay_ms() -> u64 {
    50
}

/// Platform config file location (`<config_dir>/alchemy/config.toml`)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("alchemy").join("config.toml"))
}

/// Load the TOML config
///
/// Path selection: `explicit` argument, then `ALCHEMY_CONFIG`, then
/// [`default_config_path`]. A missing file yields defaults; an unreadable or
/// invalid file is an error.
pub fn load_toml_config(explicit: Option<&Path>) -> Result<TomlConfig> {
    let path = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => std::env::var(CONFIG_ENV_VAR)
            .ok()
            .map(PathBuf::from)
            .or_else(default_config_path),
    };

    let Some(path) = path else {
        warn!("Could not determine config directory, using default configuration");
        return Ok(TomlConfig::default());
    };

    if !path.exists() {
        warn!(
            "Config file not found at {}, using default configuration",
            path.display()
        );
        return Ok(TomlConfig::default());
    }

    let content = std::fs::read_to_string(&path)?;
    let config = toml::from_str::<TomlConfig>(&content)
        .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
    info!("Loaded configuration from {}", path.display());
    Ok(config)
}

/// Resolve the corpus file path
///
/// Priority: command-line argument, then `ALCHEMY_CORPUS_PATH`, then the
/// `corpus_path` key of the TOML config, then `elements.json`.
pub fn resolve_corpus_path(cli_arg: Option<&Path>, config: &TomlConfig) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Ok(path) = std::env::var(CORPUS_ENV_VAR) {
        if !path.is_empty() {
            return PathBuf::from(path);
        }
    }

    if let Some(path) = &config.corpus_path {
        return path.clone();
    }

    PathBuf::from(DEFAULT_CORPUS_FILE)
}
