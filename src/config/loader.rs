//! Configuration file loading with precedence handling.

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

/// Env var naming an explicit config file.
pub const CONFIG_ENV: &str = "DANMAKU_CONFIG";
/// Env var overriding the comment margin.
pub const MARGIN_ENV: &str = "DANMAKU_MARGIN";
/// Env var overriding the default fetch period, in seconds.
pub const FETCH_PERIOD_ENV: &str = "DANMAKU_FETCH_PERIOD";

/// Errors that can occur during config loading.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Config file path cannot be resolved.
    #[error("Invalid config path: {0}")]
    InvalidPath(String),

    /// Failed to read config file (permission issues, not a file, ...).
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError {
        /// Path that failed to read.
        path: PathBuf,
        /// Reason for failure.
        reason: String,
    },

    /// Config file contains invalid TOML or unknown keys.
    #[error("Invalid TOML in {path}: {reason}")]
    ParseError {
        /// Path with invalid TOML.
        path: PathBuf,
        /// Parse error details.
        reason: String,
    },
}

/// TOML configuration file structure.
///
/// All fields are optional - if not specified, hardcoded defaults are used.
/// Corresponds to `~/.config/danmaku/config.toml`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Rows added to every measured comment height.
    #[serde(default)]
    pub comment_margin: Option<u16>,

    /// Batch period assumed before one is observed, in seconds.
    #[serde(default)]
    pub fetch_period_secs: Option<f64>,

    /// Event loop tick, in milliseconds.
    #[serde(default)]
    pub tick_ms: Option<u64>,

    /// Show comments-per-second in the status line.
    #[serde(default)]
    pub show_rate: Option<bool>,

    /// Path to log file for tracing output.
    #[serde(default)]
    pub log_file_path: Option<PathBuf>,
}

/// Resolved configuration after applying precedence rules.
///
/// Created by merging defaults, config file, env vars, and CLI args.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    /// Rows added to every measured height.
    pub comment_margin: u16,
    /// Default batch period.
    pub fetch_period: Duration,
    /// Event loop tick.
    pub tick: Duration,
    /// Status line telemetry.
    pub show_rate: bool,
    /// Path to log file for tracing output.
    pub log_file_path: PathBuf,
}

/// Batch period used when nothing else is configured.
pub const DEFAULT_FETCH_PERIOD: Duration = Duration::from_millis(5200);

/// Event loop tick used when nothing else is configured.
pub const DEFAULT_TICK: Duration = Duration::from_millis(50);

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            comment_margin: 0,
            fetch_period: DEFAULT_FETCH_PERIOD,
            tick: DEFAULT_TICK,
            show_rate: true,
            log_file_path: default_log_path(),
        }
    }
}

/// Resolve default log file path.
///
/// Returns `~/.local/state/danmaku/danmaku.log` on Linux, or the
/// platform's state directory elsewhere. Falls back to the current
/// directory if there is none.
pub fn default_log_path() -> PathBuf {
    if let Some(state_dir) = dirs::state_dir() {
        state_dir.join("danmaku").join("danmaku.log")
    } else {
        PathBuf::from("danmaku.log")
    }
}

/// Parse a period given in seconds. Rejects zero, negative and non-finite
/// values.
pub fn period_from_secs(secs: f64) -> Option<Duration> {
    Duration::try_from_secs_f64(secs)
        .ok()
        .filter(|period| !period.is_zero())
}

/// Load configuration file from a specific path.
///
/// Returns `Ok(None)` if file doesn't exist (not an error - use defaults).
///
/// # Errors
///
/// Returns error if file exists but has read or parse errors.
pub fn load_config_file(path: impl Into<PathBuf>) -> Result<Option<ConfigFile>, ConfigError> {
    let path = path.into();

    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path).map_err(|e| ConfigError::ReadError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    let config: ConfigFile = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    Ok(Some(config))
}

/// Resolve default config file path.
///
/// Returns `~/.config/danmaku/config.toml` on Linux, appropriate path on
/// other platforms. `None` if there is no config directory.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("danmaku").join("config.toml"))
}

/// Load configuration with precedence handling.
///
/// Precedence (highest to lowest):
/// 1. Explicit `config_path` argument (CLI `--config`)
/// 2. `DANMAKU_CONFIG` environment variable
/// 3. Default path `~/.config/danmaku/config.toml`
///
/// Missing config files are NOT errors - defaults are used.
///
/// # Errors
///
/// Returns `InvalidPath` for an empty `DANMAKU_CONFIG`, otherwise only if a
/// config file exists but cannot be read or parsed.
pub fn load_config_with_precedence(
    config_path: Option<PathBuf>,
) -> Result<Option<ConfigFile>, ConfigError> {
    if let Some(path) = config_path {
        return load_config_file(path);
    }

    if let Some(env_path) = std::env::var_os(CONFIG_ENV) {
        if env_path.is_empty() {
            return Err(ConfigError::InvalidPath(format!("{CONFIG_ENV} is empty")));
        }
        return load_config_file(PathBuf::from(env_path));
    }

    if let Some(default_path) = default_config_path() {
        return load_config_file(default_path);
    }

    Ok(None)
}

/// Merge config file into defaults to create resolved config.
///
/// For each field in `ConfigFile`, if `Some(value)`, use it; otherwise use
/// default. An unusable `fetch_period_secs` is ignored with a warning.
pub fn merge_config(config_file: Option<ConfigFile>) -> ResolvedConfig {
    let defaults = ResolvedConfig::default();

    let Some(config) = config_file else {
        return defaults;
    };

    let fetch_period = match config.fetch_period_secs {
        None => defaults.fetch_period,
        Some(secs) => period_from_secs(secs).unwrap_or_else(|| {
            warn!(secs, "ignoring non-positive fetch_period_secs in config file");
            defaults.fetch_period
        }),
    };

    ResolvedConfig {
        comment_margin: config.comment_margin.unwrap_or(defaults.comment_margin),
        fetch_period,
        tick: config
            .tick_ms
            .filter(|ms| *ms > 0)
            .map_or(defaults.tick, Duration::from_millis),
        show_rate: config.show_rate.unwrap_or(defaults.show_rate),
        log_file_path: config.log_file_path.unwrap_or(defaults.log_file_path),
    }
}

/// Apply environment variable overrides to resolved config.
///
/// Checks for:
/// - `DANMAKU_MARGIN`: comment margin in rows
/// - `DANMAKU_FETCH_PERIOD`: default fetch period in seconds
///
/// Values that do not parse are ignored with a warning.
pub fn apply_env_overrides(mut config: ResolvedConfig) -> ResolvedConfig {
    if let Ok(raw) = std::env::var(MARGIN_ENV) {
        match raw.trim().parse::<u16>() {
            Ok(margin) => config.comment_margin = margin,
            Err(e) => warn!(value = %raw, "ignoring {MARGIN_ENV}: {e}"),
        }
    }

    if let Ok(raw) = std::env::var(FETCH_PERIOD_ENV) {
        match raw.trim().parse::<f64>().ok().and_then(period_from_secs) {
            Some(period) => config.fetch_period = period,
            None => warn!(value = %raw, "ignoring {FETCH_PERIOD_ENV}: not a positive number"),
        }
    }

    config
}

/// Apply CLI argument overrides to resolved config.
///
/// CLI args have the highest precedence and override all other sources.
/// Only applies overrides for flags that were explicitly set by the user.
///
/// Precedence chain: Defaults → Config File → Env Vars → CLI Args (highest)
pub fn apply_cli_overrides(
    mut config: ResolvedConfig,
    margin_override: Option<u16>,
    fetch_period_override: Option<Duration>,
) -> ResolvedConfig {
    if let Some(margin) = margin_override {
        config.comment_margin = margin;
    }

    if let Some(period) = fetch_period_override {
        config.fetch_period = period;
    }

    config
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
