//! Configuration module.
//!
//! Settings resolve through defaults → config file → env vars → CLI args.
//! See [`loader`] for each layer.

pub mod loader;

pub use loader::{
    apply_cli_overrides, apply_env_overrides, load_config_with_precedence, merge_config,
    ConfigError, ConfigFile, ResolvedConfig,
};
