//! Configuration loading, validation, and env substitution.
//!
//! Config files: `tgrelay.toml`, `tgrelay.yaml`, or `tgrelay.json`
//! Searched in `./` then `~/.config/tgrelay/`.
//!
//! Supports `${ENV_VAR}` substitution in all string values.

pub mod env_subst;
pub mod error;
pub mod loader;
pub mod schema;
pub mod template;
pub mod validate;

pub use {
    error::{Error, Result},
    loader::{
        apply_env_overrides, config_dir, discover_and_load, find_config_file,
        find_or_default_config_path, load_config, load_or_default, write_template,
    },
    schema::{RelaySettings, TelegramConfig, TgRelayConfig},
    validate::{Diagnostic, Severity, ValidationResult, check_config},
};
