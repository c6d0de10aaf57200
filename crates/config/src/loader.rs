use std::path::{Path, PathBuf};

use {
    secrecy::Secret,
    tracing::{debug, warn},
};

use crate::{
    env_subst::substitute_env,
    error::{Error, Result},
    schema::TgRelayConfig,
};

/// Standard config file names, checked in order.
const CONFIG_FILENAMES: &[&str] = &[
    "tgrelay.toml",
    "tgrelay.yaml",
    "tgrelay.yml",
    "tgrelay.json",
];

/// Environment variable overriding `telegram.token`.
pub const TOKEN_ENV: &str = "TGRELAY_BOT_TOKEN";
/// Environment variable overriding `relay.send_timeout_secs`.
pub const SEND_TIMEOUT_ENV: &str = "TGRELAY_SEND_TIMEOUT_SECS";

/// Load config from the given path (any supported format).
pub fn load_config(path: &Path) -> Result<TgRelayConfig> {
    let raw = std::fs::read_to_string(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let raw = substitute_env(&raw);
    parse_config(&raw, path)
}

/// Discover and load config from standard locations.
///
/// Search order:
/// 1. `./tgrelay.{toml,yaml,yml,json}` (project-local)
/// 2. `~/.config/tgrelay/tgrelay.{toml,yaml,yml,json}` (user-global)
///
/// Returns `TgRelayConfig::default()` if no config file is found or the file
/// cannot be parsed.
pub fn discover_and_load() -> TgRelayConfig {
    if let Some(path) = find_config_file() {
        debug!(path = %path.display(), "loading config");
        match load_config(&path) {
            Ok(cfg) => return cfg,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to load config, using defaults");
            },
        }
    } else {
        debug!("no config file found, using defaults");
    }
    TgRelayConfig::default()
}

/// Load an explicitly given config file (errors are returned), or fall back
/// to [`discover_and_load`].
pub fn load_or_default(path: Option<&Path>) -> Result<TgRelayConfig> {
    match path {
        Some(path) => {
            debug!(path = %path.display(), "loading explicit config");
            load_config(path)
        },
        None => Ok(discover_and_load()),
    }
}

/// Find the first config file in standard locations.
pub fn find_config_file() -> Option<PathBuf> {
    // Project-local
    for name in CONFIG_FILENAMES {
        let p = PathBuf::from(name);
        if p.exists() {
            return Some(p);
        }
    }

    // User-global: ~/.config/tgrelay/
    if let Some(config_dir) = config_dir() {
        for name in CONFIG_FILENAMES {
            let p = config_dir.join(name);
            if p.exists() {
                return Some(p);
            }
        }
    }

    None
}

/// Returns the user-global config directory (`~/.config/tgrelay/`).
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "tgrelay").map(|d| d.config_dir().to_path_buf())
}

/// Returns the path of an existing config file, or the default TOML path.
pub fn find_or_default_config_path() -> PathBuf {
    if let Some(path) = find_config_file() {
        return path;
    }
    config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tgrelay.toml")
}

/// Write the documented default template to `path`, creating parent
/// directories. Refuses to overwrite an existing file.
pub fn write_template(path: &Path) -> Result<()> {
    if path.exists() {
        return Err(Error::message(format!(
            "{} already exists, not overwriting",
            path.display()
        )));
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| Error::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    std::fs::write(path, crate::template::default_config_template()).map_err(|source| {
        Error::Write {
            path: path.to_path_buf(),
            source,
        }
    })?;
    debug!(path = %path.display(), "wrote config template");
    Ok(())
}

/// Apply `TGRELAY_*` environment overrides on top of file values.
pub fn apply_env_overrides(config: &mut TgRelayConfig) {
    apply_env_overrides_with(config, |name| std::env::var(name).ok());
}

fn apply_env_overrides_with(config: &mut TgRelayConfig, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(token) = lookup(TOKEN_ENV).filter(|t| !t.trim().is_empty()) {
        config.telegram.token = Secret::new(token);
    }
    if let Some(raw) = lookup(SEND_TIMEOUT_ENV) {
        match raw.trim().parse::<u64>() {
            Ok(secs) => config.relay.send_timeout_secs = secs,
            Err(e) => warn!(var = SEND_TIMEOUT_ENV, value = %raw, error = %e, "ignoring invalid env override"),
        }
    }
}

pub(crate) fn parse_config(raw: &str, path: &Path) -> Result<TgRelayConfig> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match ext {
        "toml" => Ok(toml::from_str(raw)?),
        "yaml" | "yml" => Ok(serde_yaml::from_str(raw)?),
        "json" => Ok(serde_json::from_str(raw)?),
        _ => Err(Error::UnsupportedFormat(ext.to_string())),
    }
}

pub(crate) fn parse_config_value(raw: &str, path: &Path) -> Result<serde_json::Value> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match ext {
        "toml" => {
            let v: toml::Value = toml::from_str(raw)?;
            Ok(serde_json::to_value(v)?)
        },
        "yaml" | "yml" => {
            let v: serde_yaml::Value = serde_yaml::from_str(raw)?;
            Ok(serde_json::to_value(v)?)
        },
        "json" => Ok(serde_json::from_str(raw)?),
        _ => Err(Error::UnsupportedFormat(ext.to_string())),
    }
}
