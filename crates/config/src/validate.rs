//! Configuration validation.
//!
//! Reports unknown/misspelled keys and values that would break the bot at
//! start-up, without touching the network.

use std::path::{Path, PathBuf};

use secrecy::ExposeSecret;

use crate::{
    env_subst::substitute_env,
    loader::{find_config_file, parse_config, parse_config_value},
    schema::TgRelayConfig,
};

/// Severity level for a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
            Self::Info => write!(f, "info"),
        }
    }
}

/// A single validation diagnostic.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Category: "syntax", "unknown-field", "value", "file-ref"
    pub category: &'static str,
    /// Dotted path, e.g. "telegram.token"
    pub path: String,
    pub message: String,
}

impl Diagnostic {
    fn new(
        severity: Severity,
        category: &'static str,
        path: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            category,
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Result of validating a configuration file.
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub diagnostics: Vec<Diagnostic>,
    pub config_path: Option<PathBuf>,
}

impl ValidationResult {
    /// Returns `true` if any diagnostic is an error.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    /// Count diagnostics by severity.
    #[must_use]
    pub fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }
}

/// Known keys per top-level section.
const KNOWN_KEYS: &[(&str, &[&str])] = &[
    ("telegram", &[
        "token",
        "poll_timeout_secs",
        "client_timeout_secs",
        "register_commands",
        "api_url",
    ]),
    ("relay", &["send_timeout_secs"]),
];

/// Validate a config file at the given path, or the discovered default.
#[must_use]
pub fn validate(path: Option<&Path>) -> ValidationResult {
    let config_path = path.map(Path::to_path_buf).or_else(find_config_file);

    let Some(ref actual_path) = config_path else {
        return ValidationResult {
            diagnostics: vec![Diagnostic::new(
                Severity::Info,
                "file-ref",
                "",
                "no config file found; using defaults",
            )],
            config_path: None,
        };
    };

    match std::fs::read_to_string(actual_path) {
        Ok(content) => {
            let mut result = validate_str(&content, actual_path);
            result.config_path = Some(actual_path.clone());
            result
        },
        Err(e) => ValidationResult {
            diagnostics: vec![Diagnostic::new(
                Severity::Error,
                "syntax",
                "",
                format!("failed to read config file: {e}"),
            )],
            config_path: Some(actual_path.clone()),
        },
    }
}

/// Validate raw config text; the format is taken from `path`'s extension.
#[must_use]
pub fn validate_str(raw: &str, path: &Path) -> ValidationResult {
    let raw = substitute_env(raw);
    let mut diagnostics = Vec::new();

    let value = match parse_config_value(&raw, path) {
        Ok(v) => v,
        Err(e) => {
            diagnostics.push(Diagnostic::new(
                Severity::Error,
                "syntax",
                "",
                format!("parse error: {e}"),
            ));
            return ValidationResult {
                diagnostics,
                config_path: None,
            };
        },
    };
    check_unknown_fields(&value, &mut diagnostics);

    match parse_config(&raw, path) {
        Ok(config) => check_values(&config, &mut diagnostics),
        Err(e) => diagnostics.push(Diagnostic::new(
            Severity::Error,
            "value",
            "",
            format!("invalid value: {e}"),
        )),
    }

    ValidationResult {
        diagnostics,
        config_path: None,
    }
}

/// Check the values of an already loaded config, including env and
/// command-line overrides that never appear in the file.
#[must_use]
pub fn check_config(config: &TgRelayConfig) -> ValidationResult {
    let mut diagnostics = Vec::new();
    check_values(config, &mut diagnostics);
    ValidationResult {
        diagnostics,
        config_path: None,
    }
}

fn check_unknown_fields(value: &serde_json::Value, diagnostics: &mut Vec<Diagnostic>) {
    let Some(root) = value.as_object() else {
        return;
    };
    for (section, body) in root {
        let Some((_, keys)) = KNOWN_KEYS.iter().find(|(name, _)| *name == section.as_str()) else {
            diagnostics.push(Diagnostic::new(
                Severity::Warning,
                "unknown-field",
                section.clone(),
                format!("unknown section \"{section}\""),
            ));
            continue;
        };
        let Some(fields) = body.as_object() else {
            continue;
        };
        for key in fields.keys() {
            if !keys.contains(&key.as_str()) {
                let prefix: String = key.chars().take(4).collect();
                let hint = keys
                    .iter()
                    .find(|k| k.starts_with(prefix.as_str()))
                    .map(|k| format!(" (did you mean \"{k}\"?)"))
                    .unwrap_or_default();
                diagnostics.push(Diagnostic::new(
                    Severity::Warning,
                    "unknown-field",
                    format!("{section}.{key}"),
                    format!("unknown field \"{key}\"{hint}"),
                ));
            }
        }
    }
}

fn check_values(config: &TgRelayConfig, diagnostics: &mut Vec<Diagnostic>) {
    let tg = &config.telegram;
    let token = tg.token.expose_secret();
    if !tg.has_token() || token.starts_with("${") {
        diagnostics.push(Diagnostic::new(
            Severity::Error,
            "value",
            "telegram.token",
            "bot token is not set (set it here or via TGRELAY_BOT_TOKEN)",
        ));
    } else if !looks_like_bot_token(token) {
        diagnostics.push(Diagnostic::new(
            Severity::Warning,
            "value",
            "telegram.token",
            "bot token should look like <bot id>:<secret>",
        ));
    }

    if tg.client_timeout_secs <= u64::from(tg.poll_timeout_secs) {
        diagnostics.push(Diagnostic::new(
            Severity::Error,
            "value",
            "telegram.client_timeout_secs",
            format!(
                "client timeout ({}s) must exceed poll timeout ({}s)",
                tg.client_timeout_secs, tg.poll_timeout_secs
            ),
        ));
    }

    if let Some(ref url) = tg.api_url
        && !(url.starts_with("http://") || url.starts_with("https://"))
    {
        diagnostics.push(Diagnostic::new(
            Severity::Error,
            "value",
            "telegram.api_url",
            format!("api_url must be an http(s) URL, got \"{url}\""),
        ));
    }

    if config.relay.send_timeout_secs == 0 {
        diagnostics.push(Diagnostic::new(
            Severity::Error,
            "value",
            "relay.send_timeout_secs",
            "send timeout must be at least 1 second",
        ));
    }
}

fn looks_like_bot_token(token: &str) -> bool {
    match token.split_once(':') {
        Some((id, secret)) => {
            !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit()) && !secret.is_empty()
        },
        None => false,
    }
}
