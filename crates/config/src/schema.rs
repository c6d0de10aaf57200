//! Config schema types.
use std::time::Duration;

use {
    secrecy::{ExposeSecret, Secret},
    serde::{Deserialize, Serialize},
};

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TgRelayConfig {
    pub telegram: TelegramConfig,
    pub relay: RelaySettings,
}

impl TgRelayConfig {
    /// Copy with the bot token masked, safe to print.
    #[must_use]
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if copy.telegram.has_token() {
            copy.telegram.token = Secret::new("[REDACTED]".into());
        }
        copy
    }
}

/// Telegram bot connection settings.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    /// Bot token from @BotFather.
    #[serde(serialize_with = "serialize_secret")]
    pub token: Secret<String>,

    /// Long-polling timeout passed to `getUpdates` (seconds).
    pub poll_timeout_secs: u32,

    /// HTTP client timeout (seconds). Must exceed `poll_timeout_secs` or the
    /// client aborts long-poll requests before Telegram answers.
    pub client_timeout_secs: u64,

    /// Register the operator commands with `setMyCommands` at start-up.
    pub register_commands: bool,

    /// Custom Bot API server URL (e.g. a local `telegram-bot-api`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
}

impl std::fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("token", &"[REDACTED]")
            .field("poll_timeout_secs", &self.poll_timeout_secs)
            .field("client_timeout_secs", &self.client_timeout_secs)
            .field("register_commands", &self.register_commands)
            .field("api_url", &self.api_url)
            .finish()
    }
}

fn serialize_secret<S: serde::Serializer>(
    secret: &Secret<String>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose_secret())
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            token: Secret::new(String::new()),
            poll_timeout_secs: 30,
            client_timeout_secs: 45,
            register_commands: true,
            api_url: None,
        }
    }
}

impl TelegramConfig {
    pub fn has_token(&self) -> bool {
        !self.token.expose_secret().trim().is_empty()
    }

    pub fn client_timeout(&self) -> Duration {
        Duration::from_secs(self.client_timeout_secs)
    }
}

/// Relay pipeline settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RelaySettings {
    /// Upper bound on a single outbound send (seconds).
    pub send_timeout_secs: u64,
}

impl Default for RelaySettings {
    fn default() -> Self {
        Self {
            send_timeout_secs: 30,
        }
    }
}

impl RelaySettings {
    pub fn send_timeout(&self) -> Duration {
        Duration::from_secs(self.send_timeout_secs)
    }
}
