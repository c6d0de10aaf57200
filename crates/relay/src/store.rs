use std::{
    collections::BTreeSet,
    sync::{RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use {serde::Serialize, tracing::info};

use crate::{
    error::{Error, MissingField, Result},
    event::ChannelId,
};

/// Point-in-time copy of the relay configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RelaySnapshot {
    pub sources: BTreeSet<ChannelId>,
    pub destination: Option<ChannelId>,
    pub enabled: bool,
}

impl RelaySnapshot {
    /// Fields that still need to be set before relaying can start.
    pub fn missing_fields(&self) -> Vec<MissingField> {
        let mut missing = Vec::new();
        if self.sources.is_empty() {
            missing.push(MissingField::Sources);
        }
        if self.destination.is_none() {
            missing.push(MissingField::Destination);
        }
        missing
    }

    /// Whether a relay may proceed with this configuration.
    pub fn is_active(&self) -> bool {
        self.enabled && self.missing_fields().is_empty()
    }
}

/// Shared, in-memory relay configuration.
///
/// The whole configuration sits behind one lock so that a snapshot never
/// mixes values from two different updates. The lock is never held across
/// an `.await`.
#[derive(Debug, Default)]
pub struct RelayStore {
    inner: RwLock<RelaySnapshot>,
}

impl RelayStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Immutable copy of the current configuration.
    pub fn snapshot(&self) -> RelaySnapshot {
        self.read().clone()
    }

    /// Replace the source set. Every token must parse as a channel id and at
    /// least one must be given; on error the previous set is kept.
    pub fn set_sources<S: AsRef<str>>(&self, tokens: &[S]) -> Result<BTreeSet<ChannelId>> {
        if tokens.is_empty() {
            return Err(Error::invalid_argument("no source channel IDs given"));
        }
        let sources = tokens
            .iter()
            .map(|t| parse_channel_id(t.as_ref()))
            .collect::<Result<BTreeSet<_>>>()?;

        self.write().sources = sources.clone();
        info!(sources = ?sources, "relay sources set");
        Ok(sources)
    }

    /// Replace the destination channel.
    pub fn set_destination(&self, token: Option<&str>) -> Result<ChannelId> {
        let token =
            token.ok_or_else(|| Error::invalid_argument("no destination channel ID given"))?;
        let destination = parse_channel_id(token)?;

        self.write().destination = Some(destination);
        info!(destination, "relay destination set");
        Ok(destination)
    }

    pub fn clear_sources(&self) {
        self.write().sources.clear();
        info!("relay sources cleared");
    }

    pub fn clear_destination(&self) {
        self.write().destination = None;
        info!("relay destination cleared");
    }

    /// Turn relaying on. Fails without touching the flag when sources or
    /// destination are missing.
    pub fn enable(&self) -> Result<()> {
        let mut config = self.write();
        let missing = config.missing_fields();
        if !missing.is_empty() {
            return Err(Error::PreconditionFailed { missing });
        }
        config.enabled = true;
        drop(config);
        info!(enabled = true, "relay enabled");
        Ok(())
    }

    pub fn disable(&self) {
        self.write().enabled = false;
        info!(enabled = false, "relay disabled");
    }

    /// Set the enabled flag, applying the same precondition as [`Self::enable`]
    /// when turning it on.
    pub fn set_enabled(&self, enabled: bool) -> Result<()> {
        if enabled {
            self.enable()
        } else {
            self.disable();
            Ok(())
        }
    }

    // Every write leaves the struct consistent, so a poisoned lock is still
    // safe to use.
    fn read(&self) -> RwLockReadGuard<'_, RelaySnapshot> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, RelaySnapshot> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }
}

/// Parse a single operator-supplied channel id.
pub fn parse_channel_id(token: &str) -> Result<ChannelId> {
    token
        .trim()
        .parse::<ChannelId>()
        .map_err(|_| Error::invalid_argument(format!("not a channel ID: {token:?}")))
}
