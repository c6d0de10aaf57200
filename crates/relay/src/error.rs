use std::{error::Error as StdError, fmt, time::Duration};

/// Crate-wide result type for relay operations.
pub type Result<T> = std::result::Result<T, Error>;

/// A configuration field that must be set before relaying can start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingField {
    Sources,
    Destination,
}

impl fmt::Display for MissingField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sources => f.write_str("source channel IDs"),
            Self::Destination => f.write_str("destination channel ID"),
        }
    }
}

/// Typed relay errors.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Operator input could not be parsed as channel identifiers.
    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },

    /// Relaying was requested before sources and destination were set.
    #[error("relay not configured: missing {}", join_missing(.missing))]
    PreconditionFailed { missing: Vec<MissingField> },

    /// The outbound send did not complete in time.
    #[error("send timed out after {}s", .timeout.as_secs_f32())]
    SendTimeout { timeout: Duration },

    /// The outbound send capability reported a failure.
    #[error("send failed: {context}: {source}")]
    Send {
        context: String,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },
}

impl Error {
    #[must_use]
    pub fn invalid_argument(message: impl fmt::Display) -> Self {
        Self::InvalidArgument {
            message: message.to_string(),
        }
    }

    #[must_use]
    pub fn send(
        context: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self::Send {
            context: context.into(),
            source: Box::new(source),
        }
    }

    /// Whether this error comes from the outbound transport rather than
    /// from operator input.
    pub fn is_send_failure(&self) -> bool {
        matches!(self, Self::SendTimeout { .. } | Self::Send { .. })
    }
}

pub(crate) fn join_missing(missing: &[MissingField]) -> String {
    missing
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" and ")
}
