use thiserror::Error;

/// Failures while starting or running the Telegram transport.
#[derive(Debug, Error)]
pub enum Error {
    /// A Bot API call failed.
    #[error(transparent)]
    Telegram(#[from] teloxide::RequestError),

    /// Local setup failed before any API call was made.
    #[error("{context}: {source}")]
    Setup {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl Error {
    #[must_use]
    pub fn setup(
        context: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Setup {
            context: context.into(),
            source: Box::new(source),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setup_error_keeps_context_and_source() {
        let err = Error::setup(
            "failed to build telegram http client",
            std::io::Error::other("tls"),
        );
        assert_eq!(err.to_string(), "failed to build telegram http client: tls");
        assert!(std::error::Error::source(&err).is_some());
    }
}
