//! Error types for configuration and the generation backend.
//!
//! [`ConfigError`] is fatal and only ever raised while starting up.
//! [`DeliveryError`] ends a run whose newsletter was written but not mailed.
//! [`BackendError`] describes one failed chat request. It is classified into
//! retryable and permanent failures and never leaves the judgment client.

use std::path::PathBuf;

/// Startup configuration problem. The run does not begin when one is raised.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// No API key was supplied through the config file, `--api-key` or the environment.
    #[error("missing generation backend credential (set backend.api_key, --api-key or GOOGLE_API_KEY)")]
    MissingCredential,

    /// The backend endpoint is not an http(s) URL.
    #[error("invalid backend endpoint {url:?}: {reason}")]
    InvalidEndpoint { url: String, reason: String },

    /// The backend refused the API key while it was being checked at startup.
    #[error("generation backend rejected the credential (HTTP {status})")]
    RejectedCredential { status: u16 },

    /// An email address in the delivery settings does not parse.
    #[error("invalid email address {address:?}: {source}")]
    InvalidAddress {
        address: String,
        source: lettre::address::AddressError,
    },

    /// A setting is outside its allowed range.
    #[error("invalid setting {field}: {reason}")]
    Invalid { field: &'static str, reason: String },

    /// The config file could not be read.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The config file is not valid YAML for [`crate::config::Config`].
    #[error("config parse error: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// The HTTP client could not be built (TLS backend, invalid header, ...).
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
}

impl ConfigError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// A single failed round trip to the generation backend.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// The backend answered with a non-success HTTP status.
    #[error("backend returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// The request never produced a response (connect, timeout, send).
    #[error("backend transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body was not a chat completion.
    #[error("backend response could not be decoded: {0}")]
    Decode(String),
}

/// The newsletter could not be handed to the SMTP server.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    /// The message itself could not be assembled.
    #[error("failed to build newsletter email: {0}")]
    Message(#[from] lettre::error::Error),

    /// Connecting, authenticating or sending failed.
    #[error("SMTP delivery failed: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_formatting() {
        let err = ConfigError::invalid("retry.attempts", "must be at least 1");
        assert_eq!(
            err.to_string(),
            "invalid setting retry.attempts: must be at least 1"
        );

        let err = BackendError::Status {
            status: 429,
            body: "slow down".into(),
        };
        assert!(err.to_string().contains("429"));
        assert!(ConfigError::MissingCredential.to_string().contains("GOOGLE_API_KEY"));
        assert_eq!(
            ConfigError::RejectedCredential { status: 401 }.to_string(),
            "generation backend rejected the credential (HTTP 401)"
        );
    }
}
