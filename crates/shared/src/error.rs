//! Error types for Injury Hub

use thiserror::Error;

/// Failure of a single external data provider.
///
/// Adapters return these instead of raw transport errors. The aggregation
/// tier absorbs every variant and degrades to an empty provider result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// Provider could not be reached, answered with an error status, or
    /// returned a body that could not be parsed
    #[error("Provider '{provider}' unavailable: {message}")]
    Unavailable { provider: String, message: String },

    /// Collection name does not resolve to anything on this provider
    #[error("Provider '{provider}' has no collection named '{collection}'")]
    UnknownCollection { provider: String, collection: String },

    /// Required credential absent when the adapter was constructed
    #[error("Provider '{provider}' is missing required configuration '{key}'")]
    ConfigurationMissing { provider: String, key: String },

    /// Provider did not answer within the configured deadline
    #[error("Provider '{provider}' timed out after {after_ms}ms")]
    Timeout { provider: String, after_ms: u64 },
}

impl ProviderError {
    pub fn unavailable(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Unavailable {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Name of the provider this error came from
    pub fn provider(&self) -> &str {
        match self {
            Self::Unavailable { provider, .. }
            | Self::UnknownCollection { provider, .. }
            | Self::ConfigurationMissing { provider, .. }
            | Self::Timeout { provider, .. } => provider,
        }
    }
}

/// General Injury Hub error type
#[derive(Debug, Error)]
pub enum HubError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// Caller used the API incorrectly (unknown operation, bad arguments)
    #[error("Invalid usage: {0}")]
    Usage(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl HubError {
    pub fn usage(message: impl Into<String>) -> Self {
        Self::Usage(message.into())
    }

    /// Whether this error was caused by the caller rather than the environment
    pub fn is_usage(&self) -> bool {
        matches!(self, Self::Usage(_))
    }
}

pub type Result<T> = std::result::Result<T, HubError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_error_carries_provider_name() {
        let err = ProviderError::unavailable("sheets", "connection refused");
        assert_eq!(err.provider(), "sheets");
        assert!(err.to_string().contains("connection refused"));

        let err = ProviderError::Timeout {
            provider: "hubspot".to_string(),
            after_ms: 250,
        };
        assert_eq!(err.provider(), "hubspot");
        assert!(err.to_string().contains("250ms"));
    }

    #[test]
    fn test_provider_error_converts_into_hub_error() {
        let err: HubError = ProviderError::ConfigurationMissing {
            provider: "hubspot".to_string(),
            key: "accessToken".to_string(),
        }
        .into();

        assert!(!err.is_usage());
        assert!(err.to_string().contains("accessToken"));
    }

    #[test]
    fn test_usage_error() {
        let err = HubError::usage("unknown operation 'bogus'");
        assert!(err.is_usage());
        assert_eq!(err.to_string(), "Invalid usage: unknown operation 'bogus'");
    }
}
