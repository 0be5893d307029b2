//! Error types for Mushaf
//!
//! All modules use `MushafResult<T>` as their return type. Errors never reach
//! the user directly: [`MushafError::notice`] maps each one to a short
//! [`Notice`] suitable for a chat reply.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for Mushaf operations
pub type MushafResult<T> = Result<T, MushafError>;

/// All errors that can occur in Mushaf
#[derive(Error, Debug)]
pub enum MushafError {
    // Remote data errors
    #[error("Fetch failed for {endpoint} after {attempts} attempt(s): {reason}")]
    FetchFailed {
        endpoint: String,
        attempts: u32,
        reason: String,
    },

    #[error("Data unavailable: {what}")]
    DataUnavailable { what: String },

    #[error("Unexpected response shape from {endpoint}: {reason}")]
    ResponseShape { endpoint: String, reason: String },

    #[error("Failed to load resource {id}: {reason}")]
    ResourceLoad { id: u32, reason: String },

    #[error("Not found: {0}")]
    NotFound(String),

    // Navigation errors
    #[error("Malformed navigation token '{token}': {reason}")]
    MalformedToken { token: String, reason: String },

    #[error("Navigation token is {len} bytes, limit is {limit}: {token}")]
    TokenTooLong {
        token: String,
        len: usize,
        limit: usize,
    },

    #[error("Invalid navigation intent for {view}: {reason}")]
    InvalidIntent { view: String, reason: String },

    #[error("No handler registered for view '{0}'")]
    UnknownView(String),

    // Feature errors
    #[error("Feature disabled: {0}")]
    FeatureDisabled(String),

    #[error("Subscription required")]
    SubscriptionRequired,

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Invalid configuration value {key}: {reason}")]
    ConfigValue { key: String, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    User(String),
}

impl MushafError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a malformed token error
    pub fn malformed(token: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedToken {
            token: token.into(),
            reason: reason.into(),
        }
    }

    /// Create a data unavailable error
    pub fn unavailable(what: impl Into<String>) -> Self {
        Self::DataUnavailable { what: what.into() }
    }

    /// Create a configuration value error
    pub fn config_value(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ConfigValue {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Check if error is retryable
    ///
    /// Retryable errors describe "data unavailable now", never a broken
    /// request or a programming error.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::FetchFailed { .. } | Self::DataUnavailable { .. } | Self::ResourceLoad { .. }
        )
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::ConfigInvalid { .. } | Self::ConfigValue { .. } => {
                Some("Run: mushaf config show")
            }
            Self::FetchFailed { .. } => Some("Check network access to the configured endpoints"),
            Self::FeatureDisabled(_) => Some("Set search.api_key or MUSHAF_SEARCH_API_KEY"),
            _ => None,
        }
    }

    /// Map the error to the user-visible notice for a chat reply
    pub fn notice(&self) -> Notice {
        match self {
            Self::FetchFailed { .. }
            | Self::DataUnavailable { .. }
            | Self::ResponseShape { .. }
            | Self::ResourceLoad { .. } => Notice::TryAgain,
            Self::NotFound(_) => Notice::NotFound,
            Self::MalformedToken { .. } | Self::UnknownView(_) => Notice::NotAvailableYet,
            Self::FeatureDisabled(_) => Notice::FeatureDisabled,
            Self::SubscriptionRequired => Notice::SubscriptionRequired,
            _ => Notice::Failed,
        }
    }
}

/// Short user-visible message kinds, one per failure class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    /// Remote data is unavailable right now
    TryAgain,
    /// The requested item does not exist
    NotFound,
    /// The feature is switched off in this deployment
    FeatureDisabled,
    /// The button is unknown or its token could not be read
    NotAvailableYet,
    /// The external subscription check said no
    SubscriptionRequired,
    /// Anything else
    Failed,
}

impl Notice {
    /// Message text shown to the user
    pub fn message(&self) -> &'static str {
        match self {
            Self::TryAgain => "Could not load this right now. Please try again shortly.",
            Self::NotFound => "Nothing was found for this selection.",
            Self::FeatureDisabled => "This feature is currently disabled.",
            Self::NotAvailableYet => "This feature is not available yet.",
            Self::SubscriptionRequired => "Please subscribe to the channel to continue.",
            Self::Failed => "Something went wrong.",
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}
