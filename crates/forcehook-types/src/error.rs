use thiserror::Error;

/// Errors surfaced by webhook discovery and provisioning.
///
/// Messages carried by `Duplicate` and `Upstream` are the platform's own
/// text, passed through unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WebhookError {
    /// Missing or unusable credential/environment pair.
    #[error("not authorized: {0}")]
    Authorization(String),

    /// Request payload is not a complete, valid webhook definition.
    #[error("{0}")]
    Validation(String),

    /// A generated trigger body could not be read back.
    #[error("cannot parse trigger '{name}': {reason}")]
    Parse { name: String, reason: String },

    /// An artifact with the same name already exists on the platform.
    #[error("{0}")]
    Duplicate(String),

    /// The platform call itself failed.
    #[error("{0}")]
    Upstream(String),
}

impl WebhookError {
    /// Stable machine-readable code for API responses.
    pub fn code(&self) -> &'static str {
        match self {
            WebhookError::Authorization(_) => "UNAUTHORIZED",
            WebhookError::Validation(_) => "VALIDATION_ERROR",
            WebhookError::Parse { .. } => "PARSE_ERROR",
            WebhookError::Duplicate(_) => "DUPLICATE",
            WebhookError::Upstream(_) => "UPSTREAM_ERROR",
        }
    }
}

/// Errors from the external platform client.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlatformError {
    #[error("{0}")]
    Duplicate(String),

    #[error("{0}")]
    Upstream(String),
}

impl From<PlatformError> for WebhookError {
    fn from(e: PlatformError) -> Self {
        match e {
            PlatformError::Duplicate(msg) => WebhookError::Duplicate(msg),
            PlatformError::Upstream(msg) => WebhookError::Upstream(msg),
        }
    }
}
