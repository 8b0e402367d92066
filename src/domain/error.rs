use thiserror::Error;

/// Core domain errors
///
/// A lookup that finds nothing is never an error: misses are `Ok(None)`.
/// These variants cover genuine faults only.
#[derive(Debug, Clone, Error)]
pub enum DomainError {
    #[error("Usage error: {message}")]
    Usage { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Normalizer error: {message}")]
    Normalizer { message: String },

    #[error("Cancelled: {message}")]
    Cancelled { message: String },

    #[error("Cache error: {message}")]
    Cache { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DomainError {
    pub fn usage(message: impl Into<String>) -> Self {
        Self::Usage {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn normalizer(message: impl Into<String>) -> Self {
        Self::Normalizer {
            message: message.into(),
        }
    }

    pub fn cancelled(message: impl Into<String>) -> Self {
        Self::Cancelled {
            message: message.into(),
        }
    }

    pub fn cache(message: impl Into<String>) -> Self {
        Self::Cache {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns true for a wrong entry-point shape
    pub fn is_usage(&self) -> bool {
        matches!(self, Self::Usage { .. })
    }
}
