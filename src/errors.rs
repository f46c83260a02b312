use std::fmt;

/// Engine-specific error types.
#[derive(Debug)]
pub enum ScoringError {
    /// The call itself was invalid (e.g. blank user id).
    InvalidRequest(String),
    /// Required input is absent and nothing can be computed.
    ///
    /// Kept in the taxonomy for callers of future batch APIs; the engines
    /// themselves return floor values instead of raising this for missing
    /// data, since scoring thin-file users is a first-class case.
    InsufficientData(String),
    /// Error reaching or parsing an alternative-data provider.
    ProviderError(String),
    /// A provider call exceeded its timeout budget.
    ProviderTimeout(String),
    /// Internal computation error.
    InternalError(String),
    /// Error with context chain for better debugging.
    WithContext {
        /// The underlying source of the error.
        source: Box<ScoringError>,
        /// Additional context message.
        context: String,
    },
}

impl fmt::Display for ScoringError {
    /// Formats the error for display.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScoringError::InvalidRequest(msg) => write!(f, "Invalid request: {}", msg),
            ScoringError::InsufficientData(msg) => write!(f, "Insufficient data: {}", msg),
            ScoringError::ProviderError(msg) => write!(f, "Provider error: {}", msg),
            ScoringError::ProviderTimeout(msg) => write!(f, "Provider timeout: {}", msg),
            ScoringError::InternalError(msg) => write!(f, "Internal error: {}", msg),
            ScoringError::WithContext { source, context } => {
                write!(f, "{}: {}", context, source)
            }
        }
    }
}

impl std::error::Error for ScoringError {}

impl Clone for ScoringError {
    fn clone(&self) -> Self {
        match self {
            ScoringError::InvalidRequest(msg) => ScoringError::InvalidRequest(msg.clone()),
            ScoringError::InsufficientData(msg) => ScoringError::InsufficientData(msg.clone()),
            ScoringError::ProviderError(msg) => ScoringError::ProviderError(msg.clone()),
            ScoringError::ProviderTimeout(msg) => ScoringError::ProviderTimeout(msg.clone()),
            ScoringError::InternalError(msg) => ScoringError::InternalError(msg.clone()),
            ScoringError::WithContext { source, context } => ScoringError::WithContext {
                source: source.clone(),
                context: context.clone(),
            },
        }
    }
}

impl From<reqwest::Error> for ScoringError {
    /// Converts a `reqwest::Error` into a `ScoringError`.
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ScoringError::ProviderTimeout(err.to_string())
        } else {
            ScoringError::ProviderError(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ScoringError {
    fn from(err: serde_json::Error) -> Self {
        ScoringError::InternalError(format!("Serialization error: {}", err))
    }
}

/// Extension trait for adding context to errors.
/// Similar to `anyhow::Context` but for our `ScoringError` type.
pub trait ResultExt<T> {
    /// Add context to an error.
    ///
    /// # Arguments
    ///
    /// * `context` - The context message to add.
    fn context(self, context: impl Into<String>) -> Result<T, ScoringError>;

    /// Add context lazily (only evaluated on error).
    ///
    /// # Arguments
    ///
    /// * `f` - A closure that produces the context message.
    #[allow(dead_code)]
    fn with_context<F>(self, f: F) -> Result<T, ScoringError>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for Result<T, ScoringError> {
    fn context(self, context: impl Into<String>) -> Result<T, ScoringError> {
        self.map_err(|e| ScoringError::WithContext {
            source: Box::new(e),
            context: context.into(),
        })
    }

    fn with_context<F>(self, f: F) -> Result<T, ScoringError>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| ScoringError::WithContext {
            source: Box::new(e),
            context: f(),
        })
    }
}

impl<T> ResultExt<T> for Result<T, reqwest::Error> {
    fn context(self, context: impl Into<String>) -> Result<T, ScoringError> {
        self.map_err(|e| ScoringError::WithContext {
            source: Box::new(ScoringError::from(e)),
            context: context.into(),
        })
    }

    fn with_context<F>(self, f: F) -> Result<T, ScoringError>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| ScoringError::WithContext {
            source: Box::new(ScoringError::from(e)),
            context: f(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_chains_display() {
        let base: Result<(), ScoringError> =
            Err(ScoringError::ProviderError("connection refused".to_string()));
        let wrapped = base.context("telecom lookup");
        let msg = wrapped.unwrap_err().to_string();
        assert_eq!(msg, "telecom lookup: Provider error: connection refused");
    }

    #[test]
    fn clone_preserves_context_chain() {
        let err = ScoringError::WithContext {
            source: Box::new(ScoringError::ProviderTimeout("2s elapsed".to_string())),
            context: "utility lookup".to_string(),
        };
        let cloned = err.clone();
        assert_eq!(err.to_string(), cloned.to_string());
    }
}
