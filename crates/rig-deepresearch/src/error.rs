// src/error.rs
//! Error types
//!
//! `CallError` is the closed classification every collaborator (search
//! provider, text generator) maps its failures into. The resilience wrapper
//! only ever looks at the kind, never at provider-specific error shapes.

use std::time::Duration;
use thiserror::Error;

/// Failure of a single external call
#[derive(Error, Debug, Clone)]
pub enum CallError {
    /// The remote service asked us to slow down
    #[error("Rate limited: {message}")]
    RateLimited {
        message: String,
        /// Server-advertised wait before the next attempt, if any
        retry_after: Option<Duration>,
    },

    /// Server error, connection reset or transport-level timeout
    #[error("Transient failure: {0}")]
    Transient(String),

    /// The wrapper's own deadline elapsed before the call finished
    #[error("{operation} timed out after {after:?}")]
    Timeout { operation: String, after: Duration },

    /// Retryable failures persisted past the attempt limit
    #[error("{operation} failed after {attempts} attempts: {last}")]
    MaxRetriesExceeded {
        operation: String,
        attempts: usize,
        #[source]
        last: Box<CallError>,
    },

    /// Anything that must not be retried
    #[error("{0}")]
    Fatal(String),
}

impl CallError {
    /// Rate limit without a server hint
    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::RateLimited {
            message: message.into(),
            retry_after: None,
        }
    }

    /// Rate limit carrying a server-advertised reset delay
    pub fn rate_limited_for(message: impl Into<String>, retry_after: Duration) -> Self {
        Self::RateLimited {
            message: message.into(),
            retry_after: Some(retry_after),
        }
    }

    pub fn transient(message: impl Into<String>) -> Self {
        Self::Transient(message.into())
    }

    pub fn fatal(message: impl Into<String>) -> Self {
        Self::Fatal(message.into())
    }

    /// Check if the resilience wrapper may retry this error
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimited { .. } | Self::Transient(_))
    }

    /// Check if this is the wrapper deadline (not a transport timeout)
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Server hint attached to a rate-limit error
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimited { retry_after, .. } => *retry_after,
            _ => None,
        }
    }

    /// Classify a reqwest transport error (no HTTP status received)
    pub fn from_transport(error: &reqwest::Error) -> Self {
        if error.is_timeout() || error.is_connect() {
            Self::Transient(error.to_string())
        } else if error.is_decode() {
            Self::Fatal(format!("Failed to parse response: {}", error))
        } else {
            Self::Transient(format!("Network error: {}", error))
        }
    }
}

/// Top-level research errors
///
/// A research run only fails with this type for problems discovered before
/// any exploration starts. Node-level failures are folded into the result.
#[derive(Error, Debug)]
pub enum ResearchError {
    #[error("Invalid research configuration: {0}")]
    InvalidConfig(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_kinds() {
        assert!(CallError::rate_limited("slow down").is_retryable());
        assert!(CallError::transient("502").is_retryable());

        assert!(!CallError::fatal("401").is_retryable());
        assert!(!CallError::Timeout {
            operation: "search".to_string(),
            after: Duration::from_secs(1),
        }
        .is_retryable());
    }

    #[test]
    fn test_max_retries_keeps_last_cause() {
        let err = CallError::MaxRetriesExceeded {
            operation: "search".to_string(),
            attempts: 3,
            last: Box::new(CallError::rate_limited("429")),
        };
        assert!(!err.is_retryable());
        assert!(err.to_string().contains("3 attempts"));
        assert!(err.to_string().contains("429"));
    }

    #[test]
    fn test_retry_after_hint() {
        let err = CallError::rate_limited_for("429", Duration::from_secs(7));
        assert_eq!(err.retry_after(), Some(Duration::from_secs(7)));
        assert_eq!(CallError::transient("x").retry_after(), None);
    }

    #[test]
    fn test_invalid_config_message() {
        let err = ResearchError::InvalidConfig("breadth must be at least 1".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid research configuration: breadth must be at least 1"
        );
    }
}
