//! Error taxonomy for the research orchestration core
//!
//! Four classes of failure flow through the pipeline:
//! - Validation errors: bad input shape/size, never retried
//! - Domain execution errors: investigator failures and timeouts
//! - Transformation errors: required-domain coverage missing
//! - System errors: infrastructure-level, retryable below `Critical`
//!
//! Retryability is a pure function of the structured error value, never of
//! message text.

use crate::types::{Domain, SessionId};
use std::time::Duration;

/// Severity attached to system-level errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// Informational
    Info,
    /// Degraded but functional
    Warning,
    /// Operation failed
    Error,
    /// Unrecoverable; never retried
    Critical,
}

/// Main error type for the orchestration core
#[derive(Debug, thiserror::Error)]
pub enum ResearchError {
    /// Input shape or size violation
    #[error("validation failed: {0}")]
    Validation(String),

    /// An investigator raised a domain-scoped failure
    #[error("domain {domain} failed: {message}")]
    DomainExecution {
        /// Failing domain
        domain: Domain,
        /// Failure description
        message: String,
    },

    /// A domain call lost the race against its timeout
    #[error("domain {domain} timed out after {elapsed:?}")]
    Timeout {
        /// Timed-out domain
        domain: Domain,
        /// Configured timeout that elapsed
        elapsed: Duration,
    },

    /// Result validation or synthesis failed
    #[error("transformation failed: {0}")]
    Transformation(String),

    /// Infrastructure-level failure with a severity
    #[error("system error ({severity:?}): {message}")]
    System {
        /// Error severity
        severity: Severity,
        /// Failure description
        message: String,
    },

    /// All retry attempts consumed; carries only the last underlying error
    #[error("retries exhausted after {attempts} attempts: {source}")]
    RetryExhausted {
        /// Number of attempts made
        attempts: u32,
        /// Last underlying error
        source: Box<ResearchError>,
    },

    /// Session unknown or expired; the caller must recreate it
    #[error("session not found: {0}")]
    SessionNotFound(SessionId),
}

impl ResearchError {
    /// Default retry classification.
    ///
    /// Domain failures and timeouts are transient; system errors are
    /// retryable below `Critical`; validation, transformation, exhaustion,
    /// and missing sessions are terminal.
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::DomainExecution { .. } | Self::Timeout { .. } => true,
            Self::System { severity, .. } => *severity < Severity::Critical,
            Self::Validation(_)
            | Self::Transformation(_)
            | Self::RetryExhausted { .. }
            | Self::SessionNotFound(_) => false,
        }
    }

    /// Convenience constructor for domain execution failures
    #[inline]
    pub fn domain(domain: Domain, message: impl Into<String>) -> Self {
        Self::DomainExecution {
            domain,
            message: message.into(),
        }
    }

    /// Convenience constructor for system errors
    #[inline]
    pub fn system(severity: Severity, message: impl Into<String>) -> Self {
        Self::System {
            severity,
            message: message.into(),
        }
    }
}
