//! Upstream model abstraction.
//!
//! An [`UpstreamCaller`] performs exactly one evaluation call with one
//! credential and classifies the result into a [`CallOutcome`]. The
//! classification is the contract the failover dispatcher relies on:
//! only [`CallOutcome::Retryable`] justifies trying another credential.

use crate::evaluation::ImagePayload;
use crate::pool::Credential;
use async_trait::async_trait;
use std::fmt;

pub mod gemini;

pub use gemini::GeminiCaller;

/// Upstream error statuses that mean "this credential is throttled".
pub const THROTTLING_STATUSES: &[&str] = &["RESOURCE_EXHAUSTED"];

/// Why a call failed in a way another credential would not fix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FatalKind {
    /// Connection, DNS or timeout failure.
    Unreachable,
    /// Upstream answered with a non-throttling error status.
    Rejected { status: u16 },
    /// Upstream answered 2xx but the body is not a usable envelope.
    InvalidEnvelope,
}

impl FatalKind {
    /// Stable label for logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            FatalKind::Unreachable => "unreachable",
            FatalKind::Rejected { .. } => "rejected",
            FatalKind::InvalidEnvelope => "invalid_envelope",
        }
    }
}

impl fmt::Display for FatalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FatalKind::Rejected { status } => write!(f, "rejected ({})", status),
            other => f.write_str(other.as_str()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FatalFailure {
    pub kind: FatalKind,
    pub message: String,
}

/// Classified result of a single upstream call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallOutcome {
    /// Model reply text, not yet validated.
    Success(String),
    /// Rate or quota limit on this credential.
    Retryable(String),
    Fatal(FatalFailure),
}

impl CallOutcome {
    pub fn fatal(kind: FatalKind, message: impl Into<String>) -> Self {
        CallOutcome::Fatal(FatalFailure {
            kind,
            message: message.into(),
        })
    }

    /// Stable label for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            CallOutcome::Success(_) => "success",
            CallOutcome::Retryable(_) => "retryable",
            CallOutcome::Fatal(failure) => failure.kind.as_str(),
        }
    }
}

/// One outbound evaluation call.
///
/// Implementations must not retry internally and must not mutate shared
/// state; the dispatcher owns the retry policy.
#[async_trait]
pub trait UpstreamCaller: Send + Sync + 'static {
    /// Short backend name for logs (e.g., "gemini").
    fn name(&self) -> &str;

    async fn call(
        &self,
        credential: &Credential,
        instruction: &str,
        image: &ImagePayload,
    ) -> CallOutcome;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_labels() {
        assert_eq!(CallOutcome::Success("x".into()).label(), "success");
        assert_eq!(CallOutcome::Retryable("x".into()).label(), "retryable");
        assert_eq!(
            CallOutcome::fatal(FatalKind::Rejected { status: 401 }, "x").label(),
            "rejected"
        );
    }

    #[test]
    fn test_fatal_kind_display() {
        assert_eq!(FatalKind::Rejected { status: 400 }.to_string(), "rejected (400)");
        assert_eq!(FatalKind::Unreachable.to_string(), "unreachable");
        assert_eq!(FatalKind::InvalidEnvelope.to_string(), "invalid_envelope");
    }
}
