//! Aggregate failure of one dispatch.

use crate::upstream::FatalKind;
use std::fmt;
use thiserror::Error;

/// How a dispatch ended without a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Every credential in the pool was throttled.
    Exhausted,
    /// A failure no other credential would fix; rotation stopped.
    Fatal(FatalKind),
    /// The model replied, but not with a usable score and feedback.
    Malformed,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Exhausted => f.write_str("all credentials rate limited"),
            FailureKind::Fatal(kind) => write!(f, "upstream failure: {}", kind),
            FailureKind::Malformed => f.write_str("unusable model reply"),
        }
    }
}

/// One credential attempt, as recorded for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptRecord {
    /// Slot label, e.g. `key#2`. Never the token.
    pub credential: String,
    pub outcome: &'static str,
    pub reason: String,
}

#[derive(Error, Debug, Clone)]
#[error("{kind}: {last_reason}")]
pub struct DispatchFailure {
    pub kind: FailureKind,
    pub attempts: Vec<AttemptRecord>,
    pub last_reason: String,
}

impl DispatchFailure {
    pub(crate) fn new(kind: FailureKind, attempts: Vec<AttemptRecord>) -> Self {
        let last_reason = attempts
            .last()
            .map(|a| a.reason.clone())
            .unwrap_or_else(|| "no attempt was made".to_string());
        Self {
            kind,
            attempts,
            last_reason,
        }
    }

    /// Number of outbound calls made before giving up.
    pub fn attempt_count(&self) -> usize {
        self.attempts.len()
    }
}
