//! Credential pool with process-wide round-robin rotation.
//!
//! The pool is loaded once at startup and shared by every request through
//! the application state. Draws advance a single lock-free cursor, so
//! concurrent requests interleave their draws and rotation is only
//! best-effort fair across requests.

pub mod error;

pub use error::PoolError;

use crate::config::CredentialsConfig;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// An opaque upstream API credential.
///
/// `Debug` and `Display` are redacted; only [`Credential::expose`] yields
/// the token.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<redacted>")
    }
}

/// Diagnostic name for a pool slot, safe to log.
pub fn credential_label(index: usize) -> String {
    format!("key#{}", index)
}

/// Ordered, immutable set of interchangeable credentials plus a rotation cursor.
#[derive(Debug)]
pub struct CredentialPool {
    credentials: Vec<Credential>,
    cursor: AtomicU64,
}

impl CredentialPool {
    /// Build a pool from raw tokens. Entries are trimmed and blank entries dropped.
    pub fn new<I, S>(tokens: I) -> Result<Self, PoolError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let credentials: Vec<Credential> = tokens
            .into_iter()
            .map(|t| t.as_ref().trim().to_string())
            .filter(|t| !t.is_empty())
            .map(Credential)
            .collect();

        if credentials.is_empty() {
            return Err(PoolError::EmptyPool);
        }

        Ok(Self {
            credentials,
            cursor: AtomicU64::new(0),
        })
    }

    /// Build a pool from a delimiter-separated configuration value.
    pub fn from_delimited(raw: &str, delimiter: &str) -> Result<Self, PoolError> {
        Self::new(raw.split(delimiter))
    }

    /// Load the pool from the environment variables named in `[credentials]`.
    pub fn from_config(config: &CredentialsConfig) -> Result<Self, PoolError> {
        let raw = config.read_env().ok_or(PoolError::EmptyPool)?;
        Self::from_delimited(&raw, &config.delimiter)
    }

    pub fn size(&self) -> usize {
        self.credentials.len()
    }

    /// Labels for every slot in insertion order.
    pub fn labels(&self) -> Vec<String> {
        (0..self.size()).map(credential_label).collect()
    }

    /// Return the credential at the cursor and advance the cursor by one.
    pub fn next(&self) -> (usize, &Credential) {
        let index = self.advance();
        (index, &self.credentials[index])
    }

    /// Like [`next`](Self::next), but never hands out a slot listed in `tried`.
    ///
    /// When the drawn slot was already tried, walks forward to the first
    /// untried one. Returns `None` once every slot has been tried.
    pub fn next_excluding(&self, tried: &[usize]) -> Option<(usize, &Credential)> {
        if tried.len() >= self.size() {
            return None;
        }

        let start = self.advance();
        (0..self.size())
            .map(|offset| (start + offset) % self.size())
            .find(|index| !tried.contains(index))
            .map(|index| (index, &self.credentials[index]))
    }

    fn advance(&self) -> usize {
        let counter = self.cursor.fetch_add(1, Ordering::Relaxed);
        (counter % self.credentials.len() as u64) as usize
    }
}
