//! Error types for credential pool construction.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    /// No usable credential was configured.
    #[error("Credential pool is empty: no API keys configured")]
    EmptyPool,
}
