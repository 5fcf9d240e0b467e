//! Credentials command handler

use crate::cli::{load_config, output, CredentialsArgs};
use crate::pool::{CredentialPool, PoolError};

/// Handle `scribe credentials` command
///
/// Shows how many credentials would be loaded and their labels. Tokens
/// are never printed.
pub fn handle_credentials(args: &CredentialsArgs) -> Result<String, Box<dyn std::error::Error>> {
    let config = load_config(&args.config)?;
    let (source, raw) = config
        .credentials
        .resolve()
        .ok_or(PoolError::EmptyPool)?;
    let pool = CredentialPool::from_delimited(&raw, &config.credentials.delimiter)?;

    if args.json {
        Ok(output::format_credentials_json(&pool.labels(), source))
    } else {
        Ok(output::format_credentials_table(&pool.labels(), source))
    }
}
