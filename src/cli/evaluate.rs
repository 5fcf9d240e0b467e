//! Evaluate command implementation

use crate::cli::{load_config, output, EvaluateArgs};
use crate::dispatch::FailoverDispatcher;
use crate::evaluation::{EvaluationRequest, ImageError, ImagePayload};
use crate::pool::CredentialPool;
use crate::upstream::{GeminiCaller, UpstreamCaller};
use std::sync::Arc;

/// Handle `scribe evaluate` command
///
/// Runs one dispatch against the configured upstream with the pool from
/// the environment, exactly as the server would for one request.
pub async fn handle_evaluate(args: &EvaluateArgs) -> Result<String, Box<dyn std::error::Error>> {
    let config = load_config(&args.config)?;
    let pool = Arc::new(CredentialPool::from_config(&config.credentials)?);
    let caller = Arc::new(GeminiCaller::from_config(&config.upstream)?);
    evaluate_with(args, &config, pool, caller).await
}

pub(crate) async fn evaluate_with(
    args: &EvaluateArgs,
    config: &crate::config::ScribeConfig,
    pool: Arc<CredentialPool>,
    caller: Arc<dyn UpstreamCaller>,
) -> Result<String, Box<dyn std::error::Error>> {
    let bytes = std::fs::read(&args.image)
        .map_err(|e| format!("Failed to read {}: {}", args.image.display(), e))?;
    if bytes.len() > config.server.max_image_bytes {
        return Err(ImageError::TooLarge {
            size: bytes.len(),
            limit: config.server.max_image_bytes,
        }
        .into());
    }

    let mime_type = args
        .mime_type
        .clone()
        .or_else(|| {
            mime_guess::from_path(&args.image)
                .first()
                .filter(|m| m.type_() == mime_guess::mime::IMAGE)
                .map(|m| m.essence_str().to_string())
        })
        .unwrap_or_else(|| config.upstream.default_mime_type.clone());

    let request = EvaluationRequest::new(&args.target, ImagePayload::from_bytes(&bytes, &mime_type))?;

    let dispatcher = FailoverDispatcher::new(pool, caller, config.prompt.clone())
        .with_reply_logging(config.logging.log_model_replies);
    let result = dispatcher.dispatch(&request).await?;

    if args.json {
        Ok(output::format_evaluation_json(&result))
    } else {
        Ok(output::format_evaluation(request.target(), &result))
    }
}
