//! Score endpoint handler.

use crate::api::{ApiError, AppState, ScoreRequest};
use crate::evaluation::{EvaluationRequest, EvaluationResult, ImagePayload, RequestError};
use crate::logging::generate_request_id;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, info_span, warn, Instrument};

/// POST /api/score - Evaluate one handwritten character.
pub async fn handle(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ScoreRequest>, JsonRejection>,
) -> Result<Json<EvaluationResult>, ApiError> {
    let result = evaluate(state, payload).await;

    let status = match &result {
        Ok(_) => StatusCode::OK,
        Err(e) => e.status_code(),
    };
    metrics::counter!("scribe_requests_total", "status" => status.as_str().to_string())
        .increment(1);

    result.map(Json)
}

/// OPTIONS /api/score - CORS preflight without an Origin header.
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}

async fn evaluate(
    state: Arc<AppState>,
    payload: Result<Json<ScoreRequest>, JsonRejection>,
) -> Result<EvaluationResult, ApiError> {
    let Json(body) = payload.map_err(|e| ApiError::bad_request(&e.body_text()))?;
    let request = validate(&state, body)?;

    let request_id = generate_request_id();
    let span = info_span!("score", request_id = %request_id, target = %request.target());

    // Detached so a client disconnect does not abort a rotation in progress.
    let dispatcher = Arc::clone(&state.dispatcher);
    let handle = tokio::spawn(
        async move {
            info!(
                mime_type = request.image().mime_type(),
                image_bytes = request.image().decoded_len(),
                "score request"
            );
            let start = Instant::now();
            let result = dispatcher.dispatch(&request).await;
            metrics::histogram!("scribe_dispatch_duration_seconds")
                .record(start.elapsed().as_secs_f64());
            if let Err(failure) = &result {
                warn!(
                    kind = %failure.kind,
                    attempts = failure.attempt_count(),
                    "score request failed"
                );
            }
            result
        }
        .instrument(span),
    );

    let result = handle
        .await
        .map_err(|e| ApiError::internal(&format!("Evaluation task failed: {}", e)))?;
    Ok(result?)
}

fn validate(state: &AppState, body: ScoreRequest) -> Result<EvaluationRequest, RequestError> {
    let target = body
        .target
        .filter(|t| !t.trim().is_empty())
        .ok_or(RequestError::MissingField("target"))?;
    let image_data = body
        .image_data
        .filter(|d| !d.trim().is_empty())
        .ok_or(RequestError::MissingField("imageData"))?;

    let image = ImagePayload::parse(
        &image_data,
        body.mime_type.as_deref(),
        &state.config.upstream.default_mime_type,
        state.config.server.max_image_bytes,
    )?;

    EvaluationRequest::new(&target, image)
}
