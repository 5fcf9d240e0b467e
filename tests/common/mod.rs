//! Shared test utilities for Scribe integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response};
use scribe::api::{create_router, AppState};
use scribe::config::ScribeConfig;
use scribe::dispatch::FailoverDispatcher;
use scribe::evaluation::ImagePayload;
use scribe::pool::{Credential, CredentialPool};
use scribe::upstream::{CallOutcome, GeminiCaller, UpstreamCaller};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

/// "hello" in base64.
pub const IMAGE_B64: &str = "aGVsbG8=";

/// Path the Gemini caller posts to with the default model.
pub const GENERATE_PATH: &str = "/v1beta/models/gemini-1.5-flash:generateContent";

// =============================================================================
// Scripted upstream
// =============================================================================

/// Replays scripted outcomes in order and records the tokens it was given.
/// Once the script runs out every call is throttled.
pub struct ScriptedCaller {
    script: Mutex<VecDeque<CallOutcome>>,
    seen: Mutex<Vec<String>>,
}

impl ScriptedCaller {
    pub fn new(script: Vec<CallOutcome>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            seen: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.seen.lock().unwrap().len()
    }

    pub fn seen(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl UpstreamCaller for ScriptedCaller {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn call(
        &self,
        credential: &Credential,
        _instruction: &str,
        _image: &ImagePayload,
    ) -> CallOutcome {
        self.seen
            .lock()
            .unwrap()
            .push(credential.expose().to_string());
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| CallOutcome::Retryable("upstream throttled (429)".to_string()))
    }
}

pub fn reply(score: i64, feedback: &str) -> CallOutcome {
    CallOutcome::Success(format!(
        r#"{{"score": {}, "feedback": "{}"}}"#,
        score, feedback
    ))
}

pub fn throttled() -> CallOutcome {
    CallOutcome::Retryable("upstream throttled (429): quota exceeded".to_string())
}

// =============================================================================
// App Builders
// =============================================================================

pub fn make_pool(keys: &[&str]) -> Arc<CredentialPool> {
    Arc::new(CredentialPool::new(keys.iter().copied()).unwrap())
}

/// Router wired to an arbitrary caller.
pub fn make_app(keys: &[&str], caller: Arc<dyn UpstreamCaller>) -> axum::Router {
    make_app_with_config(ScribeConfig::default(), keys, caller)
}

pub fn make_app_with_config(
    config: ScribeConfig,
    keys: &[&str],
    caller: Arc<dyn UpstreamCaller>,
) -> axum::Router {
    let config = Arc::new(config);
    let dispatcher = FailoverDispatcher::new(make_pool(keys), caller, config.prompt.clone());
    let state = Arc::new(AppState::new(config, Arc::new(dispatcher)));
    create_router(state)
}

/// Router wired to the real Gemini caller pointed at a mock server.
pub fn make_app_with_mock(mock_server: &wiremock::MockServer, keys: &[&str]) -> axum::Router {
    let mut config = ScribeConfig::default();
    config.upstream.base_url = mock_server.uri();
    config.upstream.timeout_seconds = 5;

    let caller = Arc::new(GeminiCaller::from_config(&config.upstream).unwrap());
    make_app_with_config(config, keys, caller)
}

// =============================================================================
// Request helpers
// =============================================================================

pub fn score_request(body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/score")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn send(app: axum::Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Gemini `generateContent` envelope wrapping `text` as the model reply.
pub fn gemini_envelope(text: &str) -> serde_json::Value {
    serde_json::json!({
        "candidates": [{
            "content": {"parts": [{"text": text}], "role": "model"},
            "finishReason": "STOP"
        }],
        "usageMetadata": {"promptTokenCount": 300, "candidatesTokenCount": 20, "totalTokenCount": 320}
    })
}

/// Gemini error envelope.
pub fn gemini_error(code: u16, status: &str, message: &str) -> serde_json::Value {
    serde_json::json!({
        "error": {"code": code, "message": message, "status": status}
    })
}
