//! Google Generative Language caller.

use super::{CallOutcome, FatalKind, UpstreamCaller, THROTTLING_STATUSES};
use crate::config::UpstreamConfig;
use crate::evaluation::ImagePayload;
use crate::pool::Credential;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Calls `POST /v1beta/models/{model}:generateContent` with one text part
/// and one inline image part.
///
/// The credential travels in the `x-goog-api-key` header so it never ends
/// up in URLs or transport error messages.
pub struct GeminiCaller {
    /// Base URL (e.g., "https://generativelanguage.googleapis.com")
    base_url: String,
    model: String,
    temperature: f32,
    json_mode: bool,
    timeout: Duration,
    client: Client,
}

impl GeminiCaller {
    pub fn new(config: &UpstreamConfig, client: Client) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            temperature: config.temperature,
            json_mode: config.json_mode,
            timeout: Duration::from_secs(config.timeout_seconds),
            client,
        }
    }

    /// Build a caller with its own HTTP client.
    pub fn from_config(config: &UpstreamConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .pool_max_idle_per_host(10)
            .build()?;
        Ok(Self::new(config, client))
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }

    fn build_request<'a>(&self, instruction: &'a str, image: &'a ImagePayload) -> GeminiRequest<'a> {
        GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![
                    GeminiPart::Text { text: instruction },
                    GeminiPart::InlineData {
                        inline_data: GeminiInlineData {
                            mime_type: image.mime_type(),
                            data: image.base64(),
                        },
                    },
                ],
            }],
            generation_config: GeminiGenerationConfig {
                temperature: self.temperature,
                response_mime_type: self.json_mode.then_some("application/json"),
            },
        }
    }
}

/// Map a non-2xx reply to an outcome using the status code and the
/// `error.status` field of the upstream error envelope.
pub fn classify_error(status: StatusCode, body: &str) -> CallOutcome {
    let envelope = serde_json::from_str::<GeminiErrorEnvelope>(body)
        .ok()
        .map(|e| e.error);
    let upstream_status = envelope.as_ref().and_then(|e| e.status.as_deref());
    let detail = envelope
        .as_ref()
        .and_then(|e| e.message.as_deref())
        .or(upstream_status)
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown error"));

    let throttled = status == StatusCode::TOO_MANY_REQUESTS
        || upstream_status.is_some_and(|s| THROTTLING_STATUSES.contains(&s));

    if throttled {
        CallOutcome::Retryable(format!("upstream throttled ({}): {}", status.as_u16(), detail))
    } else {
        CallOutcome::fatal(
            FatalKind::Rejected {
                status: status.as_u16(),
            },
            format!("upstream returned {}: {}", status.as_u16(), detail),
        )
    }
}

/// Map a 2xx body to an outcome: the concatenated text of the first candidate.
pub fn classify_success(body: &str) -> CallOutcome {
    let response: GeminiResponse = match serde_json::from_str(body) {
        Ok(response) => response,
        Err(e) => {
            return CallOutcome::fatal(
                FatalKind::InvalidEnvelope,
                format!("failed to parse upstream response: {}", e),
            )
        }
    };

    let Some(candidate) = response.candidates.first() else {
        let reason = response
            .prompt_feedback
            .and_then(|f| f.block_reason)
            .unwrap_or_else(|| "no candidates".to_string());
        return CallOutcome::fatal(
            FatalKind::InvalidEnvelope,
            format!("upstream returned no candidate: {}", reason),
        );
    };

    let text: String = candidate
        .content
        .as_ref()
        .map(|c| c.parts.iter().filter_map(|p| p.text.as_deref()).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        return CallOutcome::fatal(
            FatalKind::InvalidEnvelope,
            format!(
                "upstream candidate has no text (finish reason: {})",
                candidate.finish_reason.as_deref().unwrap_or("unknown")
            ),
        );
    }

    CallOutcome::Success(text)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest<'a> {
    contents: Vec<GeminiContent<'a>>,
    generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Serialize)]
struct GeminiContent<'a> {
    parts: Vec<GeminiPart<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum GeminiPart<'a> {
    Text {
        text: &'a str,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: GeminiInlineData<'a>,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiInlineData<'a> {
    mime_type: &'a str,
    data: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'static str>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    prompt_feedback: Option<GeminiPromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: Option<GeminiResponseContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponseContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorEnvelope {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    message: Option<String>,
    status: Option<String>,
}

#[async_trait]
impl UpstreamCaller for GeminiCaller {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn call(
        &self,
        credential: &Credential,
        instruction: &str,
        image: &ImagePayload,
    ) -> CallOutcome {
        let body = self.build_request(instruction, image);
        let start = Instant::now();

        let response = match self
            .client
            .post(self.endpoint())
            .header(API_KEY_HEADER, credential.expose())
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) if e.is_timeout() => {
                return CallOutcome::fatal(
                    FatalKind::Unreachable,
                    format!("request timeout after {}ms", self.timeout.as_millis()),
                )
            }
            Err(e) => {
                return CallOutcome::fatal(
                    FatalKind::Unreachable,
                    format!("upstream connection failed: {}", e.without_url()),
                )
            }
        };

        let status = response.status();
        tracing::debug!(
            backend = "gemini",
            model = %self.model,
            status = status.as_u16(),
            latency_ms = start.elapsed().as_millis() as u64,
            "upstream responded"
        );

        let text = match response.text().await {
            Ok(text) => text,
            Err(e) => {
                return CallOutcome::fatal(
                    FatalKind::Unreachable,
                    format!("failed to read upstream body: {}", e.without_url()),
                )
            }
        };

        if status.is_success() {
            classify_success(&text)
        } else {
            classify_error(status, &text)
        }
    }
}
