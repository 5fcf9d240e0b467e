//! Credential failover dispatcher.
//!
//! A dispatch tries at most `pool.size()` credentials, each drawn from the
//! shared rotation and never one already tried in the same dispatch.
//! Only throttling moves on to another credential; any other failure
//! stops the dispatch, because a different key would not change it.

pub mod error;

pub use error::{AttemptRecord, DispatchFailure, FailureKind};

use crate::config::PromptConfig;
use crate::evaluation::{EvaluationRequest, EvaluationResult};
use crate::extract::extract;
use crate::pool::{credential_label, CredentialPool};
use crate::upstream::{CallOutcome, UpstreamCaller};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct FailoverDispatcher {
    pool: Arc<CredentialPool>,
    caller: Arc<dyn UpstreamCaller>,
    prompt: PromptConfig,
    log_model_replies: bool,
}

impl FailoverDispatcher {
    pub fn new(
        pool: Arc<CredentialPool>,
        caller: Arc<dyn UpstreamCaller>,
        prompt: PromptConfig,
    ) -> Self {
        Self {
            pool,
            caller,
            prompt,
            log_model_replies: false,
        }
    }

    /// Log raw model replies at debug level.
    pub fn with_reply_logging(mut self, enabled: bool) -> Self {
        self.log_model_replies = enabled;
        self
    }

    pub fn pool(&self) -> &CredentialPool {
        &self.pool
    }

    /// Evaluate one request, rotating credentials on throttling.
    pub async fn dispatch(
        &self,
        request: &EvaluationRequest,
    ) -> Result<EvaluationResult, DispatchFailure> {
        let instruction = self.prompt.render(request.target());
        let mut tried = Vec::with_capacity(self.pool.size());
        let mut attempts = Vec::with_capacity(self.pool.size());

        while let Some((index, credential)) = self.pool.next_excluding(&tried) {
            tried.push(index);
            let attempt = tried.len();
            let label = credential_label(index);

            let outcome = self
                .caller
                .call(credential, &instruction, request.image())
                .await;

            metrics::counter!("scribe_upstream_calls_total",
                "outcome" => outcome.label()
            )
            .increment(1);

            let record = |reason: String| AttemptRecord {
                credential: label.clone(),
                outcome: outcome.label(),
                reason,
            };

            match &outcome {
                CallOutcome::Success(raw) => {
                    if self.log_model_replies {
                        debug!(attempt, credential = %label, reply = %raw, "model reply");
                    }
                    match extract(raw) {
                        Ok(result) => {
                            info!(
                                attempt,
                                credential = %label,
                                backend = self.caller.name(),
                                score = result.score,
                                "evaluation succeeded"
                            );
                            return Ok(result);
                        }
                        Err(e) => {
                            warn!(attempt, credential = %label, error = %e, "model reply unusable");
                            attempts.push(record(e.to_string()));
                            return Err(DispatchFailure::new(FailureKind::Malformed, attempts));
                        }
                    }
                }
                CallOutcome::Retryable(reason) => {
                    warn!(
                        attempt,
                        credential = %label,
                        reason = %reason,
                        "credential throttled, rotating"
                    );
                    attempts.push(record(reason.clone()));
                }
                CallOutcome::Fatal(failure) => {
                    warn!(
                        attempt,
                        credential = %label,
                        kind = %failure.kind,
                        reason = %failure.message,
                        "upstream call failed, not rotating"
                    );
                    attempts.push(record(failure.message.clone()));
                    return Err(DispatchFailure::new(
                        FailureKind::Fatal(failure.kind),
                        attempts,
                    ));
                }
            }
        }

        warn!(attempts = attempts.len(), "credential pool exhausted");
        Err(DispatchFailure::new(FailureKind::Exhausted, attempts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::ImagePayload;
    use crate::pool::Credential;
    use crate::upstream::FatalKind;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays scripted outcomes and records which tokens were used.
    struct ScriptedCaller {
        script: Mutex<VecDeque<CallOutcome>>,
        seen: Mutex<Vec<String>>,
    }

    impl ScriptedCaller {
        fn new(script: Vec<CallOutcome>) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(script.into()),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> usize {
            self.seen.lock().unwrap().len()
        }

        fn seen(&self) -> Vec<String> {
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
                .unwrap_or_else(|| CallOutcome::Retryable("script exhausted".to_string()))
        }
    }

    fn dispatcher(keys: &[&str], caller: Arc<ScriptedCaller>) -> FailoverDispatcher {
        let pool = Arc::new(CredentialPool::new(keys.iter().copied()).unwrap());
        FailoverDispatcher::new(pool, caller, PromptConfig::default())
    }

    fn request() -> EvaluationRequest {
        EvaluationRequest::new("あ", ImagePayload::from_bytes(b"img", "image/png")).unwrap()
    }

    fn success(score: i32) -> CallOutcome {
        CallOutcome::Success(format!(r#"{{"score": {}, "feedback": "ok"}}"#, score))
    }

    fn throttled() -> CallOutcome {
        CallOutcome::Retryable("upstream throttled (429): quota".to_string())
    }

    #[tokio::test]
    async fn test_success_first_makes_one_call() {
        let caller = ScriptedCaller::new(vec![success(80)]);
        let dispatcher = dispatcher(&["a", "b", "c", "d"], caller.clone());

        let result = dispatcher.dispatch(&request()).await.unwrap();

        assert_eq!(result.score, 80);
        assert_eq!(caller.calls(), 1);
    }

    #[tokio::test]
    async fn test_all_retryable_makes_pool_size_calls() {
        let caller = ScriptedCaller::new(vec![throttled(), throttled(), throttled()]);
        let dispatcher = dispatcher(&["a", "b", "c"], caller.clone());

        let failure = dispatcher.dispatch(&request()).await.unwrap_err();

        assert_eq!(failure.kind, FailureKind::Exhausted);
        assert_eq!(caller.calls(), 3);
        assert_eq!(failure.attempt_count(), 3);
        assert_eq!(caller.seen(), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_fatal_first_makes_one_call() {
        let caller = ScriptedCaller::new(vec![
            CallOutcome::fatal(FatalKind::Rejected { status: 400 }, "bad request body"),
            success(90),
        ]);
        let dispatcher = dispatcher(&["a", "b", "c"], caller.clone());

        let failure = dispatcher.dispatch(&request()).await.unwrap_err();

        assert_eq!(
            failure.kind,
            FailureKind::Fatal(FatalKind::Rejected { status: 400 })
        );
        assert_eq!(failure.last_reason, "bad request body");
        assert_eq!(caller.calls(), 1);
    }

    #[tokio::test]
    async fn test_retryable_then_success_rotates() {
        let caller = ScriptedCaller::new(vec![throttled(), success(55)]);
        let dispatcher = dispatcher(&["a", "b", "c"], caller.clone());

        let result = dispatcher.dispatch(&request()).await.unwrap();

        assert_eq!(result.score, 55);
        assert_eq!(caller.seen(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_malformed_reply_stops_without_rotation() {
        let caller = ScriptedCaller::new(vec![
            CallOutcome::Success("I cannot grade this image.".to_string()),
            success(70),
        ]);
        let dispatcher = dispatcher(&["a", "b"], caller.clone());

        let failure = dispatcher.dispatch(&request()).await.unwrap_err();

        assert_eq!(failure.kind, FailureKind::Malformed);
        assert_eq!(caller.calls(), 1);
    }

    #[tokio::test]
    async fn test_fatal_after_retryable_reports_fatal() {
        let caller = ScriptedCaller::new(vec![
            throttled(),
            CallOutcome::fatal(FatalKind::Unreachable, "connection refused"),
        ]);
        let dispatcher = dispatcher(&["a", "b", "c"], caller.clone());

        let failure = dispatcher.dispatch(&request()).await.unwrap_err();

        assert_eq!(failure.kind, FailureKind::Fatal(FatalKind::Unreachable));
        assert_eq!(failure.attempt_count(), 2);
        assert_eq!(caller.calls(), 2);
    }

    #[tokio::test]
    async fn test_rotation_continues_across_dispatches() {
        let caller = ScriptedCaller::new(vec![success(1), success(2), success(3)]);
        let dispatcher = dispatcher(&["a", "b"], caller.clone());

        for _ in 0..3 {
            dispatcher.dispatch(&request()).await.unwrap();
        }

        assert_eq!(caller.seen(), vec!["a", "b", "a"]);
    }

    #[tokio::test]
    async fn test_attempt_records_never_contain_tokens() {
        let caller = ScriptedCaller::new(vec![throttled(), throttled()]);
        let dispatcher = dispatcher(&["secret-one", "secret-two"], caller);

        let failure = dispatcher.dispatch(&request()).await.unwrap_err();

        let rendered = format!("{:?} {}", failure, failure);
        assert!(!rendered.contains("secret"));
        assert_eq!(failure.attempts[0].credential, "key#0");
        assert_eq!(failure.attempts[1].credential, "key#1");
    }

    #[tokio::test]
    async fn test_result_is_clamped() {
        let caller = ScriptedCaller::new(vec![success(140)]);
        let dispatcher = dispatcher(&["a"], caller);

        let result = dispatcher.dispatch(&request()).await.unwrap();
        assert_eq!(result.score, 100);
    }
}
