use std::pin::Pin;
use std::sync::Arc;

use backoff::ExponentialBackoffBuilder;
use reagent_model::{
    EngineErrorKind, EngineRequest, EngineResponse, LlmEngine, LlmEngineError,
};
use tracing::Instrument;

use crate::config::RetryConfig;
use crate::error::Error;

type CallResult = Result<EngineResponse, Error>;
type BoxedCallFuture = Pin<Box<dyn Future<Output = CallResult> + Send>>;
type HandlerFn = Arc<dyn Fn(&EngineRequest) -> BoxedCallFuture + Send + Sync>;

/// A wrapper around an LLM engine that retries rate limited calls and
/// provides a type-erased interface for the other modules.
#[derive(Clone)]
pub struct ModelClient {
    handler_fn: HandlerFn,
    retry: RetryConfig,
}

impl ModelClient {
    /// Wraps an engine.
    #[inline]
    pub fn new<E: LlmEngine + 'static>(engine: E) -> Self {
        // We have to erase the type `E`, since `ModelClient` doesn't have a
        // generic parameter and we don't want it either.
        let handler_fn: HandlerFn = Arc::new(move |req| {
            let fut = engine.call(req);
            Box::pin(async move {
                fut.await.map_err(|err| {
                    let kind = err.kind();
                    error!("engine failed ({kind:?}): {err}");
                    Error::Engine {
                        kind,
                        message: err.to_string(),
                    }
                })
            })
        });
        Self {
            handler_fn,
            retry: RetryConfig::default(),
        }
    }

    /// Sets the backoff of rate limited calls.
    #[inline]
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Sends a request and returns the complete response.
    ///
    /// Rate limited calls are retried with an exponential backoff, any
    /// other engine error is returned immediately.
    pub async fn call(&self, req: &EngineRequest) -> CallResult {
        let policy = ExponentialBackoffBuilder::new()
            .with_initial_interval(self.retry.initial_interval())
            .with_max_interval(self.retry.max_interval())
            .with_max_elapsed_time(Some(self.retry.max_elapsed()))
            .build();
        let operation = || {
            let fut = (self.handler_fn)(req);
            async move {
                fut.await.map_err(|err| match err {
                    Error::Engine {
                        kind: EngineErrorKind::RateLimitExceeded,
                        ..
                    } => {
                        warn!("rate limited, backing off");
                        backoff::Error::transient(err)
                    }
                    err => backoff::Error::permanent(err),
                })
            }
        };
        trace!("got a request: {req:?}");
        backoff::future::retry(policy, operation)
            .instrument(trace_span!("model client call"))
            .await
    }
}

#[cfg(test)]
mod tests {
    use reagent_model::{ModelMessage, ToolChoice};
    use reagent_test_model::{PresetFailure, PresetTurn, TestEngine};
    use serde_json::json;

    use super::*;

    fn request() -> EngineRequest {
        EngineRequest {
            messages: vec![ModelMessage::user("Hi")],
            tools: vec![],
            stop_sequences: vec![],
            tool_choice: ToolChoice::Required,
            previous_response_id: None,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_rate_limits() {
        let engine = TestEngine::default();
        engine.add_turn(PresetTurn::Failure(PresetFailure::RateLimitExceeded));
        engine.add_turn(PresetTurn::Failure(PresetFailure::RateLimitExceeded));
        engine.add_turn(PresetTurn::Output(json!({ "content": "hi" })));

        let client = ModelClient::new(engine.clone());
        let resp = client.call(&request()).await.unwrap();
        assert_eq!(resp.output, Some(json!({ "content": "hi" })));
        assert_eq!(engine.requests().len(), 3);
    }

    #[tokio::test]
    async fn test_error_handling() {
        let engine = TestEngine::default();
        engine.add_turn(PresetTurn::Failure(PresetFailure::PromptTooLong));
        engine.add_turn(PresetTurn::Output(json!({ "content": "unused" })));

        let client = ModelClient::new(engine.clone());
        let err = client.call(&request()).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Engine {
                kind: EngineErrorKind::PromptTooLong,
                ..
            }
        ));
        assert_eq!(engine.remaining_turns(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_give_up_when_budget_spent() {
        let engine = TestEngine::default();
        for _ in 0..100 {
            engine.add_turn(PresetTurn::Failure(
                PresetFailure::RateLimitExceeded,
            ));
        }
        let retry = RetryConfig {
            initial_interval_ms: 10,
            max_interval_ms: 10,
            max_elapsed_ms: 0,
        };

        let client = ModelClient::new(engine.clone()).with_retry(retry);
        let err = client.call(&request()).await.unwrap_err();
        assert_eq!(err.kind(), Some(reagent_model::ErrorKind::Engine));
        assert!(engine.remaining_turns() > 0);
    }
}
