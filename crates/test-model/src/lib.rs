//! A local scripted engine for testing purpose.

mod preset;

use std::collections::VecDeque;
use std::error::Error as StdError;
use std::fmt::{self, Display, Formatter};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use reagent_model::{
    EngineErrorKind, EngineRequest, EngineResponse, LlmEngine, LlmEngineError,
    TokenUsage,
};
use tokio::time::sleep;

pub use preset::*;

#[derive(Debug)]
pub struct Error {
    message: &'static str,
    kind: EngineErrorKind,
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.message)
    }
}

impl StdError for Error {}

impl LlmEngineError for Error {
    #[inline]
    fn kind(&self) -> EngineErrorKind {
        self.kind
    }
}

#[derive(Default)]
struct Script {
    turns: VecDeque<PresetTurn>,
    requests: Vec<EngineRequest>,
    calls: u64,
}

/// A local scripted engine for testing purpose.
///
/// Every call pops the next preset turn from the script, in order. If the
/// script is exhausted, an error is returned. Clones share the same script,
/// so a test can keep a handle to inspect the recorded requests after the
/// engine has been moved into an agent.
///
/// # Note
///
/// This type is not optimized for production use, every request is copied
/// into the record. You should only use it for testing.
#[derive(Clone, Default)]
pub struct TestEngine {
    script: Arc<Mutex<Script>>,
    delay: Option<Duration>,
}

impl TestEngine {
    /// Appends a turn to the script.
    #[inline]
    pub fn add_turn(&self, turn: PresetTurn) {
        self.lock().turns.push_back(turn);
    }

    /// Sets a delay before every response.
    #[inline]
    pub fn set_delay(&mut self, duration: Duration) {
        self.delay = Some(duration);
    }

    /// Returns the requests received so far.
    #[inline]
    pub fn requests(&self) -> Vec<EngineRequest> {
        self.lock().requests.clone()
    }

    /// Returns the number of turns not consumed yet.
    #[inline]
    pub fn remaining_turns(&self) -> usize {
        self.lock().turns.len()
    }

    fn lock(&self) -> MutexGuard<'_, Script> {
        // A poisoned script only means another test thread panicked.
        self.script.lock().unwrap_or_else(|err| err.into_inner())
    }
}

impl LlmEngine for TestEngine {
    type Error = crate::Error;

    fn call(
        &self,
        req: &EngineRequest,
    ) -> impl Future<Output = Result<EngineResponse, Self::Error>> + Send + 'static
    {
        let result = {
            let mut script = self.lock();
            script.requests.push(req.clone());
            script.calls += 1;
            let id = format!("resp_{}", script.calls);
            match script.turns.pop_front() {
                Some(PresetTurn::Output(output)) => Ok(EngineResponse {
                    id: Some(id),
                    output: Some(output),
                    usage: TokenUsage {
                        prompt_tokens: 10,
                        completion_tokens: 5,
                        total_tokens: 15,
                        reasoning_tokens: 2,
                    },
                }),
                Some(PresetTurn::Missing) => Ok(EngineResponse {
                    id: Some(id),
                    ..Default::default()
                }),
                Some(PresetTurn::Failure(failure)) => Err(Error {
                    message: "preset failure",
                    kind: failure.into(),
                }),
                None => Err(Error {
                    message: "no enough turns",
                    kind: EngineErrorKind::Other,
                }),
            }
        };
        let delay = self.delay;
        async move {
            if let Some(delay) = delay {
                sleep(delay).await;
            }
            result
        }
    }
}

impl From<PresetFailure> for EngineErrorKind {
    fn from(failure: PresetFailure) -> Self {
        match failure {
            PresetFailure::Moderated => EngineErrorKind::Moderated,
            PresetFailure::RateLimitExceeded => {
                EngineErrorKind::RateLimitExceeded
            }
            PresetFailure::PromptTooLong => EngineErrorKind::PromptTooLong,
            PresetFailure::Other => EngineErrorKind::Other,
        }
    }
}

#[cfg(test)]
mod tests {
    use reagent_model::{ModelMessage, ToolChoice};
    use serde_json::json;

    use super::*;

    fn request(text: &str) -> EngineRequest {
        EngineRequest {
            messages: vec![ModelMessage::user(text)],
            tools: vec![],
            stop_sequences: vec![],
            tool_choice: ToolChoice::Required,
            previous_response_id: None,
        }
    }

    #[tokio::test]
    async fn test_scripted_turns() {
        let engine = TestEngine::default();
        engine.add_turn(PresetTurn::chat_tool_call(
            "a",
            "send",
            json!({ "x": 1 }),
            "ok",
        ));
        engine.add_turn(PresetTurn::Missing);
        engine.add_turn(PresetTurn::Failure(PresetFailure::RateLimitExceeded));

        let resp = engine.call(&request("Hi")).await.unwrap();
        assert_eq!(resp.id.as_deref(), Some("resp_1"));
        let output = resp.output.unwrap();
        assert_eq!(output["tool_calls"][0]["function"]["name"], "send");

        let resp = engine.call(&request("Again")).await.unwrap();
        assert!(resp.output.is_none());

        let err = engine.call(&request("Once more")).await.unwrap_err();
        assert_eq!(err.kind(), EngineErrorKind::RateLimitExceeded);

        let err = engine.call(&request("Exhausted")).await.unwrap_err();
        assert_eq!(err.kind(), EngineErrorKind::Other);

        let requests = engine.requests();
        assert_eq!(requests.len(), 4);
        assert_eq!(requests[1].messages, [ModelMessage::user("Again")]);
        assert_eq!(engine.remaining_turns(), 0);
    }
}
