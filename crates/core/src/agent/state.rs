use reagent_model::{EngineRequest, EngineResponse, ErrorKind, ErrorLog, LogKind};

use super::Agent;
use crate::error::Error;

/// States of a model call that may return empty output.
///
/// `Calling` is the first attempt and `Retrying(n)` the `n`-th one. Every
/// attempt that yields nothing actionable either moves on to the next
/// attempt or, once the budget is spent, to `Exhausted`.
#[derive(Debug)]
enum CallState {
    Calling,
    Retrying(usize),
    Succeeded(EngineResponse),
    Exhausted(usize),
}

impl Agent {
    /// Calls the model until it returns a non-empty output.
    pub(super) async fn call_model(
        &mut self,
        request: &EngineRequest,
    ) -> Result<EngineResponse, Error> {
        let max_attempts = self.config.invalid_format_retries + 1;
        let mut state = CallState::Calling;
        loop {
            state = match state {
                CallState::Calling => {
                    self.attempt(request, 1, max_attempts).await?
                }
                CallState::Retrying(attempt) => {
                    self.attempt(request, attempt, max_attempts).await?
                }
                CallState::Succeeded(resp) => return Ok(resp),
                CallState::Exhausted(attempts) => {
                    let message = format!(
                        "The LLM returned an empty output {attempts} times \
                         in a row."
                    );
                    error!("{message}");
                    return Err(Error::InvalidAction(message));
                }
            };
        }
    }

    async fn attempt(
        &mut self,
        request: &EngineRequest,
        attempt: usize,
        max_attempts: usize,
    ) -> Result<CallState, Error> {
        let resp = self.model_client.call(request).await?;

        let dialect = self.config.dialect;
        let is_empty = resp
            .output
            .as_ref()
            .is_none_or(|output| dialect.is_empty_output(output));
        if !is_empty {
            return Ok(CallState::Succeeded(resp));
        }

        warn!("empty model output (attempt {attempt}/{max_attempts})");
        self.append(LogKind::Error(ErrorLog::new(
            ErrorKind::InvalidAction,
            format!(
                "The LLM returned an empty output \
                 (attempt {attempt}/{max_attempts})."
            ),
        )));
        Ok(if attempt < max_attempts {
            CallState::Retrying(attempt + 1)
        } else {
            CallState::Exhausted(attempt)
        })
    }
}
