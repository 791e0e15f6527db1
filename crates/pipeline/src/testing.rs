//! Scripted doubles for pipeline tests.

use crate::context::ContextSource;
use finstep_core::{AppError, AppResult};
use finstep_llm::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
use std::collections::VecDeque;
use std::sync::Mutex;

/// LLM client that replays canned outcomes and records every request.
pub struct ScriptedClient {
    responses: Mutex<VecDeque<Result<String, String>>>,
    calls: Mutex<Vec<LlmRequest>>,
}

impl ScriptedClient {
    /// Queue outcomes in call order. `Err` entries become `AppError::Llm`.
    pub fn new(responses: Vec<Result<&str, &str>>) -> Self {
        Self {
            responses: Mutex::new(
                responses
                    .into_iter()
                    .map(|r| r.map(str::to_string).map_err(str::to_string))
                    .collect(),
            ),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Requests received so far, in order.
    pub fn calls(&self) -> Vec<LlmRequest> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl LlmClient for ScriptedClient {
    fn provider_name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        self.calls.lock().unwrap().push(request.clone());

        match self.responses.lock().unwrap().pop_front() {
            Some(Ok(content)) => Ok(LlmResponse {
                content,
                model: request.model.clone(),
                usage: LlmUsage::new(10, 20),
                done: true,
            }),
            Some(Err(message)) => Err(AppError::Llm(message)),
            None => Err(AppError::Llm("Scripted client ran out of responses".to_string())),
        }
    }
}

/// Context source that returns a fixed block and counts lookups.
pub struct StaticContext {
    context: String,
    lookups: Mutex<u32>,
}

impl StaticContext {
    pub fn new(context: impl Into<String>) -> Self {
        Self {
            context: context.into(),
            lookups: Mutex::new(0),
        }
    }

    pub fn lookups(&self) -> u32 {
        *self.lookups.lock().unwrap()
    }
}

#[async_trait::async_trait]
impl ContextSource for StaticContext {
    async fn context_for(&self, _query: &str) -> AppResult<String> {
        *self.lookups.lock().unwrap() += 1;
        Ok(self.context.clone())
    }
}
