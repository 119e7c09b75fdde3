// src/test_utils/mod.rs
//! Scripted doubles for the gateway and executor, used by loop tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::core_types::InlineImage;
use crate::errors::PlanBotError;
use crate::executors::{CodeExecutor, ExecutionResult};
use crate::llm::CompletionGateway;

/// Completion gateway that pops queued responses and records every prompt it
/// was asked to complete.
pub struct MockGateway {
    responses: Mutex<VecDeque<Result<String, PlanBotError>>>,
    prompts: Mutex<Vec<String>>,
}

impl MockGateway {
    pub fn new(responses: Vec<Result<String, PlanBotError>>) -> Self {
        Self {
            responses: Mutex::new(VecDeque::from(responses)),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionGateway for MockGateway {
    async fn complete(
        &self,
        prompt: &str,
        _image: Option<&InlineImage>,
    ) -> Result<String, PlanBotError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(PlanBotError::LLMError(
                    "mock gateway ran out of responses".to_string(),
                ))
            })
    }
}

/// Executor that pops queued results and records every script it was handed.
pub struct MockExecutor {
    results: Mutex<VecDeque<ExecutionResult>>,
    executed: Mutex<Vec<String>>,
}

impl MockExecutor {
    pub fn new(results: Vec<ExecutionResult>) -> Self {
        Self {
            results: Mutex::new(VecDeque::from(results)),
            executed: Mutex::new(Vec::new()),
        }
    }

    pub fn executed(&self) -> Vec<String> {
        self.executed.lock().unwrap().clone()
    }
}

#[async_trait]
impl CodeExecutor for MockExecutor {
    async fn execute(&self, source: &str) -> ExecutionResult {
        self.executed.lock().unwrap().push(source.to_string());
        self.results.lock().unwrap().pop_front().unwrap_or_else(|| {
            ExecutionResult::infrastructure_failure("mock executor ran out of results")
        })
    }
}
