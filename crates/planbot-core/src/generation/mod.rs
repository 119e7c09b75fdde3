//! Retry-and-validate code generation loop.
//!
//! Drives the completion gateway to produce a drafting script, statically
//! validates it, executes it in the sandbox, and inspects the result for a
//! qualifying artifact. Every failure mode collapses into one mechanism: the
//! concrete failure text becomes the next prompt's error context. Attempts
//! are strictly sequential because each retry prompt depends on the previous
//! attempt's failure.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::errors::PlanBotError;
use crate::executors::{CodeExecutor, ExecutionResult};
use crate::llm::CompletionGateway;

pub mod parser;
pub mod prompt;
pub mod validation;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Upper bound on generate-validate-execute cycles per invocation.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: usize,
    /// Extension an artifact must carry for the run to qualify, e.g. `.dxf`.
    #[serde(default = "default_target_extension")]
    pub target_extension: String,
}

fn default_max_attempts() -> usize {
    3
}

fn default_target_extension() -> String {
    ".dxf".to_string()
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            target_extension: default_target_extension(),
        }
    }
}

/// Outcome of a successful generation run: the qualifying result and how many
/// attempts it took, so callers can report retry cost.
#[derive(Debug, Clone)]
pub struct Generation {
    pub result: ExecutionResult,
    pub attempts: usize,
}

pub struct FloorPlanGenerator {
    gateway: Arc<dyn CompletionGateway>,
    executor: Arc<dyn CodeExecutor>,
    config: GeneratorConfig,
}

impl FloorPlanGenerator {
    pub fn new(
        gateway: Arc<dyn CompletionGateway>,
        executor: Arc<dyn CodeExecutor>,
        config: GeneratorConfig,
    ) -> Self {
        Self {
            gateway,
            executor,
            config,
        }
    }

    /// Generate a drawing file for `context`, retrying with error feedback up
    /// to the configured attempt limit.
    ///
    /// Gateway failures are not retried here: a broken provider gives the
    /// loop nothing to correct against, so the error surfaces to the caller.
    pub async fn generate(&self, context: &str) -> Result<Generation, PlanBotError> {
        let mut last_error: Option<String> = None;

        for attempt in 0..self.config.max_attempts {
            log::info!(
                "floor plan generation attempt {}/{}",
                attempt + 1,
                self.config.max_attempts
            );

            let prompt = match &last_error {
                None => prompt::initial_prompt(context),
                Some(error) => prompt::retry_prompt(context, error),
            };

            let response = self.gateway.complete(&prompt, None).await?;

            let code = match parser::extract_python_block(&response) {
                Some(code) => code,
                None => {
                    let reason = "no code block found in the model response".to_string();
                    log::warn!("attempt {} failed: {}", attempt + 1, reason);
                    last_error = Some(reason);
                    continue;
                }
            };
            log::debug!("attempt {} generated code:\n{}", attempt + 1, code);

            if let Err(missing) = validation::validate_script(&code) {
                let reason = format!(
                    "Generated code is missing required components: {}",
                    missing.join(", ")
                );
                log::warn!("attempt {} failed: {}", attempt + 1, reason);
                last_error = Some(reason);
                continue;
            }

            let result = self.executor.execute(&code).await;

            if result.succeeded && result.has_artifact_with_extension(&self.config.target_extension)
            {
                log::info!(
                    "qualifying {} artifact produced on attempt {}",
                    self.config.target_extension,
                    attempt + 1
                );
                return Ok(Generation {
                    result,
                    attempts: attempt + 1,
                });
            }

            let reason = if result.succeeded {
                format!(
                    "Code executed successfully but no {} file was generated. Ensure the code saves to the OUTPUT_DIR directory.",
                    self.config.target_extension
                )
            } else {
                result
                    .failure_reason
                    .clone()
                    .unwrap_or_else(|| "script execution failed".to_string())
            };
            log::warn!("attempt {} failed: {}", attempt + 1, reason);
            last_error = Some(reason);
        }

        Err(PlanBotError::GenerationExhausted {
            attempts: self.config.max_attempts,
            last_error: last_error.unwrap_or_else(|| "no attempts were made".to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executors::Artifact;
    use crate::test_utils::{MockExecutor, MockGateway};

    const VALID_SCRIPT: &str = r#"import ezdxf
import os

output_dir = os.environ.get('OUTPUT_DIR')
if not output_dir:
    raise ValueError('OUTPUT_DIR environment variable is required')

doc = ezdxf.new()
msp = doc.modelspace()
doc.saveas(os.path.join(output_dir, 'floorplan.dxf'))
"#;

    fn fenced(code: &str) -> String {
        format!("Here you go:\n```python\n{}\n```", code)
    }

    fn dxf_artifact(name: &str) -> Artifact {
        Artifact {
            file_name: name.to_string(),
            extension: ".dxf".to_string(),
            size_bytes: 4,
            content_base64: "cGxhbg==".to_string(),
            is_image: false,
            mime_type: "application/octet-stream".to_string(),
        }
    }

    fn success_with(artifacts: Vec<Artifact>) -> ExecutionResult {
        ExecutionResult {
            succeeded: true,
            stdout: String::new(),
            stderr: String::new(),
            artifacts,
            failure_reason: None,
        }
    }

    fn failure(reason: &str) -> ExecutionResult {
        ExecutionResult {
            succeeded: false,
            stdout: String::new(),
            stderr: reason.to_string(),
            artifacts: Vec::new(),
            failure_reason: Some(reason.to_string()),
        }
    }

    fn generator(
        gateway: Arc<MockGateway>,
        executor: Arc<MockExecutor>,
    ) -> FloorPlanGenerator {
        FloorPlanGenerator::new(gateway, executor, GeneratorConfig::default())
    }

    #[tokio::test]
    async fn test_first_attempt_success() {
        let gateway = Arc::new(MockGateway::new(vec![Ok(fenced(VALID_SCRIPT))]));
        let executor = Arc::new(MockExecutor::new(vec![success_with(vec![dxf_artifact(
            "floorplan.dxf",
        )])]));

        let generation = generator(gateway.clone(), executor)
            .generate("studio apartment garage conversion")
            .await
            .unwrap();

        assert_eq!(generation.attempts, 1);
        assert_eq!(generation.result.artifacts[0].file_name, "floorplan.dxf");
        assert_eq!(gateway.prompts().len(), 1);
        assert!(gateway.prompts()[0].contains("studio apartment garage conversion"));
    }

    #[tokio::test]
    async fn test_validation_failure_then_success() {
        // Attempt 1 omits the environment-variable check; attempt 2 is valid.
        let incomplete: String = VALID_SCRIPT
            .lines()
            .filter(|line| !line.contains("os.environ.get('OUTPUT_DIR')"))
            .collect::<Vec<_>>()
            .join("\n");

        let gateway = Arc::new(MockGateway::new(vec![
            Ok(fenced(&incomplete)),
            Ok(fenced(VALID_SCRIPT)),
        ]));
        let executor = Arc::new(MockExecutor::new(vec![success_with(vec![dxf_artifact(
            "floorplan.dxf",
        )])]));

        let generation = generator(gateway.clone(), executor.clone())
            .generate("studio apartment garage conversion")
            .await
            .unwrap();

        assert_eq!(generation.attempts, 2);
        assert_eq!(generation.result.artifacts.len(), 1);

        // Validation failure never reaches the executor.
        assert_eq!(executor.executed().len(), 1);

        // The retry prompt names the missing construct and repeats the context.
        let prompts = gateway.prompts();
        assert_eq!(prompts.len(), 2);
        assert!(prompts[1].contains("os.environ.get('OUTPUT_DIR')"));
        assert!(prompts[1].contains("missing required components"));
        assert!(prompts[1].contains("studio apartment garage conversion"));
    }

    #[tokio::test]
    async fn test_missing_code_block_counts_as_attempt() {
        let gateway = Arc::new(MockGateway::new(vec![
            Ok("I'm sorry, I can't help with that.".to_string()),
            Ok(fenced(VALID_SCRIPT)),
        ]));
        let executor = Arc::new(MockExecutor::new(vec![success_with(vec![dxf_artifact(
            "floorplan.dxf",
        )])]));

        let generation = generator(gateway.clone(), executor)
            .generate("two bedroom cottage")
            .await
            .unwrap();

        assert_eq!(generation.attempts, 2);
        assert!(gateway.prompts()[1].contains("no code block found"));
    }

    #[tokio::test]
    async fn test_clean_run_without_artifact_is_retried_with_guidance() {
        let gateway = Arc::new(MockGateway::new(vec![
            Ok(fenced(VALID_SCRIPT)),
            Ok(fenced(VALID_SCRIPT)),
        ]));
        // First run writes only notes.txt, second writes the drawing.
        let notes = Artifact {
            file_name: "notes.txt".to_string(),
            extension: ".txt".to_string(),
            ..dxf_artifact("notes.txt")
        };
        let executor = Arc::new(MockExecutor::new(vec![
            success_with(vec![notes]),
            success_with(vec![dxf_artifact("floorplan.dxf")]),
        ]));

        let generation = generator(gateway.clone(), executor)
            .generate("open plan office")
            .await
            .unwrap();

        assert_eq!(generation.attempts, 2);
        assert!(gateway.prompts()[1].contains("no .dxf file was generated"));
    }

    #[tokio::test]
    async fn test_execution_failure_feeds_stderr_into_next_prompt() {
        let gateway = Arc::new(MockGateway::new(vec![
            Ok(fenced(VALID_SCRIPT)),
            Ok(fenced(VALID_SCRIPT)),
        ]));
        let executor = Arc::new(MockExecutor::new(vec![
            failure("ModuleNotFoundError: No module named 'ezdxf'"),
            success_with(vec![dxf_artifact("floorplan.dxf")]),
        ]));

        let generation = generator(gateway.clone(), executor)
            .generate("loft with mezzanine")
            .await
            .unwrap();

        assert_eq!(generation.attempts, 2);
        assert!(gateway.prompts()[1].contains("ModuleNotFoundError: No module named 'ezdxf'"));
    }

    #[tokio::test]
    async fn test_success_on_final_attempt() {
        let gateway = Arc::new(MockGateway::new(vec![
            Ok(fenced(VALID_SCRIPT)),
            Ok(fenced(VALID_SCRIPT)),
            Ok(fenced(VALID_SCRIPT)),
        ]));
        let executor = Arc::new(MockExecutor::new(vec![
            failure("error one"),
            failure("error two"),
            success_with(vec![dxf_artifact("floorplan.dxf")]),
        ]));

        let generation = generator(gateway.clone(), executor)
            .generate("narrow townhouse")
            .await
            .unwrap();

        assert_eq!(generation.attempts, 3);
        assert_eq!(gateway.prompts().len(), 3);
    }

    #[tokio::test]
    async fn test_exhaustion_after_max_attempts() {
        let gateway = Arc::new(MockGateway::new(vec![
            Ok(fenced(VALID_SCRIPT)),
            Ok(fenced(VALID_SCRIPT)),
            Ok(fenced(VALID_SCRIPT)),
            // A fourth response would be a bug; the loop must never ask for it.
            Ok(fenced(VALID_SCRIPT)),
        ]));
        let executor = Arc::new(MockExecutor::new(vec![
            failure("error one"),
            failure("error two"),
            failure("error three"),
        ]));

        let error = generator(gateway.clone(), executor)
            .generate("impossible request")
            .await
            .unwrap_err();

        assert_eq!(gateway.prompts().len(), 3);
        match error {
            PlanBotError::GenerationExhausted {
                attempts,
                last_error,
            } => {
                assert_eq!(attempts, 3);
                assert_eq!(last_error, "error three");
            }
            other => panic!("expected GenerationExhausted, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_gateway_failure_surfaces_immediately() {
        let gateway = Arc::new(MockGateway::new(vec![Err(PlanBotError::LLMError(
            "provider unavailable".to_string(),
        ))]));
        let executor = Arc::new(MockExecutor::new(vec![]));

        let error = generator(gateway.clone(), executor.clone())
            .generate("anything")
            .await
            .unwrap_err();

        assert!(matches!(error, PlanBotError::LLMError(_)));
        assert_eq!(gateway.prompts().len(), 1);
        assert!(executor.executed().is_empty());
    }
}
