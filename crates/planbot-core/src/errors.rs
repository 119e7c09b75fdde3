//! Error types for the floor-plan generation pipeline
//!
//! A single crate-wide error enum covers the gateway, configuration, and the
//! generation loop, while subprocess faults get their own enum so the executor
//! can fold them into an `ExecutionResult` instead of propagating them. The
//! retry loop depends on errors carrying the concrete failure text, since that
//! text becomes the next prompt's correction signal.

use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum PlanBotError {
    #[error("LLM interaction failed: {0}")]
    LLMError(String),
    #[error("Parsing error: {0}")]
    ParsingError(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("I/O error: {0}")]
    IoError(String),
    #[error("Failed to generate a qualifying drawing file after {attempts} attempts. Last error: {last_error}")]
    GenerationExhausted { attempts: usize, last_error: String },
}

impl From<std::io::Error> for PlanBotError {
    fn from(err: std::io::Error) -> Self {
        PlanBotError::IoError(err.to_string())
    }
}

impl From<reqwest::Error> for PlanBotError {
    fn from(err: reqwest::Error) -> Self {
        PlanBotError::LLMError(err.to_string())
    }
}

// Specific error for the script executor
#[derive(Error, Debug)]
pub enum ScriptExecutorError {
    #[error("I/O error during script execution: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Could not create temporary file/directory: {0}")]
    TempFileError(String),
    #[error("Script execution timed out after {0} seconds")]
    Timeout(u64),
    #[error("Error processing generated files: {0}")]
    HarvestError(String),
}
