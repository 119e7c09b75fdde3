//! Core library for chat-driven floor-plan generation.
//!
//! This crate turns natural-language design requirements into a 2D drawing
//! file by asking a language model for drafting code, running that code in an
//! isolated subprocess, and harvesting whatever the code produced. The
//! pipeline is built from small, separately testable pieces:
//!
//! - **Completion gateway**: provider-agnostic text completion with optional
//!   inline-image input
//! - **Sandbox executor**: single-shot subprocess runs with a dedicated
//!   scratch directory and artifact harvesting
//! - **Generation loop**: prompt, extract, validate, execute, evaluate, and
//!   retry with the previous failure as the correction signal
//! - **Configuration system**: YAML configuration with environment-aware
//!   defaults

pub mod bootstrap;
pub mod config;
pub mod core_types;
pub mod errors;
pub mod executors;
pub mod generation;
pub mod llm;

pub use config::{ConfigLoader, PlanBotConfig};
pub use core_types::InlineImage;
pub use errors::PlanBotError;
pub use executors::{Artifact, CodeExecutor, ExecutionResult, ScriptExecutor};
pub use generation::{FloorPlanGenerator, Generation, GeneratorConfig};
pub use llm::CompletionGateway;

#[cfg(test)]
pub mod test_utils;

#[cfg(test)]
mod test_generation_integration;
