//! Sandboxed execution of generated drafting scripts.
//!
//! Provides the executor trait the generation loop drives, the result and
//! artifact types shared with the HTTP boundary, and the subprocess-backed
//! implementation. Executors are single-shot primitives: one scratch
//! directory per run, no retry logic, and no state shared between runs.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod script;

pub use script::ScriptExecutor;

/// A file harvested from the scratch directory after a successful run.
///
/// Wire field names match what the chat client expects for download handling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artifact {
    #[serde(rename = "name")]
    pub file_name: String,
    /// Lowercased extension including the leading dot, e.g. `.dxf`.
    #[serde(rename = "type")]
    pub extension: String,
    #[serde(rename = "size")]
    pub size_bytes: u64,
    /// Base64-encoded file contents.
    #[serde(rename = "data")]
    pub content_base64: String,
    #[serde(rename = "isImage")]
    pub is_image: bool,
    #[serde(rename = "mimeType")]
    pub mime_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResult {
    pub succeeded: bool,
    pub stdout: String,
    pub stderr: String,
    pub artifacts: Vec<Artifact>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
}

impl ExecutionResult {
    /// A failure that produced no process output at all, e.g. the scratch
    /// directory could not be allocated or the interpreter never spawned.
    pub fn infrastructure_failure(reason: impl Into<String>) -> Self {
        Self {
            succeeded: false,
            stdout: String::new(),
            stderr: String::new(),
            artifacts: Vec::new(),
            failure_reason: Some(reason.into()),
        }
    }

    /// Whether any harvested artifact carries the given extension. Artifact
    /// ordering is not stable across runs, so callers filter rather than index.
    pub fn has_artifact_with_extension(&self, extension: &str) -> bool {
        let extension = extension.to_lowercase();
        self.artifacts
            .iter()
            .any(|artifact| artifact.file_name.to_lowercase().ends_with(&extension))
    }
}

#[async_trait]
pub trait CodeExecutor: Send + Sync {
    /// Run `source` in an isolated subprocess and capture everything it
    /// produced. Infrastructure faults are folded into the result as
    /// `succeeded == false`; this call never propagates them.
    async fn execute(&self, source: &str) -> ExecutionResult;
}
