// src/executors/script.rs
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use uuid::Uuid;

use super::{Artifact, CodeExecutor, ExecutionResult};
use crate::errors::ScriptExecutorError;

/// Environment variable generated code reads to find its output directory.
/// This is the whole contract between the service and the script: one
/// variable, one directory, write your output file there.
pub const OUTPUT_DIR_ENV: &str = "OUTPUT_DIR";

const IMAGE_EXTENSIONS: &[&str] = &[".png", ".jpg", ".jpeg", ".gif"];

/// Runs generated scripts in an isolated subprocess.
///
/// Isolation here means a dedicated scratch directory and a separate process,
/// nothing more. The executor deliberately does not sanitize or sandbox the
/// code beyond that; callers own the decision to run untrusted output from a
/// language model through a bare interpreter.
pub struct ScriptExecutor {
    interpreter: String,
    script_extension: String,
    timeout: Duration,
}

impl ScriptExecutor {
    pub fn new(
        interpreter: impl Into<String>,
        script_extension: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            interpreter: interpreter.into(),
            script_extension: script_extension.into(),
            timeout,
        }
    }

    /// Executor for the Python/ezdxf toolchain the floor-plan prompts target.
    pub fn python(timeout: Duration) -> Self {
        Self::new("python3", "py", timeout)
    }

    async fn run_script(
        &self,
        source: &str,
        scratch: &Path,
    ) -> Result<ExecutionResult, ScriptExecutorError> {
        // The script lives outside the scratch directory so it can never be
        // picked up as an output artifact.
        let script_dir = tempfile::Builder::new()
            .prefix("planbot-script-")
            .tempdir()
            .map_err(|e| ScriptExecutorError::TempFileError(e.to_string()))?;
        let script_path = script_dir
            .path()
            .join(format!("script_{}.{}", Uuid::new_v4(), self.script_extension));
        tokio::fs::write(&script_path, source).await?;

        let mut child = Command::new(&self.interpreter)
            .arg(&script_path)
            .env(OUTPUT_DIR_ENV, scratch)
            .current_dir(script_dir.path())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let stdout_task = tokio::spawn(drain_stream(child.stdout.take(), "stdout"));
        let stderr_task = tokio::spawn(drain_stream(child.stderr.take(), "stderr"));

        let status = tokio::select! {
            status = child.wait() => status?,
            _ = tokio::time::sleep(self.timeout) => {
                log::warn!(
                    "script execution exceeded {}s, killing process",
                    self.timeout.as_secs()
                );
                if let Err(e) = child.kill().await {
                    log::warn!("failed to kill timed-out script process: {}", e);
                }
                return Err(ScriptExecutorError::Timeout(self.timeout.as_secs()));
            }
        };

        let stdout = stdout_task.await.unwrap_or_default();
        let stderr = stderr_task.await.unwrap_or_default();

        if !status.success() {
            let failure_reason = if stderr.trim().is_empty() {
                format!("script execution failed ({})", status)
            } else {
                stderr.clone()
            };
            return Ok(ExecutionResult {
                succeeded: false,
                stdout,
                stderr,
                artifacts: Vec::new(),
                failure_reason: Some(failure_reason),
            });
        }

        match harvest_artifacts(scratch).await {
            Ok(artifacts) => Ok(ExecutionResult {
                succeeded: true,
                stdout,
                stderr,
                artifacts,
                failure_reason: None,
            }),
            Err(e) => Ok(ExecutionResult {
                succeeded: false,
                stdout,
                stderr,
                artifacts: Vec::new(),
                failure_reason: Some(e.to_string()),
            }),
        }
    }
}

#[async_trait]
impl CodeExecutor for ScriptExecutor {
    async fn execute(&self, source: &str) -> ExecutionResult {
        let scratch = match tempfile::Builder::new().prefix("planbot-scratch-").tempdir() {
            Ok(dir) => dir,
            Err(e) => {
                return ExecutionResult::infrastructure_failure(format!(
                    "could not allocate scratch directory: {}",
                    e
                ))
            }
        };

        let result = match self.run_script(source, scratch.path()).await {
            Ok(result) => result,
            Err(e) => ExecutionResult::infrastructure_failure(e.to_string()),
        };

        // Cleanup happens on every path; a failed removal is worth a log line
        // but never worth failing a run whose result is already captured.
        if let Err(e) = scratch.close() {
            log::warn!("failed to remove scratch directory: {}", e);
        }

        result
    }
}

/// Accumulate a process stream, logging each chunk tagged with its kind.
async fn drain_stream<R>(reader: Option<R>, kind: &'static str) -> String
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let Some(mut reader) = reader else {
        return String::new();
    };

    let mut buffer = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        match reader.read(&mut chunk).await {
            Ok(0) => break,
            Ok(n) => {
                log::debug!("[{}] {}", kind, String::from_utf8_lossy(&chunk[..n]).trim_end());
                buffer.extend_from_slice(&chunk[..n]);
            }
            Err(e) => {
                log::warn!("error draining {} stream: {}", kind, e);
                break;
            }
        }
    }

    String::from_utf8_lossy(&buffer).into_owned()
}

/// Read every top-level file in the scratch directory into an [`Artifact`].
async fn harvest_artifacts(scratch: &Path) -> Result<Vec<Artifact>, ScriptExecutorError> {
    let mut entries = tokio::fs::read_dir(scratch)
        .await
        .map_err(|e| ScriptExecutorError::HarvestError(e.to_string()))?;

    let mut artifacts = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| ScriptExecutorError::HarvestError(e.to_string()))?
    {
        let file_type = entry
            .file_type()
            .await
            .map_err(|e| ScriptExecutorError::HarvestError(e.to_string()))?;
        if !file_type.is_file() {
            continue;
        }

        let path = entry.path();
        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|e| ScriptExecutorError::HarvestError(e.to_string()))?;

        let file_name = entry.file_name().to_string_lossy().into_owned();
        let extension = path
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
            .unwrap_or_default();
        let is_image = IMAGE_EXTENSIONS.contains(&extension.as_str());
        let mime_type = if is_image {
            format!("image/{}", extension.trim_start_matches('.'))
        } else {
            "application/octet-stream".to_string()
        };

        artifacts.push(Artifact {
            file_name,
            extension,
            size_bytes: bytes.len() as u64,
            content_base64: BASE64.encode(&bytes),
            is_image,
            mime_type,
        });
    }

    Ok(artifacts)
}
