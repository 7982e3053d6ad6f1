// ABOUTME: One-shot command execution inside a running container: create, start, inspect

use super::client::{ClientError, DockerClient};
use super::stream::combined_output;
use super::transport::EngineTransport;
use async_trait::async_trait;
use tracing::{debug, warn};

/// Exit code reported when the engine never told us the real one.
pub const UNKNOWN_EXIT_CODE: i64 = -1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecResult {
    pub exit_code: i64,
    /// Combined stdout/stderr text in arrival order.
    pub output: String,
}

impl ExecResult {
    pub fn succeeded(&self) -> bool {
        self.exit_code == 0
    }
}

/// Seam for anything that can run a command inside a named container.
/// The site lifecycle manager depends on this, not on the engine client,
/// so its flows are testable without a running engine.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run_command(&self, container: &str, command: &[String])
        -> Result<ExecResult, ClientError>;
}

/// Drives a fresh exec session per invocation: create, start (which runs the
/// command to completion because the transport reads until the engine closes
/// the connection), then inspect for the exit code. Never retries; callers
/// decide what a non-zero exit code means.
pub struct EngineExecRunner<T> {
    client: DockerClient<T>,
}

impl<T: EngineTransport> EngineExecRunner<T> {
    pub fn new(client: DockerClient<T>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl<T: EngineTransport> CommandRunner for EngineExecRunner<T> {
    async fn run_command(
        &self,
        container: &str,
        command: &[String],
    ) -> Result<ExecResult, ClientError> {
        let exec_id = self.client.create_exec(container, command).await?;
        debug!("created exec {exec_id} in container {container}");

        let raw = self.client.start_exec(&exec_id).await?;
        let output = combined_output(&raw);

        // The command already ran; a failed inspection only costs us the exit
        // code, not the captured output.
        let exit_code = match self.client.inspect_exec(&exec_id).await {
            Ok(code) => code,
            Err(err) => {
                warn!("exit code inspection failed for exec {exec_id}: {err}");
                UNKNOWN_EXIT_CODE
            }
        };

        debug!("exec {exec_id} finished with exit code {exit_code}");
        Ok(ExecResult { exit_code, output })
    }
}
