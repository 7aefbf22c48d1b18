//! Agent process executor.
//!
//! Spawns `<program> <script> <kind> --provider P --model M --prompt TEXT
//! [--config JSON]` and reads a single JSON outcome from stdout.

use async_trait::async_trait;
use std::process::{Output, Stdio};
use std::time::Duration;
use tokio::process::Command;

use crate::config::ExecutorConfig;
use crate::error::ExecutorError;
use crate::executor::{ExecOutcome, ExecRequest, Executor};

/// Runs the external agent once per call.
#[derive(Debug, Clone)]
pub struct ProcessExecutor {
    config: ExecutorConfig,
}

impl ProcessExecutor {
    pub fn new(config: ExecutorConfig) -> Self {
        Self { config }
    }

    fn command(&self, request: &ExecRequest) -> Command {
        let mut cmd = Command::new(&self.config.program);
        cmd.arg(&self.config.script)
            .arg(request.kind.as_str())
            .args(["--provider", request.provider.as_str()])
            .args(["--model", request.model.as_str()])
            .args(["--prompt", request.prompt.as_str()]);

        if let Some(config) = &request.config {
            cmd.arg("--config").arg(config.to_string());
        }
        if let Some(dir) = &self.config.working_dir {
            cmd.current_dir(dir);
        }

        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }
}

#[async_trait]
impl Executor for ProcessExecutor {
    async fn execute(&self, request: ExecRequest) -> Result<ExecOutcome, ExecutorError> {
        let child = self.command(&request).spawn().map_err(ExecutorError::Spawn)?;

        tracing::trace!(
            kind = request.kind.as_str(),
            provider = %request.provider,
            model = %request.model,
            "Agent spawned"
        );

        // Dropping the pending future on timeout drops the child, which kills it.
        let deadline = Duration::from_millis(self.config.timeout_ms);
        let output = match tokio::time::timeout(deadline, child.wait_with_output()).await {
            Ok(result) => result.map_err(ExecutorError::Io)?,
            Err(_) => return Err(ExecutorError::Timeout(self.config.timeout_ms)),
        };

        parse_output(&output)
    }
}

fn parse_output(output: &Output) -> Result<ExecOutcome, ExecutorError> {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stdout = stdout.trim();

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let stderr = stderr.trim();
        return Err(ExecutorError::Exit {
            code: output.status.code().unwrap_or(-1),
            output: (if stderr.is_empty() { stdout } else { stderr }).to_string(),
        });
    }

    serde_json::from_str(stdout).map_err(|_| ExecutorError::Decode(stdout.to_string()))
}
