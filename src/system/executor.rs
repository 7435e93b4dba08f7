use std::process::Stdio;
use std::time::{Duration, Instant};

use tokio::process::Command;

use crate::command::{CommandResult, CommandTable, Invocation, Request};
use crate::error::DispatchError;

/// Runs package-manager invocations and captures their output.
///
/// The child inherits the environment, gets a null stdin and has stdout and
/// stderr captured separately. It is killed if the timeout elapses or the
/// future is dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct Executor {
    timeout: Option<Duration>,
}

impl Executor {
    pub fn new(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }

    /// `0` means no timeout.
    pub fn with_timeout_secs(secs: u64) -> Self {
        Self::new((secs > 0).then(|| Duration::from_secs(secs)))
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Builds the command line for `request` and runs it.
    pub async fn dispatch(
        &self,
        table: &CommandTable,
        request: &Request,
    ) -> Result<CommandResult, DispatchError> {
        self.run(&table.invocation(request)).await
    }

    pub async fn run(&self, invocation: &Invocation) -> Result<CommandResult, DispatchError> {
        tracing::info!(command = %invocation, "running");
        let started = Instant::now();

        let execution_error = |source: std::io::Error| DispatchError::Execution {
            program: invocation.program.clone(),
            source,
        };

        let child = Command::new(&invocation.program)
            .args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(execution_error)?;

        let output = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, child.wait_with_output()).await {
                Ok(output) => output,
                Err(_) => {
                    tracing::error!(command = %invocation, ?limit, "timed out");
                    return Err(DispatchError::TimedOut {
                        program: invocation.program.clone(),
                        after: limit,
                    });
                }
            },
            None => child.wait_with_output().await,
        }
        .map_err(execution_error)?;

        let result = CommandResult {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            elapsed: started.elapsed(),
        };
        tracing::debug!(
            exit_code = ?result.exit_code,
            stdout_bytes = result.stdout.len(),
            stderr_bytes = result.stderr.len(),
            elapsed_ms = result.elapsed.as_millis() as u64,
            "finished"
        );

        if result.success() {
            Ok(result)
        } else {
            Err(DispatchError::NonZeroExit { result })
        }
    }
}
