use std::process::Stdio;

use compio::process::Command;
use snafu::{ResultExt, Snafu, ensure};
use tracing::{debug, info};

use crate::harness::{HarnessCommand, HarnessInvocation};

const PREFLIGHT_ARG: &str = "--help";

pub trait HarnessLauncher {
    /// Runs the invocation to completion.
    async fn launch(&self, invocation: &HarnessInvocation) -> Result<(), HarnessError>;
}

/// Spawns the harness as a child process sharing this process's stdio.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessLauncher;

impl HarnessLauncher for ProcessLauncher {
    async fn launch(&self, invocation: &HarnessInvocation) -> Result<(), HarnessError> {
        let mut cmd = Self::create_command(invocation);

        let mut handle = cmd.spawn().context(SpawnSnafu {
            command: invocation.to_string(),
        })?;

        let status = handle.wait().await.context(WaitSnafu {
            command: invocation.to_string(),
        })?;

        if status.success() {
            info!("Harness run '{}' completed successfully", invocation);
            Ok(())
        } else {
            Err(HarnessError::UnsuccessfulExecution {
                command: invocation.to_string(),
                status: status.code().unwrap_or(-1),
            })
        }
    }
}

impl ProcessLauncher {
    /// Checks that the harness program can be started by running
    /// `<program> --help` with its output discarded.
    pub async fn preflight(harness: &HarnessCommand) -> Result<(), HarnessError> {
        let command = format!("{} {}", harness.program(), PREFLIGHT_ARG);
        debug!("Checking harness availability with '{}'", command);

        let mut cmd = Command::new(harness.program());
        cmd.arg(PREFLIGHT_ARG);
        let _ = cmd.stdin(Stdio::null());
        let _ = cmd.stdout(Stdio::null());
        let _ = cmd.stderr(Stdio::null());

        let mut handle = cmd.spawn().context(SpawnSnafu {
            command: command.clone(),
        })?;
        let status = handle.wait().await.context(WaitSnafu {
            command: command.clone(),
        })?;

        ensure!(
            status.success(),
            UnsuccessfulExecutionSnafu {
                command,
                status: status.code().unwrap_or(-1),
            }
        );
        Ok(())
    }

    /// The program is executed directly with an argument vector; no shell
    /// ever sees the node paths.
    fn create_command(invocation: &HarnessInvocation) -> Command {
        let mut cmd = Command::new(invocation.program());
        cmd.args(invocation.args());
        let _ = cmd.stdin(Stdio::inherit());
        let _ = cmd.stdout(Stdio::inherit());
        let _ = cmd.stderr(Stdio::inherit());
        cmd
    }
}

/// Launches nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct DryRunLauncher;

impl HarnessLauncher for DryRunLauncher {
    async fn launch(&self, invocation: &HarnessInvocation) -> Result<(), HarnessError> {
        debug!("Dry run, not launching '{}'", invocation);
        Ok(())
    }
}

#[derive(Debug, Snafu)]
pub enum HarnessError {
    #[snafu(display("Failed to spawn harness command '{}'", command))]
    SpawnError {
        command: String,
        source: std::io::Error,
    },
    #[snafu(display("Failed to wait for harness command '{}'", command))]
    WaitError {
        command: String,
        source: std::io::Error,
    },
    #[snafu(display("Harness command '{}' failed with exit code {}", command, status))]
    UnsuccessfulExecution { command: String, status: i32 },
}
