mod command;
mod launcher;

pub use command::{HarnessCommand, HarnessCommandError, HarnessInvocation};
pub use launcher::{DryRunLauncher, HarnessError, HarnessLauncher, ProcessLauncher};
