use snafu::Snafu;
use snafu::Report;
use snafu::prelude::*;
use tracing::{debug, warn};

use crate::application::RuntimeConfig;
use crate::config::{ConfigError, RunnerConfig};
use crate::harness::{DryRunLauncher, HarnessCommandError, ProcessLauncher};
use crate::runner::{RunReport, Runner};
use crate::tree::TreeBuildError;

pub struct Application;

impl Application {
    /// Builds the tree, applies the selection, prints the tree and runs the
    /// harness on every selected directory.
    ///
    /// Harness failures are part of the report, not an error.
    pub async fn run(app_config: impl Into<RuntimeConfig>) -> Result<RunReport, ApplicationError> {
        let app_config: RuntimeConfig = app_config.into();

        let (config_path, required) = app_config.config_file();
        let file_config = RunnerConfig::read(&config_path, required)
            .await
            .context(ConfigSnafu)?;
        let config = app_config.apply_to(file_config).context(HarnessSnafu)?;
        debug!("Resolved config: {:?}", config);

        let mut runner = Runner::build(config).context(TreeBuildSnafu)?;
        runner.apply_configured_selection();
        debug!("Selection: {:?}", runner.config().selection());

        if app_config.print_tree {
            runner.print_tree();
        }

        let report = if app_config.dry_run {
            runner.run(&DryRunLauncher).await
        } else {
            if let Err(err) = ProcessLauncher::preflight(&runner.config().harness).await {
                warn!(
                    "Harness does not look runnable, continuing anyway: {}",
                    Report::from_error(err)
                );
            }
            runner.run(&ProcessLauncher).await
        };
        Ok(report)
    }
}

#[derive(Debug, Snafu)]
pub enum ApplicationError {
    #[snafu(display("Critical failure encountered during configuration stage"))]
    ConfigError { source: ConfigError },
    #[snafu(display("Critical failure encountered while parsing the harness command"))]
    HarnessError { source: HarnessCommandError },
    #[snafu(display("Critical failure encountered while building the test tree"))]
    TreeBuildError { source: TreeBuildError },
}
