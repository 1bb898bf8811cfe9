use std::path::PathBuf;

use crate::cli::Cli;
use crate::config::{DEFAULT_CONFIG_FILE, RunnerConfig};
use crate::harness::HarnessCommandError;

/// Command-line settings, layered on top of the config file.
#[derive(Debug, Clone, Default)]
pub struct RuntimeConfig {
    pub targets: Vec<String>,
    pub deselect: Vec<String>,
    pub test_root: Option<PathBuf>,
    pub js_cmp_path: Option<PathBuf>,
    pub harness: Option<String>,
    pub config_file: Option<PathBuf>,
    pub dry_run: bool,
    pub print_tree: bool,
}

impl RuntimeConfig {
    /// The config file to read and whether it has to exist. Only an
    /// explicitly named file is required.
    pub fn config_file(&self) -> (PathBuf, bool) {
        match &self.config_file {
            Some(path) => (path.clone(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        }
    }

    /// Overrides the file's scalar settings and appends to its name lists.
    pub fn apply_to(&self, mut config: RunnerConfig) -> Result<RunnerConfig, HarnessCommandError> {
        if let Some(test_root) = &self.test_root {
            config.test_root = test_root.clone();
        }
        if let Some(js_cmp_path) = &self.js_cmp_path {
            config.js_cmp_path = js_cmp_path.clone();
        }
        if let Some(harness) = &self.harness {
            config.harness = harness.parse()?;
        }
        config.select.extend(self.targets.iter().cloned());
        config.deselect.extend(self.deselect.iter().cloned());
        Ok(config)
    }
}

impl From<Cli> for RuntimeConfig {
    fn from(cli: Cli) -> Self {
        Self {
            targets: cli.targets,
            deselect: cli.deselect,
            test_root: cli.test_root,
            js_cmp_path: cli.js_cmp_path,
            harness: cli.harness,
            config_file: cli.config,
            dry_run: cli.dry_run,
            print_tree: !cli.no_tree,
        }
    }
}
