use std::path::PathBuf;

use clap::Parser;

use crate::application::data::LogLevel;

/// Select test262 directories and run the conformance harness on them.
#[derive(Parser, Debug, Clone)]
#[command(version)]
pub struct Cli {
    /// Names of the test directories to select [default: built-ins]
    pub targets: Vec<String>,

    /// Names of the test directories to deselect after selecting
    #[clap(long, short)]
    pub deselect: Vec<String>,

    /// The test directory to scan [default: ./test262/test]
    #[clap(long, short)]
    pub test_root: Option<PathBuf>,

    /// Path to the js_cmp executable [default: ./js_cmp]
    #[clap(long)]
    pub js_cmp_path: Option<PathBuf>,

    /// Harness command line placed before each test glob
    #[clap(long)]
    pub harness: Option<String>,

    /// Config file, `runner.yaml` when it exists
    #[clap(long, short)]
    pub config: Option<PathBuf>,

    /// Print the harness commands without running them
    #[clap(long)]
    pub dry_run: bool,

    /// Do not print the test tree
    #[clap(long)]
    pub no_tree: bool,

    #[clap(long, short, default_value = "warn", value_enum)]
    pub log_level: LogLevel,
}
