use std::fmt;
use std::io::{self, Write};

use colored::Colorize;
use snafu::Report;
use supports_color::Stream;
use tracing::{debug, info, warn};

use crate::config::RunnerConfig;
use crate::ext::BestEffortPathExt;
use crate::harness::{HarnessInvocation, HarnessLauncher};
use crate::tree::{DirNode, TreeBuildError};

/// Owns the test tree and drives the harness over its selected nodes.
#[derive(Debug)]
pub struct Runner {
    config: RunnerConfig,
    tree: DirNode,
}

impl Runner {
    pub fn new(config: RunnerConfig, tree: DirNode) -> Self {
        Self { config, tree }
    }

    /// Scans `config.test_root`. Nothing is built if any directory in the
    /// first two levels cannot be read.
    pub fn build(config: RunnerConfig) -> Result<Self, TreeBuildError> {
        let tree = DirNode::scan(&config.test_root)?;
        info!(
            "Built test tree of {} nodes from {}",
            tree.node_count(),
            config.test_root.best_effort_path_display()
        );
        debug!(
            "js_cmp path {} is accepted but not used",
            config.js_cmp_path.best_effort_path_display()
        );
        Ok(Self::new(config, tree))
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    pub fn tree(&self) -> &DirNode {
        &self.tree
    }

    /// Toggles every subtree named `target`. The synthetic root is never
    /// matched. Returns the number of matching subtrees.
    pub fn select(&mut self, target: &str, include: bool) -> usize {
        let matched: usize = self
            .tree
            .children_mut()
            .iter_mut()
            .map(|child| child.match_and_toggle(target, include))
            .sum();

        if matched == 0 {
            warn!("No test directory named '{}'", target);
        } else {
            let action = if include { "Selected" } else { "Deselected" };
            debug!("{} {} subtree(s) named '{}'", action, matched, target);
        }
        matched
    }

    /// Applies the configured selections, then the configured deselections.
    pub fn apply_configured_selection(&mut self) {
        let selection: Vec<String> = self
            .config
            .selection()
            .into_iter()
            .map(str::to_string)
            .collect();
        let deselection = self.config.deselect.clone();

        for target in &selection {
            self.select(target, true);
        }
        for target in &deselection {
            self.select(target, false);
        }
    }

    pub fn render_tree(&self) -> Vec<String> {
        self.tree.render("")
    }

    pub fn print_tree(&self) {
        let colorize = supports_color::on(Stream::Stdout).is_some();
        self.write_tree(&mut io::stdout().lock(), colorize);
    }

    /// Stops at the first line the reader no longer accepts.
    fn write_tree(&self, out: &mut impl Write, colorize: bool) {
        for line in self.render_tree() {
            let written = if colorize {
                write_console_line(out, colorize_marker(&line))
            } else {
                write_console_line(out, line)
            };
            if !written {
                break;
            }
        }
    }

    /// One invocation per selected node below the root, in pre-order.
    ///
    /// A selected parent does not absorb its selected descendants: each of
    /// them gets its own invocation even though the parent's glob already
    /// covers its files.
    pub fn plan(&self) -> Vec<HarnessInvocation> {
        self.tree
            .descendants()
            .filter(|node| node.is_selected())
            .map(|node| self.config.harness.invocation_for(node.path()))
            .collect()
    }

    /// Launches the planned invocations one after another.
    ///
    /// Harness failures are logged and counted; they never stop the walk.
    pub async fn run(&self, launcher: &impl HarnessLauncher) -> RunReport {
        let mut report = RunReport::default();
        let mut console_open = true;

        for invocation in self.plan() {
            if console_open {
                console_open = write_console_line(
                    &mut io::stdout().lock(),
                    format_args!("Running: {invocation}"),
                );
            }
            report.dispatched += 1;
            if let Err(err) = launcher.launch(&invocation).await {
                warn!("{}", Report::from_error(err));
                report.failed += 1;
            }
        }

        info!("{report}");
        report
    }
}

/// Writes one line of console output. Returns `false` once the reader has
/// gone away, e.g. `test262-runner | head`.
fn write_console_line(out: &mut impl Write, line: impl fmt::Display) -> bool {
    match writeln!(out, "{line}") {
        Ok(()) => true,
        Err(err) if err.kind() == io::ErrorKind::BrokenPipe => {
            debug!("Stdout closed, dropping further console output");
            false
        }
        Err(err) => {
            warn!("Failed to write to stdout: {}", err);
            true
        }
    }
}

fn colorize_marker(line: &str) -> String {
    let trimmed = line.trim_start();
    let indent = &line[..line.len() - trimmed.len()];
    if let Some(name) = trimmed.strip_prefix("[X] ") {
        format!("{indent}{} {name}", "[X]".green().bold())
    } else if let Some(name) = trimmed.strip_prefix("[ ] ") {
        format!("{indent}{} {name}", "[ ]".dimmed())
    } else {
        line.to_string()
    }
}

/// Outcome counts of a run. Failed launches include spawn failures and
/// non-zero exits alike.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunReport {
    pub dispatched: usize,
    pub failed: usize,
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Dispatched {} harness run(s), {} failed",
            self.dispatched, self.failed
        )
    }
}
