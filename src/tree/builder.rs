use std::fs;
use std::path::{Path, PathBuf};

use snafu::{ResultExt, Snafu};
use tracing::debug;

use crate::ext::BestEffortPathExt;
use crate::tree::DirNode;

impl DirNode {
    /// Builds the tree for the test directory at `test_root`.
    ///
    /// Every entry of `test_root` becomes a child of the synthetic root.
    /// Entries that are directories additionally get their immediate
    /// subdirectories as children; files at that level are ignored.
    /// Enumeration order is kept as the filesystem reports it.
    pub fn scan(test_root: &Path) -> Result<Self, TreeBuildError> {
        debug!(
            "Scanning test directory {}",
            test_root.best_effort_path_display()
        );
        let mut root = DirNode::root();

        for entry_path in read_entries(test_root)? {
            let mut category = DirNode::new(&entry_path);
            if entry_path.is_dir() {
                for sub_path in read_entries(&entry_path)? {
                    if sub_path.is_dir() {
                        category.add_child(DirNode::new(sub_path));
                    }
                }
            }
            debug!(
                "Found '{}' with {} subdirectories",
                category.name(),
                category.children().len()
            );
            root.add_child(category);
        }

        Ok(root)
    }
}

fn read_entries(dir: &Path) -> Result<Vec<PathBuf>, TreeBuildError> {
    fs::read_dir(dir)
        .context(ReadDirSnafu { path: dir })?
        .map(|entry| {
            entry
                .map(|entry| entry.path())
                .context(ReadEntrySnafu { path: dir })
        })
        .collect()
}

#[derive(Debug, Snafu)]
pub enum TreeBuildError {
    #[snafu(display("Failed to read directory {}", path.best_effort_path_display()))]
    ReadDirError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("Failed to read an entry of directory {}", path.best_effort_path_display()))]
    ReadEntryError {
        path: PathBuf,
        source: std::io::Error,
    },
}
