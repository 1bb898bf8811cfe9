use std::borrow::Cow;
use std::path::{Path, PathBuf};

/// Path of the synthetic node sitting above the test directory entries.
const ROOT_NAME: &str = "root";

const INDENT: &str = "    ";
const SELECTED_MARKER: &str = "[X]";
const UNSELECTED_MARKER: &str = "[ ]";

/// One directory (or top-level file) of the test suite.
///
/// Children are owned exclusively by their parent, so the tree can be
/// mutated in place through `&mut` and read through `&` without copies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirNode {
    path: PathBuf,
    selected: bool,
    children: Vec<DirNode>,
}

impl DirNode {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            selected: false,
            children: Vec::new(),
        }
    }

    pub fn root() -> Self {
        Self::new(ROOT_NAME)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub fn children(&self) -> &[DirNode] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut [DirNode] {
        &mut self.children
    }

    /// The last segment of the path, or the whole path when it has none.
    ///
    /// Trailing separators are ignored, so `a/b/` is named `b` rather than
    /// the empty string. Scanned paths never end in a separator.
    pub fn name(&self) -> Cow<'_, str> {
        match self.path.file_name() {
            Some(name) => name.to_string_lossy(),
            None => self.path.to_string_lossy(),
        }
    }

    pub fn add_child(&mut self, child: DirNode) {
        self.children.push(child);
    }

    /// Sets the flag on this node and every descendant.
    pub fn toggle_selection(&mut self, select: bool) {
        self.selected = select;
        for child in &mut self.children {
            child.toggle_selection(select);
        }
    }

    /// Toggles every subtree rooted at a node named `target`.
    ///
    /// A matching node is toggled as a whole and not searched further;
    /// siblings keep being searched, so disjoint matches are all toggled.
    /// Returns how many subtrees matched.
    pub fn match_and_toggle(&mut self, target: &str, select: bool) -> usize {
        if self.name() == target {
            self.toggle_selection(select);
            return 1;
        }
        self.children
            .iter_mut()
            .map(|child| child.match_and_toggle(target, select))
            .sum()
    }

    /// Renders this node and its descendants as `[X] name` / `[ ] name`
    /// lines, depth-first, each level indented by four more spaces.
    pub fn render(&self, prefix: &str) -> Vec<String> {
        let mut lines = Vec::new();
        self.render_into(prefix, &mut lines);
        lines
    }

    fn render_into(&self, prefix: &str, lines: &mut Vec<String>) {
        let marker = if self.selected {
            SELECTED_MARKER
        } else {
            UNSELECTED_MARKER
        };
        lines.push(format!("{prefix}{marker} {}", self.name()));

        let child_prefix = format!("{prefix}{INDENT}");
        for child in &self.children {
            child.render_into(&child_prefix, lines);
        }
    }

    /// Pre-order iterator over all descendants, excluding this node.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants {
            stack: self.children.iter().rev().collect(),
        }
    }

    /// Number of nodes in this subtree, including this node.
    pub fn node_count(&self) -> usize {
        1 + self.descendants().count()
    }
}

pub struct Descendants<'a> {
    stack: Vec<&'a DirNode>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a DirNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}
