use std::path::{Component, Path, PathBuf};

/// Displays a path as absolute as possible, for log and error messages.
///
/// Existing paths are canonicalized. Paths that cannot be canonicalized,
/// such as a missing test directory, are made absolute against the current
/// directory and lexically normalized instead.
pub trait BestEffortPathExt {
    fn best_effort_path_display(&self) -> String;
}

impl<P: AsRef<Path> + ?Sized> BestEffortPathExt for P {
    fn best_effort_path_display(&self) -> String {
        let path = self.as_ref();
        if let Ok(canonical) = path.canonicalize() {
            return canonical.display().to_string();
        }

        let absolute = match std::env::current_dir() {
            Ok(current_dir) if path.is_relative() => current_dir.join(path),
            _ => path.to_path_buf(),
        };
        normalize(&absolute).display().to_string()
    }
}

fn normalize(path: &Path) -> PathBuf {
    path.components()
        .fold(Vec::new(), |mut components, component| {
            match component {
                Component::CurDir => {}
                Component::ParentDir => {
                    if matches!(components.last(), Some(Component::Normal(_))) {
                        components.pop();
                    }
                }
                other => components.push(other),
            }
            components
        })
        .iter()
        .collect()
}
