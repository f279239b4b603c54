use std::path::{Component, Path, PathBuf};

use super::AdvisoryPolicy;

impl AdvisoryPolicy {
    /// Whether `target` resolves inside one of the configured scratch
    /// directories. Traversal, null bytes and paths outside the workspace
    /// never count as scratch.
    pub fn is_scratch_target(&self, target: &str) -> bool {
        if target.contains('\0') || self.scratch_dirs.is_empty() {
            return false;
        }

        let lower = target.to_lowercase();
        if lower.contains("..%2f") || lower.contains("%2f..") {
            return false;
        }

        let path = Path::new(target);
        if path
            .components()
            .any(|c| matches!(c, Component::ParentDir))
        {
            return false;
        }

        let relative: PathBuf = if path.is_absolute() {
            match path.strip_prefix(&self.workspace_dir) {
                Ok(stripped) => stripped.to_path_buf(),
                Err(_) => return false,
            }
        } else {
            path.components()
                .filter(|c| !matches!(c, Component::CurDir))
                .collect()
        };

        self.scratch_dirs
            .iter()
            .any(|scratch| relative.starts_with(scratch) && relative != *scratch)
    }
}
