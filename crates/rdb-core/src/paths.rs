//! Breakpoint path canonicalization.

use std::path::{Component, Path, PathBuf};

use smol_str::SmolStr;

/// Expand `file` to an absolute, lexically normalized path.
///
/// Relative paths are resolved against `root`. `.` and `..` components are
/// folded without touching the filesystem, so symlinks are left as written
/// and the file does not need to exist.
#[must_use]
pub fn expand_path(file: &str, root: &Path) -> SmolStr {
    let path = Path::new(file);
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    };
    SmolStr::new(normalize(&joined).to_string_lossy())
}

fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // Popping past the root is a no-op, as with `cd /..`.
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
