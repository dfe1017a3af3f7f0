//! Directory enumeration.
//!
//! Depth-first with an explicit stack, entries in lexical order within each
//! directory. Symlinked directories are followed once: a canonical-path set
//! stops cycles. Unreadable subdirectories and dangling links are logged and
//! skipped; only an unreadable root fails.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::AcquisitionError;
use crate::types::config::DirectoryConfig;

enum Work {
    Dir { path: PathBuf, depth: usize },
    File(PathBuf),
}

/// List the files below `root` in depth-first lexical order.
///
/// Blocking; call it from `spawn_blocking`.
pub fn walk(root: &Path, config: &DirectoryConfig) -> Result<Vec<PathBuf>, AcquisitionError> {
    let raw = root.display().to_string();
    let metadata = fs::metadata(root).map_err(|e| AcquisitionError::from_io(&raw, e))?;
    if !metadata.is_dir() {
        return Err(AcquisitionError::not_found(format!("{} is not a directory", raw)));
    }

    let mut files = Vec::new();
    let mut visited = HashSet::new();
    let mut stack = vec![Work::Dir {
        path: root.to_path_buf(),
        depth: 0,
    }];

    while let Some(work) = stack.pop() {
        let (dir, depth) = match work {
            Work::File(path) => {
                files.push(path);
                continue;
            }
            Work::Dir { path, depth } => (path, depth),
        };

        let canonical = fs::canonicalize(&dir).map_err(|e| AcquisitionError::from_io(&raw, e));
        match canonical {
            Ok(canonical) if !visited.insert(canonical.clone()) => {
                warn!(path = %dir.display(), resolved = %canonical.display(), "directory cycle, skipping");
                continue;
            }
            Ok(_) => {}
            Err(e) if depth == 0 => return Err(e),
            Err(e) => {
                warn!(path = %dir.display(), error = %e, "cannot resolve directory, skipping");
                continue;
            }
        }

        let mut entries = match read_sorted(&dir) {
            Ok(entries) => entries,
            Err(e) if depth == 0 => return Err(AcquisitionError::from_io(&raw, e)),
            Err(e) => {
                warn!(path = %dir.display(), error = %e, "cannot read directory, skipping");
                continue;
            }
        };

        // Reverse so the stack pops entries in lexical order.
        entries.reverse();
        for path in entries {
            if !config.include_hidden && is_hidden(&path) {
                continue;
            }
            match fs::metadata(&path) {
                Ok(meta) if meta.is_dir() => {
                    if depth + 1 > config.max_depth {
                        warn!(path = %path.display(), max_depth = config.max_depth, "too deep, skipping");
                        continue;
                    }
                    stack.push(Work::Dir {
                        path,
                        depth: depth + 1,
                    });
                }
                Ok(meta) if meta.is_file() => stack.push(Work::File(path)),
                Ok(_) => debug!(path = %path.display(), "not a regular file, skipping"),
                Err(e) => warn!(path = %path.display(), error = %e, "dangling entry, skipping"),
            }
        }
    }

    debug!(root = %raw, files = files.len(), "directory enumerated");
    Ok(files)
}

fn read_sorted(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut entries = fs::read_dir(dir)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()?;
    entries.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(entries)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}
