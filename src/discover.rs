//! File discovery
//!
//! Walks the source tree and returns every regular file whose name ends with
//! the configured suffix, in a stable order (depth-first, entries sorted by
//! file name). Symlinks are never followed, so cycles cannot hang the walk;
//! sockets, fifos and other non-regular files are skipped.
//!
//! Discovery is all-or-nothing: the first filesystem error aborts the walk
//! and is returned as a [`DiscoveryError`]. Without a complete file list
//! there is nothing sensible to format.

use crate::config::FormatConfig;
use crate::error::{DiscoveryError, DiscoveryResult};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};
use walkdir::WalkDir;

/// Find all files under `config.root` matching the suffix and exclude filters
pub fn find_files(config: &FormatConfig) -> DiscoveryResult<Vec<PathBuf>> {
    let root = config.root.as_path();
    check_root(root)?;

    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            if e.depth() == 0 {
                return true;
            }
            let excluded = config.is_excluded(&e.path().to_string_lossy());
            if excluded {
                trace!(path = %e.path().display(), "Excluded");
            }
            !excluded
        });

    let mut files = Vec::new();
    for entry in walker {
        let entry = entry.map_err(|e| DiscoveryError::Walk {
            path: e
                .path()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| root.to_path_buf()),
            reason: e.to_string(),
        })?;

        if !entry.file_type().is_file() {
            continue;
        }

        if entry
            .file_name()
            .to_string_lossy()
            .ends_with(config.suffix.as_str())
        {
            files.push(entry.into_path());
        }
    }

    debug!(root = %root.display(), count = files.len(), "Discovery finished");
    Ok(files)
}

fn check_root(root: &Path) -> DiscoveryResult<()> {
    match std::fs::metadata(root) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(DiscoveryError::NotADirectory {
            path: root.to_path_buf(),
        }),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Err(DiscoveryError::NotFound {
            path: root.to_path_buf(),
        }),
        Err(e) => Err(DiscoveryError::Walk {
            path: root.to_path_buf(),
            reason: e.to_string(),
        }),
    }
}
