//! Filesystem access for the pipeline
//!
//! All reads and writes of file content go through [`ContentStore`], so the
//! pipeline can run against the real filesystem ([`FsStore`]) or against a
//! store that injects failures in tests.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

/// Permission bits applied to rewritten files
pub const FILE_MODE: u32 = 0o644;

/// Whole-file content access
pub trait ContentStore: Send + Sync {
    /// Read the full content of a file
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Replace the full content of a file
    fn write(&self, path: &Path, content: &[u8]) -> io::Result<()>;
}

/// Real filesystem store
///
/// Writes go to a temporary file in the target's directory which is then
/// renamed over the target, so a failed write leaves the original intact.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsStore;

impl ContentStore for FsStore {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        fs::read(path)
    }

    fn write(&self, path: &Path, content: &[u8]) -> io::Result<()> {
        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };

        let mut tmp = tempfile::Builder::new()
            .prefix(".sitefmt-")
            .tempfile_in(dir)?;
        tmp.write_all(content)?;
        tmp.flush()?;
        set_mode(tmp.path())?;

        tmp.persist(path).map_err(|e| e.error)?;
        Ok(())
    }
}

#[cfg(unix)]
fn set_mode(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(FILE_MODE))
}

#[cfg(not(unix))]
fn set_mode(_path: &Path) -> io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_write_replaces_content() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("page.html");
        fs::write(&path, b"old content that is longer").unwrap();

        FsStore.write(&path, b"new").unwrap();
        assert_eq!(FsStore.read(&path).unwrap(), b"new".to_vec());
    }

    #[test]
    fn test_write_leaves_no_temp_files() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("page.html");
        fs::write(&path, b"a").unwrap();
        FsStore.write(&path, b"b").unwrap();

        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("page.html")]);
    }

    #[cfg(unix)]
    #[test]
    fn test_write_sets_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let path = dir.path().join("page.html");
        fs::write(&path, b"a").unwrap();
        FsStore.write(&path, b"b").unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, FILE_MODE);
    }

    #[test]
    fn test_write_into_missing_directory_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("gone/page.html");
        assert!(FsStore.write(&path, b"x").is_err());
        assert!(!path.exists());
    }
}
