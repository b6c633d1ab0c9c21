//! Atomic write primitives
//!
//! Fixtures are replaced through a temp file in the target directory followed
//! by a rename, so a concurrent reader sees either the old or the new content.

use std::fs;
use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::debug;

use crate::{Error, Result};

/// Atomically write bytes to a file, creating parent directories as needed.
pub fn atomic_write(target_path: &Path, content: &[u8]) -> Result<()> {
    let parent = match target_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    fs::create_dir_all(parent).map_err(|e| Error::write(target_path, e))?;

    let mut temp = NamedTempFile::new_in(parent).map_err(|e| Error::write(target_path, e))?;
    temp.write_all(content)
        .and_then(|_| temp.flush())
        .map_err(|e| Error::write(target_path, e))?;
    temp.persist(target_path)
        .map_err(|e| Error::write(target_path, e.error))?;

    debug!("Wrote {} bytes to {}", content.len(), target_path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_atomic_write() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("test.golden");

        atomic_write(&target, b"hello").unwrap();

        let content = fs::read(&target).unwrap();
        assert_eq!(content, b"hello");
    }

    #[test]
    fn test_atomic_write_creates_parent() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("example.com").join("a").join("q=1.http");

        atomic_write(&target, b"nested").unwrap();

        let content = fs::read(&target).unwrap();
        assert_eq!(content, b"nested");
    }

    #[test]
    fn test_atomic_write_replaces_content() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("test.golden");

        atomic_write(&target, b"first version, longer").unwrap();
        atomic_write(&target, b"second").unwrap();

        assert_eq!(fs::read(&target).unwrap(), b"second");
    }

    #[test]
    fn test_no_temp_files_after_write() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("test.golden");

        atomic_write(&target, b"clean").unwrap();

        let entries: Vec<_> = fs::read_dir(temp_dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name())
            .collect();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0], "test.golden");
    }

    #[test]
    fn test_write_error_carries_path() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("file");
        fs::write(&blocker, b"not a directory").unwrap();

        let target = blocker.join("child.golden");
        let err = atomic_write(&target, b"x").unwrap_err();

        assert!(matches!(err, Error::FixtureWrite { .. }));
        assert!(err.to_string().contains("child.golden"));
    }
}
