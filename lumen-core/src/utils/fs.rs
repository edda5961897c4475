//! Filesystem helpers.

use std::fs;
use std::path::Path;

use crate::error::CoreError;

/// Create `dir` and any missing parents.
///
/// Succeeds if the directory already exists; fails if the path exists but
/// is not a directory.
pub fn ensure_dir_exists(dir: &Path) -> Result<(), CoreError> {
    if dir.exists() {
        if dir.is_dir() {
            return Ok(());
        }
        return Err(CoreError::generic(format!(
            "path {} exists but is not a directory",
            dir.display()
        )));
    }
    fs::create_dir_all(dir)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn creates_nested_directories() {
        let tmp = tempdir().unwrap();
        let target = tmp.path().join("a/b/c");
        ensure_dir_exists(&target).unwrap();
        assert!(target.is_dir());
        // Second call is a no-op.
        ensure_dir_exists(&target).unwrap();
    }

    #[test]
    fn rejects_file_at_target() {
        let tmp = tempdir().unwrap();
        let file = tmp.path().join("occupied");
        std::fs::write(&file, b"x").unwrap();
        assert!(ensure_dir_exists(&file).is_err());
    }
}
