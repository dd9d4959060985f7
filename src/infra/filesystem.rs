//! Filesystem operations
//!
//! Handles file and directory operations.

use std::path::Path;

use walkdir::WalkDir;

use crate::error::FilesystemError;

/// Create a directory and all parent directories
pub fn create_dir_all(path: &Path) -> Result<(), FilesystemError> {
    std::fs::create_dir_all(path).map_err(|e| FilesystemError::CreateDir {
        path: path.to_path_buf(),
        error: e.to_string(),
    })
}

/// Remove a directory and all its contents
pub fn remove_dir_all(path: &Path) -> Result<(), FilesystemError> {
    if path.exists() {
        std::fs::remove_dir_all(path).map_err(|e| FilesystemError::RemoveDir {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;
    }
    Ok(())
}

/// Remove a directory if present and recreate it empty
pub fn recreate_dir(path: &Path) -> Result<(), FilesystemError> {
    remove_dir_all(path)?;
    create_dir_all(path)
}

/// Write content to a file
pub fn write_file(path: &Path, content: &str) -> Result<(), FilesystemError> {
    if let Some(parent) = path.parent() {
        create_dir_all(parent)?;
    }
    std::fs::write(path, content).map_err(|e| FilesystemError::WriteFile {
        path: path.to_path_buf(),
        error: e.to_string(),
    })
}

/// Read content from a file
pub fn read_file(path: &Path) -> Result<String, FilesystemError> {
    std::fs::read_to_string(path).map_err(|e| FilesystemError::ReadFile {
        path: path.to_path_buf(),
        error: e.to_string(),
    })
}

/// Copy a single file, creating the destination's parent directories
pub fn copy_file(from: &Path, to: &Path) -> Result<(), FilesystemError> {
    if let Some(parent) = to.parent() {
        create_dir_all(parent)?;
    }
    std::fs::copy(from, to)
        .map(|_| ())
        .map_err(|e| FilesystemError::Copy {
            from: from.to_path_buf(),
            to: to.to_path_buf(),
            error: e.to_string(),
        })
}

/// Recursively copy `from` into `to`, overwriting existing files
///
/// Returns the number of files copied.
pub fn copy_dir_all(from: &Path, to: &Path) -> Result<usize, FilesystemError> {
    let mut copied = 0;
    for entry in WalkDir::new(from) {
        let entry = entry.map_err(|e| FilesystemError::Copy {
            from: from.to_path_buf(),
            to: to.to_path_buf(),
            error: e.to_string(),
        })?;
        let relative = entry.path().strip_prefix(from).unwrap_or(entry.path());
        let target = to.join(relative);

        if entry.file_type().is_dir() {
            create_dir_all(&target)?;
        } else {
            copy_file(entry.path(), &target)?;
            copied += 1;
        }
    }
    Ok(copied)
}

/// Recursively collect files under `dir` whose name ends with `suffix`
///
/// Paths are returned sorted.
pub fn find_files(dir: &Path, suffix: &str) -> Vec<std::path::PathBuf> {
    let mut files: Vec<_> = WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            entry
                .file_name()
                .to_str()
                .is_some_and(|name| name.ends_with(suffix))
        })
        .map(walkdir::DirEntry::into_path)
        .collect();
    files.sort();
    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_recreate_dir_empties_directory() {
        let temp_dir = TempDir::new().unwrap();
        let dist = temp_dir.path().join("dist");
        write_file(&dist.join("old.js"), "stale").unwrap();

        recreate_dir(&dist).unwrap();

        assert!(dist.is_dir());
        assert_eq!(std::fs::read_dir(&dist).unwrap().count(), 0);
    }

    #[test]
    fn test_copy_dir_all_copies_nested_files() {
        let temp_dir = TempDir::new().unwrap();
        let src = temp_dir.path().join("fonts");
        write_file(&src.join("a.woff2"), "a").unwrap();
        write_file(&src.join("sub/b.woff2"), "b").unwrap();

        let dest = temp_dir.path().join("out/fonts");
        let copied = copy_dir_all(&src, &dest).unwrap();

        assert_eq!(copied, 2);
        assert_eq!(read_file(&dest.join("sub/b.woff2")).unwrap(), "b");
    }

    #[test]
    fn test_find_files_by_suffix() {
        let temp_dir = TempDir::new().unwrap();
        write_file(&temp_dir.path().join("src/b.d.ts"), "").unwrap();
        write_file(&temp_dir.path().join("src/nested/a.d.ts"), "").unwrap();
        write_file(&temp_dir.path().join("src/index.js"), "").unwrap();

        let found = find_files(&temp_dir.path().join("src"), ".d.ts");
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|p| p.to_string_lossy().ends_with(".d.ts")));
    }

    #[test]
    fn test_remove_missing_dir_is_ok() {
        let temp_dir = TempDir::new().unwrap();
        assert!(remove_dir_all(&temp_dir.path().join("missing")).is_ok());
    }
}
