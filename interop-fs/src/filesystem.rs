//! Filesystem trait with real and in-memory implementations.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use thiserror::Error;

/// Errors from filesystem operations.
#[derive(Debug, Error)]
pub enum FsError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("path error: {0}")]
    Path(String),
}

/// Trait for filesystem operations.
/// Abstracted for testing with mock implementations.
pub trait Filesystem: Send + Sync {
    /// Write data atomically to a path (write to temp, then rename).
    fn write_atomic(&self, path: &Path, data: &[u8]) -> Result<(), FsError>;

    /// Read file contents as a string.
    fn read_file(&self, path: &Path) -> Result<String, FsError>;

    /// Check if a path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Create directory and parents if needed.
    fn create_dir_all(&self, path: &Path) -> Result<(), FsError>;
}

/// Real filesystem implementation.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealFilesystem;

impl Filesystem for RealFilesystem {
    fn write_atomic(&self, path: &Path, data: &[u8]) -> Result<(), FsError> {
        let file_name = path
            .file_name()
            .ok_or_else(|| FsError::Path(format!("no file name in {}", path.display())))?;
        let mut temp_name = file_name.to_os_string();
        temp_name.push(".tmp");
        let temp_path = path.with_file_name(temp_name);

        fs::write(&temp_path, data)?;
        // Rename is atomic on the same filesystem
        fs::rename(&temp_path, path)?;

        Ok(())
    }

    fn read_file(&self, path: &Path) -> Result<String, FsError> {
        Ok(fs::read_to_string(path)?)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn create_dir_all(&self, path: &Path) -> Result<(), FsError> {
        fs::create_dir_all(path)?;
        Ok(())
    }
}

/// In-memory filesystem for testing.
/// Cloning creates a new handle to the same underlying data.
#[derive(Debug, Clone, Default)]
pub struct MockFilesystem {
    files: Arc<RwLock<HashMap<PathBuf, Vec<u8>>>>,
    dirs: Arc<RwLock<HashSet<PathBuf>>>,
}

impl MockFilesystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Paths of all files written so far, sorted.
    pub fn paths(&self) -> Vec<PathBuf> {
        let files = self.files.read().unwrap_or_else(PoisonError::into_inner);
        let mut paths: Vec<PathBuf> = files.keys().cloned().collect();
        paths.sort();
        paths
    }

    /// Get content of a specific file.
    pub fn get_file(&self, path: &Path) -> Option<Vec<u8>> {
        self.files
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(path)
            .cloned()
    }

    /// Add a file directly (for test setup).
    pub fn add_file(&self, path: impl Into<PathBuf>, data: impl Into<Vec<u8>>) {
        self.files
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path.into(), data.into());
    }

    /// Whether `create_dir_all` was called for `path`.
    pub fn has_dir(&self, path: &Path) -> bool {
        self.dirs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(path)
    }
}

impl Filesystem for MockFilesystem {
    fn write_atomic(&self, path: &Path, data: &[u8]) -> Result<(), FsError> {
        self.add_file(path, data);
        Ok(())
    }

    fn read_file(&self, path: &Path) -> Result<String, FsError> {
        match self.get_file(path) {
            Some(data) => {
                String::from_utf8(data).map_err(|e| FsError::Path(format!("invalid utf8: {}", e)))
            }
            None => Err(FsError::Io(io::Error::new(
                io::ErrorKind::NotFound,
                format!("file not found: {}", path.display()),
            ))),
        }
    }

    fn exists(&self, path: &Path) -> bool {
        self.get_file(path).is_some() || self.has_dir(path)
    }

    fn create_dir_all(&self, path: &Path) -> Result<(), FsError> {
        self.dirs
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path.to_path_buf());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    // ===========================================
    // RealFilesystem
    // ===========================================

    #[test]
    fn test_real_write_atomic_and_read() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("report.json");

        RealFilesystem.write_atomic(&path, b"{\"ok\":true}").unwrap();

        assert_eq!(RealFilesystem.read_file(&path).unwrap(), "{\"ok\":true}");
        assert!(!dir.path().join("report.json.tmp").exists());
    }

    #[test]
    fn test_real_write_atomic_overwrites() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("report.json");

        RealFilesystem.write_atomic(&path, b"first").unwrap();
        RealFilesystem.write_atomic(&path, b"second").unwrap();

        assert_eq!(RealFilesystem.read_file(&path).unwrap(), "second");
    }

    #[test]
    fn test_real_create_dir_all_and_exists() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        assert!(!RealFilesystem.exists(&nested));

        RealFilesystem.create_dir_all(&nested).unwrap();

        assert!(RealFilesystem.exists(&nested));
    }

    #[test]
    fn test_real_read_missing_file() {
        let dir = tempdir().unwrap();
        let result = RealFilesystem.read_file(&dir.path().join("missing.json"));
        assert!(matches!(result, Err(FsError::Io(_))));
    }

    #[test]
    fn test_real_write_atomic_rejects_root() {
        let result = RealFilesystem.write_atomic(Path::new("/"), b"x");
        assert!(matches!(result, Err(FsError::Path(_))));
    }

    // ===========================================
    // MockFilesystem
    // ===========================================

    #[test]
    fn test_mock_write_and_read() {
        let fs = MockFilesystem::new();
        let path = Path::new("/out/report.json");

        fs.write_atomic(path, b"data").unwrap();

        assert_eq!(fs.read_file(path).unwrap(), "data");
        assert!(fs.exists(path));
        assert_eq!(fs.paths(), vec![PathBuf::from("/out/report.json")]);
    }

    #[test]
    fn test_mock_read_missing() {
        let fs = MockFilesystem::new();
        assert!(fs.read_file(Path::new("/missing")).is_err());
    }

    #[test]
    fn test_mock_read_invalid_utf8() {
        let fs = MockFilesystem::new();
        fs.add_file("/bad", vec![0xff, 0xfe]);
        assert!(matches!(
            fs.read_file(Path::new("/bad")),
            Err(FsError::Path(_))
        ));
    }

    #[test]
    fn test_mock_dirs() {
        let fs = MockFilesystem::new();
        let dir = Path::new("/out");
        assert!(!fs.exists(dir));

        fs.create_dir_all(dir).unwrap();

        assert!(fs.has_dir(dir));
        assert!(fs.exists(dir));
    }

    #[test]
    fn test_mock_clone_shares_state() {
        let fs = MockFilesystem::new();
        let clone = fs.clone();
        clone.add_file("/shared", "x");
        assert!(fs.exists(Path::new("/shared")));
    }
}
