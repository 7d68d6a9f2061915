use crate::{domain::FileStorage, errors::StorageError};
use async_trait::async_trait;
use rand::Rng;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Length of generated scratch file stems.
pub const FILENAME_LEN: usize = 10;

const FILENAME_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Random alphanumeric file stem. Uniqueness is not enforced.
pub fn random_filename() -> String {
    let mut rng = rand::rng();
    (0..FILENAME_LEN)
        .map(|_| FILENAME_CHARSET[rng.random_range(0..FILENAME_CHARSET.len())] as char)
        .collect()
}

/// Scratch directory on local disk. No TTL, no locking: last writer wins.
#[derive(Debug, Clone)]
pub struct LocalFileStorage {
    root: PathBuf,
}

impl LocalFileStorage {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Creates the scratch directory if it is missing.
    pub fn ensure_root(&self) -> Result<(), StorageError> {
        if !self.root.is_dir() {
            std::fs::create_dir_all(&self.root)?;
            tracing::info!(scratch_dir = %self.root.display(), "Created scratch directory");
        }
        Ok(())
    }

    // Only bare file names are served; anything that could leave the root is rejected.
    fn resolve(&self, filename: &str) -> Result<PathBuf, StorageError> {
        let valid = !filename.is_empty()
            && filename != "."
            && filename != ".."
            && !filename.contains(['/', '\\'])
            && !filename.contains('\0');
        if !valid {
            return Err(StorageError::InvalidName(filename.to_string()));
        }
        Ok(self.root.join(filename))
    }
}

#[async_trait]
impl FileStorage for LocalFileStorage {
    async fn write(&self, filename: &str, data: Vec<u8>) -> Result<(), StorageError> {
        let path = self.resolve(filename)?;
        fs::create_dir_all(&self.root).await?;
        let len = data.len();
        fs::write(&path, data).await?;
        tracing::debug!(file = %path.display(), bytes = len, "Scratch: wrote file");
        Ok(())
    }

    async fn read(&self, filename: &str) -> Result<Vec<u8>, StorageError> {
        let path = self.resolve(filename)?;
        match fs::read(&path).await {
            Ok(data) => {
                tracing::debug!(file = %path.display(), bytes = data.len(), "Scratch: read file");
                Ok(data)
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(filename.to_string()))
            }
            Err(err) => Err(StorageError::Io(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn random_filenames_are_ten_alphanumerics() {
        let names: HashSet<String> = (0..200).map(|_| random_filename()).collect();
        assert_eq!(names.len(), 200);
        for name in &names {
            assert_eq!(name.len(), FILENAME_LEN);
            assert!(name.chars().all(|c| c.is_ascii_alphanumeric()), "{name}");
        }
    }

    #[tokio::test]
    async fn write_creates_missing_root_lazily() {
        let tmp = tempfile::tempdir().unwrap();
        let storage = LocalFileStorage::new(tmp.path().join("temp"));
        assert!(!storage.root().exists());

        storage.write("A.jpg", vec![1, 2, 3]).await.unwrap();
        assert_eq!(storage.read("A.jpg").await.unwrap(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn colliding_names_last_write_wins() {
        let tmp = tempfile::tempdir().unwrap();
        let storage = LocalFileStorage::new(tmp.path().to_path_buf());

        storage.write("SAME000000.jpg", b"first".to_vec()).await.unwrap();
        storage.write("SAME000000.jpg", b"second".to_vec()).await.unwrap();
        assert_eq!(storage.read("SAME000000.jpg").await.unwrap(), b"second");
    }

    #[tokio::test]
    async fn missing_file_is_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        let storage = LocalFileStorage::new(tmp.path().to_path_buf());
        let err = storage.read("NOPE.jpg").await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound(name) if name == "NOPE.jpg"));
    }

    #[tokio::test]
    async fn traversal_names_are_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let storage = LocalFileStorage::new(tmp.path().join("temp"));
        for name in ["", "..", "../Cargo.toml", "a/b.jpg", "a\\b.jpg"] {
            let err = storage.read(name).await.unwrap_err();
            assert!(matches!(err, StorageError::InvalidName(_)), "{name:?}");
        }
        assert!(storage.write("../escape.jpg", vec![0]).await.is_err());
        assert!(!tmp.path().join("escape.jpg").exists());
    }

    #[test]
    fn ensure_root_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let storage = LocalFileStorage::new(tmp.path().join("nested/temp"));
        storage.ensure_root().unwrap();
        storage.ensure_root().unwrap();
        assert!(storage.root().is_dir());
    }
}
