//! Filesystem helpers with operation + path context on errors.

use std::path::Path;

use crate::{Error, Result};

/// Like [`ensure_dir_all`], but a failure is reported under the caller's
/// `op` label, e.g. "creating stills directory".
pub async fn ensure_dir_all_with_op(op: &'static str, path: &Path) -> Result<()> {
    tokio::fs::create_dir_all(path)
        .await
        .map_err(|e| Error::io_path(op, path, e))
}

/// Ensure a directory exists, creating it (recursively) if needed.
pub async fn ensure_dir_all(path: &Path) -> Result<()> {
    ensure_dir_all_with_op("creating directory", path).await
}

/// Copy `from` to `to`, creating the parent directory of `to` first.
pub async fn copy_file(from: &Path, to: &Path) -> Result<u64> {
    if let Some(parent) = to.parent() {
        ensure_dir_all_with_op("creating directory", parent).await?;
    }
    tokio::fs::copy(from, to)
        .await
        .map_err(|e| Error::io_path("copying", from, e))
}

/// Size of a file in bytes.
pub async fn file_size(path: &Path) -> Result<u64> {
    tokio::fs::metadata(path)
        .await
        .map(|m| m.len())
        .map_err(|e| Error::io_path("reading metadata of", path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_copy_file_creates_parent() {
        let temp = TempDir::new().unwrap();
        let from = temp.path().join("a.png");
        tokio::fs::write(&from, b"1234").await.unwrap();
        let to = temp.path().join("archive/2024/a.png");

        assert_eq!(copy_file(&from, &to).await.unwrap(), 4);
        assert_eq!(file_size(&to).await.unwrap(), 4);
    }

    #[tokio::test]
    async fn test_file_size_missing_has_context() {
        let temp = TempDir::new().unwrap();
        let err = file_size(&temp.path().join("gone.png")).await.unwrap_err();
        assert!(err.to_string().contains("gone.png"));
    }

    #[tokio::test]
    async fn test_ensure_dir_failure_carries_op_label() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("taken");
        tokio::fs::write(&file, b"").await.unwrap();

        let err = ensure_dir_all_with_op("creating stills directory", &file.join("sub"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::IoPath { op: "creating stills directory", .. }));
    }
}
