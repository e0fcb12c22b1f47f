//! File discovery with glob patterns.
//!
//! Patterns are shell-style globs relative to a root directory. Brace
//! alternatives (`*.{mp4,mkv}`) are expanded before matching since the
//! `glob` crate does not support them.

use std::path::{Path, PathBuf};

use itertools::Itertools;

use crate::{Error, Result};

/// Expand every `{a,b,...}` group in `pattern`.
///
/// Groups do not nest. An unmatched `{` is kept literally.
pub fn expand_braces(pattern: &str) -> Vec<String> {
    let Some(open) = pattern.find('{') else {
        return vec![pattern.to_string()];
    };
    let Some(close) = pattern[open..].find('}').map(|i| open + i) else {
        return vec![pattern.to_string()];
    };

    let prefix = &pattern[..open];
    let suffix = &pattern[close + 1..];

    pattern[open + 1..close]
        .split(',')
        .flat_map(|alt| expand_braces(&format!("{prefix}{alt}{suffix}")))
        .collect()
}

/// Files under `root` matching `pattern`, sorted and deduplicated.
pub fn find_files(root: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let root = glob::Pattern::escape(&root.to_string_lossy());
    let mut files = Vec::new();

    for expanded in expand_braces(pattern) {
        let full = format!("{}/{}", root.trim_end_matches('/'), expanded);
        for entry in glob::glob(&full)? {
            let path = entry.map_err(|e| {
                let path = e.path().to_path_buf();
                Error::io_path("reading", path, e.into_error())
            })?;
            if path.is_file() {
                files.push(path);
            }
        }
    }

    Ok(files.into_iter().sorted().dedup().collect())
}

/// [`find_files`] on the blocking thread pool.
pub async fn find_files_blocking(root: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let root = root.to_path_buf();
    let pattern = pattern.to_string();
    tokio::task::spawn_blocking(move || find_files(&root, &pattern))
        .await
        .map_err(|e| Error::Other(format!("File search task failed: {e}")))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_expand_braces() {
        assert_eq!(expand_braces("*.mp4"), vec!["*.mp4"]);
        assert_eq!(
            expand_braces("**/*.{mp4,avi,mkv}"),
            vec!["**/*.mp4", "**/*.avi", "**/*.mkv"]
        );
        assert_eq!(
            expand_braces("{a,b}/{c,d}"),
            vec!["a/c", "a/d", "b/c", "b/d"]
        );
        assert_eq!(expand_braces("odd{brace"), vec!["odd{brace"]);
    }

    #[test]
    fn test_find_files() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("season 1")).unwrap();
        std::fs::write(temp.path().join("a.mp4"), b"").unwrap();
        std::fs::write(temp.path().join("season 1/b.mkv"), b"").unwrap();
        std::fs::write(temp.path().join("notes.txt"), b"").unwrap();

        let files = find_files(temp.path(), "**/*.{mp4,mkv}").unwrap();
        assert_eq!(
            files,
            vec![
                temp.path().join("a.mp4"),
                temp.path().join("season 1/b.mkv")
            ]
        );
    }

    #[test]
    fn test_invalid_pattern() {
        let temp = TempDir::new().unwrap();
        let err = find_files(temp.path(), "***").unwrap_err();
        assert!(matches!(err, Error::Pattern(_)));
    }
}
