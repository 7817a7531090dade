//! Loading the user's source file

use std::path::{Path, PathBuf};
use thiserror::Error;

/// File extensions accepted as source input
pub const SUPPORTED_EXTENSIONS: &[&str] = &["java", "js", "py", "ts", "tsx", "jsx", "rs"];

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Failed to read {}: {}", .path.display(), .source)]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error(
        "Unsupported file type: {} (expected .{})",
        .path.display(),
        SUPPORTED_EXTENSIONS.join(", .")
    )]
    Unsupported { path: PathBuf },
}

/// A source file decoded as text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Display name (file name without directories)
    pub name: String,
    pub content: String,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    /// Read any file as text. Invalid UTF-8 is replaced rather than rejected.
    pub fn read(path: &Path) -> Result<Self, SourceError> {
        let bytes = std::fs::read(path).map_err(|source| SourceError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());

        Ok(Self {
            name,
            content: String::from_utf8_lossy(&bytes).to_string(),
        })
    }

    /// Read a file only if its extension is one of [`SUPPORTED_EXTENSIONS`]
    pub fn read_supported(path: &Path) -> Result<Self, SourceError> {
        if !is_supported(path) {
            return Err(SourceError::Unsupported {
                path: path.to_path_buf(),
            });
        }
        Self::read(path)
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

/// Check if a path has a supported source extension (case-insensitive)
pub fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|s| s.eq_ignore_ascii_case(ext))
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_is_supported() {
        assert!(is_supported(Path::new("src/App.tsx")));
        assert!(is_supported(Path::new("Main.JAVA")));
        assert!(!is_supported(Path::new("notes.txt")));
        assert!(!is_supported(Path::new("Makefile")));
    }

    #[test]
    fn test_read_keeps_bytes_exact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bug.py");
        std::fs::write(&path, "def f():\r\n    return 1").unwrap();

        let file = SourceFile::read(&path).unwrap();
        assert_eq!(file.name, "bug.py");
        assert_eq!(file.content, "def f():\r\n    return 1");
    }

    #[test]
    fn test_read_lossy_utf8() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"ok\n\xff\n").unwrap();

        let file = SourceFile::read(tmp.path()).unwrap();
        assert_eq!(file.content, "ok\n\u{fffd}\n");
    }

    #[test]
    fn test_read_supported_rejects_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.csv");
        std::fs::write(&path, "a,b\n").unwrap();

        let err = SourceFile::read_supported(&path).unwrap_err();
        assert!(matches!(err, SourceError::Unsupported { .. }));
        assert!(err.to_string().contains(".java"));
    }

    #[test]
    fn test_read_empty_file_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.js");
        std::fs::write(&path, "").unwrap();

        let file = SourceFile::read_supported(&path).unwrap();
        assert!(file.is_empty());
    }

    #[test]
    fn test_read_missing_file() {
        let err = SourceFile::read(Path::new("/definitely/not/here.js")).unwrap_err();
        assert!(matches!(err, SourceError::Read { .. }));
    }
}
