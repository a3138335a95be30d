use std::path::{Path, PathBuf};

use super::discovery::SourceFile;
use crate::errors::DriverError;

/// Maps source files to artifact paths under the output root
#[derive(Debug, Clone)]
pub struct OutputLayout {
    output_root: PathBuf,
    source_suffix: String,
    artifact_suffix: String,
}

impl OutputLayout {
    pub fn new(
        output_root: impl Into<PathBuf>,
        source_suffix: impl Into<String>,
        artifact_suffix: impl Into<String>,
    ) -> Self {
        Self {
            output_root: output_root.into(),
            source_suffix: source_suffix.into(),
            artifact_suffix: artifact_suffix.into(),
        }
    }

    /// Same relative directory, trailing source suffix swapped for the
    /// artifact suffix.
    pub fn artifact_path(&self, source: &SourceFile) -> PathBuf {
        let file_name = source
            .relative
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let stem = file_name.strip_suffix(&self.source_suffix).unwrap_or(&file_name);
        let artifact_name = format!("{stem}{}", self.artifact_suffix);

        match source.relative.parent() {
            Some(parent) => self.output_root.join(parent).join(artifact_name),
            None => self.output_root.join(artifact_name),
        }
    }

    /// Create the output root
    pub fn prepare_root(&self) -> Result<(), DriverError> {
        std::fs::create_dir_all(&self.output_root).map_err(|e| DriverError::io(&self.output_root, e))
    }

    /// Create the directory `artifact` will be written to
    pub fn prepare(&self, artifact: &Path) -> Result<(), DriverError> {
        match artifact.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => {
                std::fs::create_dir_all(dir).map_err(|e| DriverError::io(dir, e))
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn source(relative: &str) -> SourceFile {
        SourceFile {
            path: Path::new("templates").join(relative),
            relative: PathBuf::from(relative),
        }
    }

    fn layout() -> OutputLayout {
        OutputLayout::new("target/compiled", ".src", ".out")
    }

    #[test]
    fn test_mirrors_directory_structure() {
        let layout = layout();
        assert_eq!(
            layout.artifact_path(&source("a/x.src")),
            Path::new("target/compiled").join("a").join("x.out")
        );
        assert_eq!(
            layout.artifact_path(&source("a/b/y.src")),
            Path::new("target/compiled").join("a").join("b").join("y.out")
        );
        assert_eq!(
            layout.artifact_path(&source("top.src")),
            Path::new("target/compiled").join("top.out")
        );
    }

    #[test]
    fn test_only_trailing_suffix_replaced() {
        let layout = layout();
        assert_eq!(
            layout.artifact_path(&source("x.src.backup.src")),
            Path::new("target/compiled").join("x.src.backup.out")
        );
        assert_eq!(
            layout.artifact_path(&source("dir.src/inner.src")),
            Path::new("target/compiled").join("dir.src").join("inner.out")
        );
    }

    #[test]
    fn test_prepare_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let layout = OutputLayout::new(temp_dir.path().join("out"), ".src", ".out");
        let artifact = layout.artifact_path(&source("a/b/y.src"));

        layout.prepare_root().unwrap();
        layout.prepare(&artifact).unwrap();
        layout.prepare(&artifact).unwrap();

        assert!(temp_dir.path().join("out").join("a").join("b").is_dir());
    }
}
