use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort a check run.
///
/// Per-file compiler failures are not in here: they are recorded in the
/// [`RunSummary`](crate::driver::RunSummary) and only surface as
/// [`DriverError::CompileFailures`] once every file has been tried.
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("Source folder not found: {}", .0.display())]
    SourceRootMissing(PathBuf),

    #[error("No {suffix} files found to compile in: {}", .root.display())]
    NoSourceFiles { root: PathBuf, suffix: String },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Cannot read source folder {}: {source}", .root.display())]
    Unreadable {
        root: PathBuf,
        #[source]
        source: ignore::Error,
    },

    #[error("Failed to prepare {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Compile check failed: {failed} of {total} file(s) did not compile")]
    CompileFailures { failed: usize, total: usize },
}

impl DriverError {
    /// Configuration problems are detected before anything is compiled.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            DriverError::SourceRootMissing(_)
                | DriverError::NoSourceFiles { .. }
                | DriverError::Config(_)
                | DriverError::Unreadable { .. }
        )
    }

    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        if self.is_configuration() { 2 } else { 1 }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DriverError::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_errors_exit_with_2() {
        let missing = DriverError::SourceRootMissing(PathBuf::from("templates"));
        assert!(missing.is_configuration());
        assert_eq!(missing.exit_code(), 2);

        let empty = DriverError::NoSourceFiles {
            root: PathBuf::from("templates"),
            suffix: ".jrxml".to_string(),
        };
        assert_eq!(empty.exit_code(), 2);
        assert_eq!(
            empty.to_string(),
            "No .jrxml files found to compile in: templates"
        );
    }

    #[test]
    fn test_compile_failures_exit_with_1() {
        let err = DriverError::CompileFailures { failed: 1, total: 3 };
        assert!(!err.is_configuration());
        assert_eq!(err.exit_code(), 1);
    }
}
