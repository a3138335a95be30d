use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

use crate::config::CompilerConfig;
use crate::errors::DriverError;

/// Ordered, de-duplicated classpath handed to the report compiler
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classpath {
    entries: Vec<PathBuf>,
}

impl Classpath {
    /// Assemble from configuration and the current process environment
    pub fn assemble(config: &CompilerConfig) -> Result<Self, DriverError> {
        let inherited = if config.inherit_classpath {
            std::env::var_os(&config.classpath_env)
        } else {
            None
        };
        Self::assemble_with(config, inherited.as_deref())
    }

    /// Explicit entries first, then the inherited classpath, then jars found
    /// in `classpath_dirs`.
    pub fn assemble_with(config: &CompilerConfig, inherited: Option<&OsStr>) -> Result<Self, DriverError> {
        let mut classpath = Classpath::default();

        for entry in &config.classpath {
            classpath.push(entry);
        }

        if let Some(inherited) = inherited {
            for entry in std::env::split_paths(inherited) {
                classpath.push(entry);
            }
        }

        for dir in &config.classpath_dirs {
            for jar in jars_in(dir)? {
                classpath.push(jar);
            }
        }

        tracing::debug!("Compiler classpath entries: {}", classpath.entries.len());
        for entry in &classpath.entries {
            tracing::debug!("  - {}", entry.display());
        }

        Ok(classpath)
    }

    /// Add an entry unless it is empty or already present
    pub fn push(&mut self, entry: impl Into<PathBuf>) -> bool {
        let entry = entry.into();
        if entry.as_os_str().is_empty() || self.entries.contains(&entry) {
            return false;
        }
        self.entries.push(entry);
        true
    }

    pub fn entries(&self) -> &[PathBuf] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Join with the platform path separator
    pub fn join(&self) -> Result<OsString, DriverError> {
        std::env::join_paths(&self.entries)
            .map_err(|e| DriverError::Config(format!("classpath entry cannot be joined: {e}")))
    }
}

fn jars_in(dir: &Path) -> Result<Vec<PathBuf>, DriverError> {
    if !dir.is_dir() {
        return Err(DriverError::Config(format!(
            "classpath directory not found: {}",
            dir.display()
        )));
    }

    let mut jars = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(|e| DriverError::io(dir, e))? {
        let path = entry.map_err(|e| DriverError::io(dir, e))?.path();
        let is_jar = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("jar"));
        if is_jar && path.is_file() {
            jars.push(path);
        }
    }
    jars.sort();
    Ok(jars)
}
