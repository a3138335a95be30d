//! Configuration management for reportcheck
//!
//! Settings are layered with figment (see [`core::ReportCheckConfig`]) and
//! extracted into the typed [`Settings`] structure below.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::errors::DriverError;

pub mod core;
pub mod smart_load;

pub use self::core::ReportCheckConfig;

/// Effective settings for one check run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Directory searched for report definitions
    pub source_root: PathBuf,

    /// Directory compiled artifacts are written to
    pub output_root: PathBuf,

    /// File name suffix of report definitions
    pub source_suffix: String,

    /// File name suffix of compiled artifacts
    pub artifact_suffix: String,

    /// Follow symbolic links while walking the source tree
    pub follow_links: bool,

    /// Glob patterns (relative to the source root) to leave out
    pub exclude: Vec<String>,

    /// External compiler invocation
    pub compiler: CompilerConfig,
}

/// How the external report compiler is invoked
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    /// Program to run for every source file
    pub program: String,

    /// Arguments; `{source}` and `{destination}` are substituted
    pub args: Vec<String>,

    /// Working directory of the compiler process
    #[serde(skip_serializing_if = "Option::is_none")]
    pub working_dir: Option<PathBuf>,

    /// Kill the compiler after this many seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    /// Append the entries of the current CLASSPATH
    pub inherit_classpath: bool,

    /// Explicit classpath entries
    pub classpath: Vec<PathBuf>,

    /// Directories whose `*.jar` files are added to the classpath
    pub classpath_dirs: Vec<PathBuf>,

    /// Environment variable the assembled classpath is exported as
    pub classpath_env: String,

    /// Property that additionally receives the assembled classpath
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classpath_property: Option<String>,

    /// Prefix for properties on the command line
    pub property_flag: String,

    /// Properties passed as `{property_flag}key=value`
    pub properties: BTreeMap<String, String>,

    /// Extra environment variables for the compiler process
    pub env: BTreeMap<String, String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            source_root: PathBuf::from("templates"),
            output_root: PathBuf::from("target").join("compiled"),
            source_suffix: ".jrxml".to_string(),
            artifact_suffix: ".jasper".to_string(),
            follow_links: false,
            exclude: vec![],
            compiler: CompilerConfig::default(),
        }
    }
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            program: String::new(),
            args: vec![],
            working_dir: None,
            timeout_secs: None,
            inherit_classpath: true,
            classpath: vec![],
            classpath_dirs: vec![],
            classpath_env: "CLASSPATH".to_string(),
            classpath_property: None,
            property_flag: "-D".to_string(),
            properties: BTreeMap::new(),
            env: BTreeMap::new(),
        }
    }
}

impl Settings {
    /// Validate settings before a run
    pub fn validate(&self) -> Result<(), DriverError> {
        if self.source_suffix.is_empty() {
            return Err(DriverError::Config("source_suffix cannot be empty".into()));
        }
        if self.artifact_suffix.is_empty() {
            return Err(DriverError::Config("artifact_suffix cannot be empty".into()));
        }
        if self.source_suffix == self.artifact_suffix {
            return Err(DriverError::Config(format!(
                "source_suffix and artifact_suffix are both '{}'",
                self.source_suffix
            )));
        }
        if self.compiler.program.trim().is_empty() {
            return Err(DriverError::Config(
                "compiler.program is not set (add it to reportcheck.toml or set REPORTCHECK_COMPILER__PROGRAM)"
                    .into(),
            ));
        }
        if self.compiler.timeout_secs == Some(0) {
            return Err(DriverError::Config("compiler.timeout_secs cannot be 0".into()));
        }
        if self.compiler.classpath_env.is_empty() {
            return Err(DriverError::Config("compiler.classpath_env cannot be empty".into()));
        }
        for pattern in &self.exclude {
            globset::Glob::new(pattern).map_err(|e| {
                DriverError::Config(format!("invalid exclude pattern '{pattern}': {e}"))
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn runnable() -> Settings {
        let mut settings = Settings::default();
        settings.compiler.program = "java".to_string();
        settings
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.source_root, PathBuf::from("templates"));
        assert_eq!(settings.output_root, PathBuf::from("target/compiled"));
        assert_eq!(settings.source_suffix, ".jrxml");
        assert_eq!(settings.artifact_suffix, ".jasper");
        assert!(settings.compiler.inherit_classpath);
    }

    #[test]
    fn test_validate_requires_program() {
        let err = Settings::default().validate().unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("compiler.program"));

        assert!(runnable().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut settings = runnable();
        settings.artifact_suffix = ".jrxml".to_string();
        assert!(settings.validate().is_err());

        let mut settings = runnable();
        settings.compiler.timeout_secs = Some(0);
        assert!(settings.validate().is_err());

        let mut settings = runnable();
        settings.exclude = vec!["drafts/[".to_string()];
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("drafts/["));
    }
}
