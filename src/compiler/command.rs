use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;

use super::{Classpath, CompileError, Compiler, CompilerDiagnostic};
use crate::config::CompilerConfig;
use crate::errors::DriverError;

const SOURCE_PLACEHOLDER: &str = "{source}";
const DESTINATION_PLACEHOLDER: &str = "{destination}";

/// Compiler backed by an external program, one process per file
#[derive(Debug, Clone)]
pub struct CommandCompiler {
    program: String,
    args: Vec<String>,
    property_args: Vec<String>,
    env: Vec<(String, OsString)>,
    working_dir: Option<PathBuf>,
    timeout: Option<Duration>,
}

impl CommandCompiler {
    /// Build the invocation from configuration, assembling the classpath
    /// from the current environment.
    pub fn new(config: &CompilerConfig) -> Result<Self, DriverError> {
        let classpath = Classpath::assemble(config)?;
        Self::with_classpath(config, &classpath)
    }

    pub fn with_classpath(config: &CompilerConfig, classpath: &Classpath) -> Result<Self, DriverError> {
        let program = config.program.trim().to_string();
        if program.is_empty() {
            return Err(DriverError::Config("compiler.program is not set".into()));
        }

        let mut env: Vec<(String, OsString)> = config
            .env
            .iter()
            .map(|(key, value)| (key.clone(), OsString::from(value)))
            .collect();

        let mut property_args: Vec<String> = Vec::new();

        if !classpath.is_empty() {
            let joined = classpath.join()?;
            if let Some(property) = &config.classpath_property {
                property_args.push(format!(
                    "{}{}={}",
                    config.property_flag,
                    property,
                    joined.to_string_lossy()
                ));
            }
            env.push((config.classpath_env.clone(), joined));
        }

        property_args.extend(
            config
                .properties
                .iter()
                .map(|(key, value)| format!("{}{}={}", config.property_flag, key, value)),
        );

        Ok(Self {
            program,
            args: config.args.clone(),
            property_args,
            env,
            working_dir: config.working_dir.clone(),
            timeout: config.timeout_secs.map(Duration::from_secs),
        })
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Locate the program on PATH
    pub fn probe(&self) -> Option<PathBuf> {
        which::which(&self.program).ok()
    }

    /// Full argument list for one file
    pub fn arguments(&self, source: &Path, destination: &Path) -> Vec<OsString> {
        let mut arguments: Vec<OsString> = self.property_args.iter().map(OsString::from).collect();

        let mut substituted = false;
        for arg in &self.args {
            if arg == SOURCE_PLACEHOLDER {
                arguments.push(source.as_os_str().to_owned());
                substituted = true;
            } else if arg == DESTINATION_PLACEHOLDER {
                arguments.push(destination.as_os_str().to_owned());
                substituted = true;
            } else if arg.contains(SOURCE_PLACEHOLDER) || arg.contains(DESTINATION_PLACEHOLDER) {
                let expanded = arg
                    .replace(SOURCE_PLACEHOLDER, &source.to_string_lossy())
                    .replace(DESTINATION_PLACEHOLDER, &destination.to_string_lossy());
                arguments.push(OsString::from(expanded));
                substituted = true;
            } else {
                arguments.push(OsString::from(arg));
            }
        }

        if !substituted {
            arguments.push(source.as_os_str().to_owned());
            arguments.push(destination.as_os_str().to_owned());
        }

        arguments
    }

    fn command(&self, source: &Path, destination: &Path) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(self.arguments(source, destination))
            .envs(self.env.iter().map(|(key, value)| (key, value)))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &self.working_dir {
            command.current_dir(dir);
        }
        command
    }
}

impl Compiler for CommandCompiler {
    async fn compile(&self, source: &Path, destination: &Path) -> Result<(), CompileError> {
        let mut command = self.command(source, destination);
        tracing::debug!("Running {} for {}", self.program, source.display());

        let result = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, command.output()).await {
                Ok(result) => result,
                Err(_) => {
                    return Err(CompileError::TimedOut {
                        program: self.program.clone(),
                        seconds: limit.as_secs(),
                    });
                }
            },
            None => command.output().await,
        };

        let output = result.map_err(|source| CompileError::Spawn {
            program: self.program.clone(),
            source,
        })?;

        if output.status.success() {
            if !output.stdout.is_empty() {
                tracing::trace!("{}", String::from_utf8_lossy(&output.stdout).trim_end());
            }
            return Ok(());
        }

        Err(CompileError::Exited {
            program: self.program.clone(),
            status: output.status,
            diagnostic: CompilerDiagnostic::from_output(&output.stderr, &output.stdout),
        })
    }
}
