//! Batch compile driver
//!
//! A run goes through three stages:
//!
//! ```text
//! Discovering ──▶ Compiling (one file at a time) ──▶ Reporting
//! ```
//!
//! Discovery and output-root problems abort the run before anything is
//! compiled. A compiler failure only fails its own file: it is recorded with
//! its root-cause message and the remaining files are still compiled. The
//! run fails at the end if anything failed.

use std::path::PathBuf;
use std::time::Instant;

use crate::cli::Output;
use crate::compiler::{Compiler, diagnostic_chain, root_cause_message};
use crate::config::Settings;
use crate::errors::DriverError;

pub mod discovery;
pub mod layout;
pub mod summary;

pub use discovery::{SourceDiscovery, SourceFile};
pub use layout::OutputLayout;
pub use summary::{CompileResult, Outcome, RunSummary, SummaryReport};

/// Compiles every source file under a root with one [`Compiler`]
pub struct Driver<C> {
    compiler: C,
    source_root: PathBuf,
    discovery: SourceDiscovery,
    layout: OutputLayout,
    output: Output,
}

impl<C: Compiler> Driver<C> {
    pub fn new(settings: &Settings, compiler: C, output: Output) -> Result<Self, DriverError> {
        Ok(Self {
            compiler,
            source_root: settings.source_root.clone(),
            discovery: SourceDiscovery::from_settings(settings)?,
            layout: OutputLayout::new(
                settings.output_root.clone(),
                settings.source_suffix.clone(),
                settings.artifact_suffix.clone(),
            ),
            output,
        })
    }

    /// Discover and compile everything; failures are in the summary.
    pub async fn run(&self) -> Result<RunSummary, DriverError> {
        let sources = self.discovery.discover(&self.source_root)?;
        self.layout.prepare_root()?;
        self.compile_all(&sources).await
    }

    /// Compile `sources` in order, one result per source
    pub async fn compile_all(&self, sources: &[SourceFile]) -> Result<RunSummary, DriverError> {
        let start_time = Instant::now();
        let mut summary = RunSummary::default();

        for source in sources {
            let result = self.compile_one(source).await?;
            summary.push(result);
        }

        summary.set_duration_ms(start_time.elapsed().as_millis() as u64);
        tracing::info!(
            "Compiled {} of {} file(s) in {}ms",
            summary.success_count(),
            summary.len(),
            summary.duration_ms()
        );
        Ok(summary)
    }

    async fn compile_one(&self, source: &SourceFile) -> Result<CompileResult, DriverError> {
        let artifact = self.layout.artifact_path(source);
        self.layout.prepare(&artifact)?;

        tracing::debug!("Compiling {} -> {}", source.path.display(), artifact.display());
        match self.compiler.compile(&source.path, &artifact).await {
            Ok(()) => {
                self.output.success(&format!("OK   {}", source.path.display()));
                Ok(CompileResult::success(&source.path, artifact))
            }
            Err(err) => {
                let message = root_cause_message(&err);
                tracing::debug!("{} failed: {}", source.path.display(), message);

                self.output.error(&format!("FAIL {}", source.path.display()));
                self.output.diagnostic(&diagnostic_chain(&err));
                if let Some(compiler_output) = err.compiler_output() {
                    self.output.diagnostic(compiler_output);
                }
                Ok(CompileResult::failure(&source.path, message))
            }
        }
    }

    /// Print the outcome of a run; any failure fails the run.
    pub fn report(&self, summary: &RunSummary) -> Result<(), DriverError> {
        let failed = summary.failure_count();
        if failed > 0 {
            self.output.blank_error_line();
            self.output.error(&format!(
                "Failed to compile {} {} file(s):",
                failed,
                self.discovery.suffix()
            ));
            for failure in summary.failures() {
                self.output.error_item(&format!(
                    "{} -> {}",
                    failure.source.display(),
                    failure.failure_message().unwrap_or_default()
                ));
            }
            return Err(DriverError::CompileFailures {
                failed,
                total: summary.len(),
            });
        }

        self.output.count(
            "✔",
            &format!("All {} files compiled successfully", self.discovery.suffix()),
            summary.len(),
        );
        Ok(())
    }
}
