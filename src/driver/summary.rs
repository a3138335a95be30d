use serde::Serialize;
use std::path::PathBuf;

/// What happened to one source file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Success { output: PathBuf },
    Failure { message: String },
}

/// Outcome for one discovered source file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompileResult {
    pub source: PathBuf,
    #[serde(flatten)]
    pub outcome: Outcome,
}

impl CompileResult {
    pub fn success(source: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            outcome: Outcome::Success { output: output.into() },
        }
    }

    pub fn failure(source: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            outcome: Outcome::Failure { message: message.into() },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, Outcome::Success { .. })
    }

    /// Root-cause message, for failures
    pub fn failure_message(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::Failure { message } => Some(message),
            Outcome::Success { .. } => None,
        }
    }
}

/// Results of one run, in processing order
#[derive(Debug, Default)]
pub struct RunSummary {
    results: Vec<CompileResult>,
    duration_ms: u64,
}

impl RunSummary {
    pub fn push(&mut self, result: CompileResult) {
        self.results.push(result);
    }

    pub fn results(&self) -> &[CompileResult] {
        &self.results
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn failures(&self) -> impl Iterator<Item = &CompileResult> {
        self.results.iter().filter(|result| !result.is_success())
    }

    pub fn failure_count(&self) -> usize {
        self.failures().count()
    }

    pub fn success_count(&self) -> usize {
        self.len() - self.failure_count()
    }

    /// Nothing failed and there was something to compile
    pub fn is_success(&self) -> bool {
        !self.is_empty() && self.failure_count() == 0
    }

    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    pub(crate) fn set_duration_ms(&mut self, duration_ms: u64) {
        self.duration_ms = duration_ms;
    }

    /// Serializable view with the aggregate counts
    pub fn report(&self) -> SummaryReport<'_> {
        SummaryReport {
            success: self.is_success(),
            total: self.len(),
            compiled: self.success_count(),
            failed: self.failure_count(),
            duration_ms: self.duration_ms,
            results: &self.results,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SummaryReport<'a> {
    pub success: bool,
    pub total: usize,
    pub compiled: usize,
    pub failed: usize,
    pub duration_ms: u64,
    pub results: &'a [CompileResult],
}
