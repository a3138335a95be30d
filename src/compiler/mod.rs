//! The external report compiler as seen by the driver
//!
//! The driver only knows the [`Compiler`] capability: compile one source file
//! to one destination, or fail with a [`CompileError`]. [`CommandCompiler`]
//! implements it by spawning the configured program.

use std::error::Error;
use std::fmt;
use std::future::Future;
use std::path::Path;
use std::process::ExitStatus;

use thiserror::Error;

pub mod classpath;
pub mod command;

pub use classpath::Classpath;
pub use command::CommandCompiler;

/// Compile capability consumed by the driver
pub trait Compiler {
    /// Compile `source` into `destination`. The parent directory of
    /// `destination` exists when this is called.
    fn compile(
        &self,
        source: &Path,
        destination: &Path,
    ) -> impl Future<Output = Result<(), CompileError>> + Send;
}

/// Failure of a single compiler invocation
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("failed to start {program}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {status}")]
    Exited {
        program: String,
        status: ExitStatus,
        #[source]
        diagnostic: CompilerDiagnostic,
    },

    #[error("{program} did not finish within {seconds}s")]
    TimedOut { program: String, seconds: u64 },

    #[error("compilation failed")]
    Failed(#[source] Box<dyn Error + Send + Sync + 'static>),
}

impl CompileError {
    /// Wrap an arbitrary error raised by an in-process compiler
    pub fn failed<E>(error: E) -> Self
    where
        E: Into<Box<dyn Error + Send + Sync + 'static>>,
    {
        CompileError::Failed(error.into())
    }

    /// Everything the compiler printed, if it got far enough to print
    pub fn compiler_output(&self) -> Option<&str> {
        match self {
            CompileError::Exited { diagnostic, .. } if !diagnostic.output.is_empty() => {
                Some(diagnostic.output.as_str())
            }
            _ => None,
        }
    }
}

/// What the compiler reported on its way out
#[derive(Debug)]
pub struct CompilerDiagnostic {
    /// The line that names the actual problem
    pub message: String,
    /// Full stderr (or stdout when stderr was empty)
    pub output: String,
}

impl CompilerDiagnostic {
    /// Build from captured process output.
    ///
    /// For JVM stack traces the message is the innermost `Caused by:`, or the
    /// first exception header when nothing was chained, without the exception
    /// class and with any continuation lines up to the first stack frame.
    /// Other output falls back to its last unindented line.
    pub fn from_output(stderr: &[u8], stdout: &[u8]) -> Self {
        let stderr = String::from_utf8_lossy(stderr);
        let output = if stderr.trim().is_empty() {
            String::from_utf8_lossy(stdout).trim_end().to_string()
        } else {
            stderr.trim_end().to_string()
        };

        let lines: Vec<&str> = output.lines().collect();
        let message = lines
            .iter()
            .rposition(|line| line.starts_with(CAUSED_BY))
            .or_else(|| lines.iter().position(|line| exception_header(line).is_some()))
            .map(|start| exception_message(&lines[start..]))
            .unwrap_or_else(|| last_unindented_line(&lines));

        Self { message, output }
    }
}

const CAUSED_BY: &str = "Caused by:";

/// Message of the exception whose header is `block[0]`
fn exception_message(block: &[&str]) -> String {
    let header = block[0].strip_prefix(CAUSED_BY).unwrap_or(block[0]).trim();
    let (class, first) = match exception_header(header) {
        Some((class, rest)) => (Some(class), rest),
        None => (None, header),
    };

    let mut message = vec![first.trim_end()];
    message.extend(
        block[1..]
            .iter()
            .take_while(|line| !is_stack_frame(line))
            .map(|line| line.trim_end()),
    );
    let message = message.join("\n").trim().to_string();

    match class {
        Some(class) if message.is_empty() => class.rsplit('.').next().unwrap_or(class).to_string(),
        _ => message,
    }
}

/// Split `pkg.SomeException: message` into class name and message
fn exception_header(line: &str) -> Option<(&str, &str)> {
    let line = match line.strip_prefix("Exception in thread ") {
        Some(rest) => rest.split_once(' ').map(|(_, rest)| rest)?,
        None => line,
    };
    let (class, rest) = match line.split_once(':') {
        Some((class, rest)) => (class, rest),
        None => (line.trim_end(), ""),
    };
    let simple = class.rsplit('.').next().unwrap_or(class);
    let is_class = !class.is_empty()
        && !class.contains(char::is_whitespace)
        && (simple.ends_with("Exception") || simple.ends_with("Error"));
    is_class.then_some((class, rest))
}

fn is_stack_frame(line: &str) -> bool {
    let trimmed = line.trim_start();
    line.starts_with(char::is_whitespace) && (trimmed.starts_with("at ") || trimmed.starts_with("... "))
}

fn last_unindented_line(lines: &[&str]) -> String {
    lines
        .iter()
        .filter(|line| !line.trim().is_empty())
        .filter(|line| !line.starts_with(char::is_whitespace))
        .last()
        .map(|line| line.trim().to_string())
        .unwrap_or_default()
}

impl fmt::Display for CompilerDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl Error for CompilerDiagnostic {}

/// Message of the deepest error in the `source()` chain.
///
/// Errors with an empty message are reported by type name instead.
pub fn root_cause_message(error: &(dyn Error + 'static)) -> String {
    let mut current = error;
    while let Some(source) = current.source() {
        current = source;
    }

    let message = current.to_string();
    if message.trim().is_empty() {
        type_name(current)
    } else {
        message
    }
}

/// Every message in the chain, outermost first, in `anyhow`'s report layout
pub fn diagnostic_chain(error: &(dyn Error + 'static)) -> String {
    let mut report = error.to_string();
    let mut causes = Vec::new();
    let mut current = error.source();
    while let Some(cause) = current {
        causes.push(cause);
        current = cause.source();
    }

    if !causes.is_empty() {
        report.push_str("\n\nCaused by:");
        for (index, cause) in causes.iter().enumerate() {
            let message = cause.to_string();
            let message = if message.trim().is_empty() { type_name(*cause) } else { message };
            report.push_str(&format!("\n    {index}: {message}"));
        }
    }
    report
}

// `Debug` for derived types starts with the type (or variant) name.
fn type_name(error: &dyn Error) -> String {
    let debug = format!("{error:?}");
    let name: String = debug
        .chars()
        .take_while(|c| c.is_alphanumeric() || *c == '_')
        .collect();
    if name.is_empty() { "unknown error".to_string() } else { name }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Error)]
    #[error("report failed")]
    struct ReportFailed(#[source] TemplateInvalid);

    #[derive(Debug, Error)]
    #[error("template invalid")]
    struct TemplateInvalid(#[source] ExpressionError);

    #[derive(Debug, Error)]
    #[error("msg")]
    struct ExpressionError;

    #[derive(Debug, Error)]
    #[error("report failed")]
    struct Outer(#[source] Silent);

    #[derive(Debug, Error)]
    #[error("")]
    struct Silent;

    #[test]
    fn test_root_cause_walks_to_deepest_error() {
        let err = ReportFailed(TemplateInvalid(ExpressionError));
        assert_eq!(root_cause_message(&err), "msg");
    }

    #[test]
    fn test_root_cause_without_message_uses_type_name() {
        let err = Outer(Silent);
        assert_eq!(root_cause_message(&err), "Silent");
    }

    #[test]
    fn test_root_cause_of_single_error_is_itself() {
        let err = ExpressionError;
        assert_eq!(root_cause_message(&err), "msg");
    }

    #[test]
    fn test_root_cause_through_compile_error() {
        let err = CompileError::failed(ReportFailed(TemplateInvalid(ExpressionError)));
        assert_eq!(root_cause_message(&err), "msg");
    }

    #[test]
    fn test_diagnostic_picks_innermost_caused_by() {
        let stderr = b"net.sf.jasperreports.engine.JRException: Errors were encountered when compiling report expressions class file:
\tat net.sf.jasperreports.engine.design.JRAbstractCompiler.compileReport(JRAbstractCompiler.java:215)
Caused by: net.sf.jasperreports.engine.JRRuntimeException: Field not found : customerName
\tat net.sf.jasperreports.engine.design.JRVerifier.verify(JRVerifier.java:101)
\t... 4 more
";
        let diagnostic = CompilerDiagnostic::from_output(stderr, b"");
        assert_eq!(diagnostic.message, "Field not found : customerName");
        assert!(diagnostic.output.contains("JRAbstractCompiler"));
    }

    #[test]
    fn test_diagnostic_keeps_expression_compile_errors() {
        let stderr = b"Exception in thread \"main\" net.sf.jasperreports.engine.JRException: Errors were encountered when compiling report expressions class file:
1. total cannot be resolved to a variable
                value = (java.lang.String)(total); //$JR_EXPR_ID=8$
                                           <--->
1 errors
.
\tat net.sf.jasperreports.engine.design.JRAbstractCompiler.compileReport(JRAbstractCompiler.java:215)
\tat net.sf.jasperreports.engine.JasperCompileManager.compileToFile(JasperCompileManager.java:126)
\tat local.jasper.CompileReport.main(CompileReport.java:42)
";
        let diagnostic = CompilerDiagnostic::from_output(stderr, b"");
        assert!(
            diagnostic
                .message
                .starts_with("Errors were encountered when compiling report expressions class file:")
        );
        assert!(diagnostic.message.contains("1. total cannot be resolved to a variable"));
        assert!(!diagnostic.message.contains("JRException"));
        assert!(!diagnostic.message.contains("JRAbstractCompiler"));
    }

    #[test]
    fn test_diagnostic_without_exception_message_uses_class_name() {
        let stderr = b"java.lang.NullPointerException
\tat local.jasper.CompileReport.main(CompileReport.java:42)
";
        let diagnostic = CompilerDiagnostic::from_output(stderr, b"");
        assert_eq!(diagnostic.message, "NullPointerException");
    }

    #[test]
    fn test_diagnostic_plain_caused_by_line() {
        let diagnostic = CompilerDiagnostic::from_output(b"Caused by: Field not found : total\n", b"");
        assert_eq!(diagnostic.message, "Field not found : total");
    }

    #[test]
    fn test_diagnostic_falls_back_to_stdout() {
        let diagnostic = CompilerDiagnostic::from_output(b"  \n", b"syntax error at line 3\n");
        assert_eq!(diagnostic.message, "syntax error at line 3");
    }

    #[test]
    fn test_silent_compiler_reports_diagnostic_type() {
        let err = CompileError::Exited {
            program: "jasper-compile".to_string(),
            status: exit_status(1),
            diagnostic: CompilerDiagnostic::from_output(b"", b""),
        };
        assert_eq!(root_cause_message(&err), "CompilerDiagnostic");
        assert!(err.compiler_output().is_none());
    }

    #[test]
    fn test_diagnostic_chain_lists_causes() {
        let err = ReportFailed(TemplateInvalid(ExpressionError));
        let chain = diagnostic_chain(&err);
        assert!(chain.starts_with("report failed"));
        assert!(chain.contains("0: template invalid"));
        assert!(chain.contains("1: msg"));
    }

    #[cfg(unix)]
    fn exit_status(code: i32) -> ExitStatus {
        use std::os::unix::process::ExitStatusExt;
        ExitStatus::from_raw(code << 8)
    }

    #[cfg(windows)]
    fn exit_status(code: u32) -> ExitStatus {
        use std::os::windows::process::ExitStatusExt;
        ExitStatus::from_raw(code)
    }
}
