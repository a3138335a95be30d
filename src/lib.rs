//! # reportcheck - batch compile check for report templates
//!
//! Walks a template directory, hands every report definition (`.jrxml` by
//! default) to an external report compiler and fails the run if any of them
//! does not compile. Meant to run in CI next to the rest of the build.
//!
//! ## Quick Start
//!
//! ```bash
//! # Compile everything under ./templates into ./target/compiled
//! reportcheck
//!
//! # Check another tree, print the summary as JSON
//! reportcheck reports/ --format json
//! ```
//!
//! The compiler itself is configured in `reportcheck.toml` (see
//! [`config::CompilerConfig`]).

pub mod cli;
pub mod compiler;
pub mod config;
pub mod driver;
pub mod errors;

pub use cli::{Cli, Output};
pub use compiler::{CommandCompiler, CompileError, Compiler};
pub use config::{ReportCheckConfig, Settings};
pub use driver::Driver;
pub use errors::DriverError;

/// Result type alias for reportcheck operations
pub type Result<T> = anyhow::Result<T>;
