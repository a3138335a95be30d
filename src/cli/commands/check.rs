use anyhow::{Context, Result};
use serde::Serialize;
use std::path::PathBuf;

use crate::cli::Output;
use crate::compiler::CommandCompiler;
use crate::config::ReportCheckConfig;
use crate::driver::Driver;

/// Arguments of the default (check) command
pub struct CheckArgs {
    pub source: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub format: OutputFormat,
}

#[derive(Clone, Debug, clap::ValueEnum, Serialize)]
pub enum OutputFormat {
    /// Human-readable progress and summary
    Text,
    /// Summary as JSON on stdout
    Json,
}

/// Settings the command line can override
#[derive(Debug, Default, Serialize)]
struct CheckOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    source_root: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    output_root: Option<PathBuf>,
}

pub async fn execute(args: CheckArgs, config_path: Option<&str>, output: &Output) -> Result<()> {
    let overrides = CheckOverrides {
        source_root: args.source,
        output_root: args.output,
    };

    let config = ReportCheckConfig::load(config_path, Some(overrides))?;
    let settings = config.settings()?;
    settings.validate()?;

    let compiler = CommandCompiler::new(&settings.compiler)?;
    match compiler.probe() {
        Some(path) => tracing::debug!("Using compiler {}", path.display()),
        None => {
            tracing::warn!("Compiler program '{}' was not found on PATH", compiler.program());
            output.warning(&format!(
                "Compiler program '{}' was not found on PATH",
                compiler.program()
            ));
        }
    }

    output.verbose(&format!(
        "Compiling {} files from {} into {}",
        settings.source_suffix,
        settings.source_root.display(),
        settings.output_root.display()
    ));

    let driver = Driver::new(&settings, compiler, *output)?;
    let summary = driver.run().await?;

    if matches!(args.format, OutputFormat::Json) {
        let json = serde_json::to_string_pretty(&summary.report()).context("Failed to serialize run summary")?;
        println!("{json}");
    }

    driver.report(&summary)?;
    Ok(())
}
