//! Configuration command implementations

use anyhow::{Context, Result};
use clap::Subcommand;

use crate::cli::Output;
use crate::compiler::Classpath;
use crate::config::{ReportCheckConfig, Settings};

/// Configuration subcommands
#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the effective configuration after all layers are merged
    Show {
        /// Output format
        #[arg(long, value_enum, default_value = "toml")]
        format: ShowFormat,
    },
    /// Validate configuration and the compiler classpath
    Validate,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum ShowFormat {
    Toml,
    Json,
}

/// Execute config commands
pub fn execute(cmd: ConfigCommands, config_path: Option<&str>, output: &Output) -> Result<()> {
    let config = ReportCheckConfig::load(config_path, None::<()>)?;
    let settings = config.settings()?;

    match cmd {
        ConfigCommands::Show { format } => show(&settings, format),
        ConfigCommands::Validate => validate(&settings, output),
    }
}

fn show(settings: &Settings, format: ShowFormat) -> Result<()> {
    let rendered = match format {
        ShowFormat::Toml => toml::to_string_pretty(settings).context("Failed to render configuration as TOML")?,
        ShowFormat::Json => {
            serde_json::to_string_pretty(settings).context("Failed to render configuration as JSON")?
        }
    };
    println!("{}", rendered.trim_end());
    Ok(())
}

fn validate(settings: &Settings, output: &Output) -> Result<()> {
    settings.validate()?;
    let classpath = Classpath::assemble(&settings.compiler)?;

    output.success("Configuration is valid");
    output.verbose(&format!("Source root: {}", settings.source_root.display()));
    output.verbose(&format!("Output root: {}", settings.output_root.display()));
    output.verbose(&format!("Compiler: {}", settings.compiler.program));
    output.verbose(&format!("Classpath entries: {}", classpath.entries().len()));

    if which::which(&settings.compiler.program).is_err() {
        output.warning(&format!(
            "Compiler program '{}' was not found on PATH",
            settings.compiler.program
        ));
    }
    Ok(())
}
