use anyhow::{Context, Result};
use figment::{
    Figment,
    providers::{Env, Format, Json, Serialized, Toml, Yaml},
};
use serde::Serialize;
use std::path::Path;

use super::{Settings, smart_load};
use crate::errors::DriverError;

// Embed the default config at compile time
const DEFAULT_CONFIG: &str = include_str!("../../default-config.toml");

/// Layered reportcheck configuration
pub struct ReportCheckConfig {
    figment: Figment,
}

impl ReportCheckConfig {
    /// Load with the standard layering and optional CLI overrides.
    ///
    /// Priority, lowest first: embedded defaults, user config, repository
    /// config, `custom_config`, `REPORTCHECK_*` environment, CLI overrides.
    pub fn load<T: Serialize>(custom_config: Option<&str>, cli_overrides: Option<T>) -> Result<Self> {
        tracing::trace!("CONFIG LOAD: Starting");

        let user_base = Self::user_config_base_path();
        let mut figment = Figment::new()
            .merge(Toml::string(DEFAULT_CONFIG))
            // User config - support multiple formats
            .merge(Toml::file(format!("{user_base}.toml")))
            .merge(Json::file(format!("{user_base}.json")))
            .merge(Yaml::file(format!("{user_base}.yaml")))
            .merge(Yaml::file(format!("{user_base}.yml")))
            // Repository config - support multiple formats
            .merge(Toml::file("reportcheck.toml"))
            .merge(Json::file("reportcheck.json"))
            .merge(Yaml::file("reportcheck.yaml"))
            .merge(Yaml::file("reportcheck.yml"));

        if let Some(custom_path) = custom_config {
            if !Path::new(custom_path).is_file() {
                return Err(DriverError::Config(format!("config file not found: {custom_path}")).into());
            }
            tracing::debug!("Using custom config file {}", custom_path);
            figment = figment.merge(smart_load::auto(custom_path));
        }

        // Environment variables override every file
        figment = figment.merge(Env::prefixed("REPORTCHECK_").split("__"));

        if let Some(overrides) = cli_overrides {
            tracing::trace!("CONFIG LOAD: Applying CLI overrides");
            figment = figment.merge(Serialized::defaults(overrides));
        }

        Ok(ReportCheckConfig { figment })
    }

    /// Extract the typed settings
    pub fn settings(&self) -> Result<Settings> {
        let settings: Settings = self
            .figment
            .extract()
            .map_err(|e| DriverError::Config(e.to_string()))
            .context("Failed to read reportcheck configuration")?;
        Ok(settings)
    }

    fn user_config_base_path() -> String {
        match std::env::var("HOME") {
            Ok(home) => format!("{home}/.config/reportcheck/config"),
            Err(_) => "~/.config/reportcheck/config".to_string(),
        }
    }
}
