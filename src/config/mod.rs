pub mod toml_config;

use crate::core::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{validate_serving_fields, Validate};
#[cfg(feature = "cli")]
use clap::Parser;
use serde::{Deserialize, Serialize};

pub const DEFAULT_PORT: u16 = 5000;

/// Port from a raw `PORT` value; unset or unparseable falls back to 5000.
pub fn resolve_port(raw: Option<&str>) -> u16 {
    raw.and_then(|s| s.trim().parse::<u16>().ok())
        .unwrap_or(DEFAULT_PORT)
}

pub fn port_from_env() -> u16 {
    resolve_port(std::env::var("PORT").ok().as_deref())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(Parser))]
#[cfg_attr(feature = "cli", command(name = "predict-shim"))]
#[cfg_attr(
    feature = "cli",
    command(about = "Serve class predictions from a pre-trained model over HTTP")
)]
pub struct CliConfig {
    #[cfg_attr(feature = "cli", arg(long, default_value = "."))]
    pub artifact_dir: String,

    #[cfg_attr(feature = "cli", arg(long, default_value = "best_model.json"))]
    pub model_file: String,

    #[cfg_attr(feature = "cli", arg(long, default_value = "columns.json"))]
    pub columns_file: String,

    #[cfg_attr(feature = "cli", arg(long, default_value = "0.0.0.0"))]
    pub host: String,

    #[cfg_attr(feature = "cli", arg(long, help = "TOML config file, replaces the flags above"))]
    pub config: Option<String>,

    #[cfg_attr(feature = "cli", arg(long, help = "Enable verbose output"))]
    pub verbose: bool,

    #[cfg_attr(feature = "cli", arg(long, help = "Emit logs as JSON lines"))]
    pub json_logs: bool,

    #[cfg_attr(feature = "cli", arg(long, help = "Log process CPU and memory usage"))]
    pub monitor: bool,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            artifact_dir: ".".to_string(),
            model_file: "best_model.json".to_string(),
            columns_file: "columns.json".to_string(),
            host: "0.0.0.0".to_string(),
            config: None,
            verbose: false,
            json_logs: false,
            monitor: false,
        }
    }
}

impl ConfigProvider for CliConfig {
    fn artifact_dir(&self) -> &str {
        &self.artifact_dir
    }

    fn model_file(&self) -> &str {
        &self.model_file
    }

    fn columns_file(&self) -> &str {
        &self.columns_file
    }

    fn host(&self) -> &str {
        &self.host
    }

    fn port(&self) -> u16 {
        port_from_env()
    }

    fn verbose(&self) -> bool {
        self.verbose
    }

    fn json_logs(&self) -> bool {
        self.json_logs
    }

    fn monitor(&self) -> bool {
        self.monitor
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_serving_fields(
            &self.artifact_dir,
            &self.model_file,
            &self.columns_file,
            &self.host,
        )
    }
}
