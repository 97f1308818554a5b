use crate::config::port_from_env;
use crate::core::ConfigProvider;
use crate::utils::error::{Result, ShimError};
use crate::utils::validation::{validate_serving_fields, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub server: ServerConfig,
    pub artifacts: ArtifactsConfig,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    /// Falls back to `PORT`, then 5000.
    pub port: Option<u16>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: None,
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactsConfig {
    #[serde(default = "default_dir")]
    pub dir: String,
    pub model: String,
    pub columns: String,
}

fn default_dir() -> String {
    ".".to_string()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub verbose: bool,
    #[serde(default)]
    pub json: bool,
    #[serde(default)]
    pub monitor: bool,
}

impl TomlConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ShimError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ShimError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replace `${VAR}` with the value of the environment variable `VAR`.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ShimError::ConfigError {
            message: e.to_string(),
        })?;

        let mut missing = Vec::new();
        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| {
                missing.push(var_name.to_string());
                String::new()
            })
        });

        if !missing.is_empty() {
            return Err(ShimError::ConfigError {
                message: format!("Environment variable(s) not set: {}", missing.join(", ")),
            });
        }

        Ok(result.into_owned())
    }

    fn logging(&self) -> LoggingConfig {
        self.logging.clone().unwrap_or_default()
    }
}

impl ConfigProvider for TomlConfig {
    fn artifact_dir(&self) -> &str {
        &self.artifacts.dir
    }

    fn model_file(&self) -> &str {
        &self.artifacts.model
    }

    fn columns_file(&self) -> &str {
        &self.artifacts.columns
    }

    fn host(&self) -> &str {
        &self.server.host
    }

    fn port(&self) -> u16 {
        self.server.port.unwrap_or_else(port_from_env)
    }

    fn verbose(&self) -> bool {
        self.logging().verbose
    }

    fn json_logs(&self) -> bool {
        self.logging().json
    }

    fn monitor(&self) -> bool {
        self.logging().monitor
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        validate_serving_fields(
            &self.artifacts.dir,
            &self.artifacts.model,
            &self.artifacts.columns,
            &self.server.host,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_toml_config() {
        let toml_content = r#"
[server]
host = "127.0.0.1"
port = 8081

[artifacts]
dir = "./artifacts"
model = "best_model.json"
columns = "columns.json"

[logging]
verbose = true
json = true
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.host(), "127.0.0.1");
        assert_eq!(config.port(), 8081);
        assert_eq!(config.artifact_dir(), "./artifacts");
        assert!(config.verbose());
        assert!(config.json_logs());
        assert!(!config.monitor());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_minimal_toml_uses_defaults() {
        let toml_content = r#"
[artifacts]
model = "m.json"
columns = "c.json"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.host(), "0.0.0.0");
        assert_eq!(config.artifact_dir(), ".");
        assert!(!config.verbose());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("PREDICT_SHIM_TEST_DIR", "/srv/models");

        let toml_content = r#"
[artifacts]
dir = "${PREDICT_SHIM_TEST_DIR}"
model = "best_model.json"
columns = "columns.json"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.artifacts.dir, "/srv/models");

        std::env::remove_var("PREDICT_SHIM_TEST_DIR");
    }

    #[test]
    fn test_unset_env_var_is_an_error() {
        let toml_content = r#"
[artifacts]
dir = "${PREDICT_SHIM_SURELY_UNSET_VAR}"
model = "best_model.json"
columns = "columns.json"
"#;

        let err = TomlConfig::from_toml_str(toml_content).unwrap_err();
        assert!(err.to_string().contains("PREDICT_SHIM_SURELY_UNSET_VAR"));
    }

    #[test]
    fn test_config_validation() {
        let toml_content = r#"
[artifacts]
model = "best_model.pkl"
columns = "columns.json"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();

        let toml_content = r#"
[server]
port = 6001

[artifacts]
model = "model.json"
columns = "cols.json"
"#;

        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.model_file(), "model.json");
        assert_eq!(config.port(), 6001);
    }
}
