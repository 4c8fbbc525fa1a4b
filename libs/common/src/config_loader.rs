//! Configuration loading helper functions
//!
//! Layers, lowest to highest priority:
//! 1. serde defaults on the target type
//! 2. config file (YAML or JSON, chosen by extension)
//! 3. raw environment variables from an allow-list
//!
//! Environment keys are matched verbatim (e.g. `ALARM_THRESHOLD`) and mapped
//! to the lowercase field name (`alarm_threshold`). Their values are merged
//! as plain strings so that phone numbers and tokens are never reinterpreted
//! as numbers.

use crate::error::{Error, Result};
use figment::{
    providers::{Format, Json, Yaml},
    Figment,
};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Where to read the configuration file from
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub path: PathBuf,
    /// A missing required file is an error; a missing optional file is skipped
    pub required: bool,
}

impl ConfigFile {
    /// Explicitly requested file (e.g. `--config`)
    pub fn required(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            required: true,
        }
    }

    /// Conventional default location, may be absent
    pub fn optional(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            required: false,
        }
    }
}

/// Add the file layer to a figment
fn merge_file(figment: Figment, file: &ConfigFile) -> Result<Figment> {
    let path: &Path = &file.path;

    if !path.exists() {
        if file.required {
            return Err(Error::Config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        info!("No config file at {}, using environment", path.display());
        return Ok(figment);
    }

    let extension = path
        .extension()
        .and_then(|s| s.to_str())
        .map(str::to_ascii_lowercase)
        .ok_or_else(|| Error::Config("Config file must have an extension".to_string()))?;

    let figment = match extension.as_str() {
        "yaml" | "yml" => figment.merge(Yaml::file(path)),
        "json" => figment.merge(Json::file(path)),
        other => {
            return Err(Error::Config(format!(
                "Unsupported config file format: {}",
                other
            )))
        },
    };

    info!("Using config file {}", path.display());
    Ok(figment)
}

/// Add raw environment variables from the allow-list
fn merge_env(mut figment: Figment, env_keys: &[&str]) -> Figment {
    for key in env_keys {
        if let Ok(value) = std::env::var(key) {
            debug!("Using {} from environment", key);
            figment = figment.merge((key.to_ascii_lowercase(), value));
        }
    }
    figment
}

/// Describe the layers [`load_layered`] would read, highest priority last
///
/// For reporting once logging is up, when loading happened before it.
pub fn config_sources(file: Option<&ConfigFile>, env_keys: &[&str]) -> Vec<String> {
    let mut sources = Vec::new();
    match file {
        Some(file) if file.path.exists() => {
            sources.push(format!("config file {}", file.path.display()))
        },
        Some(file) => sources.push(format!("no config file at {}", file.path.display())),
        None => {},
    }
    sources.extend(
        env_keys
            .iter()
            .filter(|key| std::env::var_os(key).is_some())
            .map(|key| format!("{} from environment", key)),
    );
    sources
}

/// Load a configuration value of type `T` from file and environment
pub fn load_layered<T>(file: Option<&ConfigFile>, env_keys: &[&str]) -> Result<T>
where
    T: DeserializeOwned,
{
    let mut figment = Figment::new();
    if let Some(file) = file {
        figment = merge_file(figment, file)?;
    }
    figment = merge_env(figment, env_keys);

    figment
        .extract()
        .map_err(|e| Error::Config(format!("Failed to load configuration: {}", e)))
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::io::Write;

    #[derive(Debug, Deserialize)]
    struct TestConfig {
        name: String,
        #[serde(default)]
        port: u16,
    }

    #[test]
    fn test_load_yaml_file() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "name: monitor\nport: 8080").unwrap();

        let cfg: TestConfig =
            load_layered(Some(&ConfigFile::required(file.path())), &[]).unwrap();
        assert_eq!(cfg.name, "monitor");
        assert_eq!(cfg.port, 8080);
    }

    #[test]
    fn test_load_json_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"name": "monitor", "port": 9000}}"#).unwrap();

        let cfg: TestConfig =
            load_layered(Some(&ConfigFile::required(file.path())), &[]).unwrap();
        assert_eq!(cfg.port, 9000);
    }

    #[test]
    fn test_missing_required_file_is_error() {
        let result: Result<TestConfig> = load_layered(
            Some(&ConfigFile::required("/nonexistent/firesrv.yaml")),
            &[],
        );
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_unsupported_extension_is_error() {
        let file = tempfile::Builder::new().suffix(".ini").tempfile().unwrap();
        let result: Result<TestConfig> =
            load_layered(Some(&ConfigFile::required(file.path())), &[]);
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_config_sources_lists_file_and_set_env_keys() {
        let file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        std::env::set_var("CFG_SOURCES_TEST_SET", "1");
        std::env::remove_var("CFG_SOURCES_TEST_UNSET");

        let sources = config_sources(
            Some(&ConfigFile::optional(file.path())),
            &["CFG_SOURCES_TEST_SET", "CFG_SOURCES_TEST_UNSET"],
        );
        std::env::remove_var("CFG_SOURCES_TEST_SET");

        assert_eq!(
            sources,
            vec![
                format!("config file {}", file.path().display()),
                "CFG_SOURCES_TEST_SET from environment".to_string(),
            ]
        );

        let missing = config_sources(Some(&ConfigFile::optional("/nonexistent/firesrv.yaml")), &[]);
        assert_eq!(missing, vec!["no config file at /nonexistent/firesrv.yaml".to_string()]);
    }

    #[test]
    fn test_env_overrides_file_and_stays_string() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "name: from-file").unwrap();

        std::env::set_var("CFG_LOADER_TEST_NAME", "from-env");
        std::env::set_var("CFG_LOADER_TEST_PHONE", "+15551234567");

        #[derive(Debug, Deserialize)]
        struct EnvConfig {
            cfg_loader_test_name: Option<String>,
            cfg_loader_test_phone: Option<String>,
        }

        let cfg: EnvConfig = load_layered(
            Some(&ConfigFile::optional(file.path())),
            &["CFG_LOADER_TEST_NAME", "CFG_LOADER_TEST_PHONE"],
        )
        .unwrap();

        std::env::remove_var("CFG_LOADER_TEST_NAME");
        std::env::remove_var("CFG_LOADER_TEST_PHONE");

        assert_eq!(cfg.cfg_loader_test_name.as_deref(), Some("from-env"));
        assert_eq!(cfg.cfg_loader_test_phone.as_deref(), Some("+15551234567"));
    }
}
