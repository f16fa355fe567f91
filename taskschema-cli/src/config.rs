use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use taskschema::SynthesisMode;

/// Environment variable for the default synthesis mode
pub(crate) const ENV_MODE: &str = "TASKSCHEMA_MODE";

/// Environment variable toggling pretty-printed output
pub(crate) const ENV_PRETTY: &str = "TASKSCHEMA_PRETTY";

/// Environment variable for the log level
pub(crate) const ENV_LOG: &str = "TASKSCHEMA_LOG";

const CONFIG_DIR_NAME: &str = ".taskschema";
const CONFIG_FILE_NAME: &str = "config";
const DEFAULT_LOG_LEVEL: &str = "info";

/// Settings of the `taskschema` command line.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct CliConfig {
    /// Synthesis mode used when `--mode` is not given (default: type)
    #[serde(default)]
    pub mode: SynthesisMode,

    /// Pretty-print JSON output (default: true)
    #[serde(default = "default_pretty")]
    pub pretty: bool,

    /// Log level used when RUST_LOG is unset (default: info)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_pretty() -> bool {
    true
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            mode: SynthesisMode::default(),
            pretty: default_pretty(),
            log_level: default_log_level(),
        }
    }
}

#[derive(Debug, Deserialize, Default, PartialEq, Eq)]
pub(crate) struct FileConfig {
    mode: Option<String>,
    pretty: Option<bool>,
    log_level: Option<String>,
}

/// Raw values read from the environment.
#[derive(Debug, Default)]
pub(crate) struct EnvConfig {
    mode: Option<String>,
    pretty: Option<String>,
    log_level: Option<String>,
}

impl EnvConfig {
    fn read() -> Self {
        Self {
            mode: std::env::var(ENV_MODE).ok(),
            pretty: std::env::var(ENV_PRETTY).ok(),
            log_level: std::env::var(ENV_LOG).ok(),
        }
    }
}

fn normalize_optional(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl CliConfig {
    /// Path to the local config file (`~/.taskschema/config`).
    pub fn config_path() -> Option<PathBuf> {
        let home = std::env::var_os("HOME").or_else(|| std::env::var_os("USERPROFILE"))?;
        let mut path = PathBuf::from(home);
        path.push(CONFIG_DIR_NAME);
        path.push(CONFIG_FILE_NAME);
        Some(path)
    }

    /// Loads the configuration.
    ///
    /// Precedence: environment variables > config file > defaults. The
    /// config file is `explicit` when given, else `~/.taskschema/config` if
    /// it exists.
    ///
    /// - `TASKSCHEMA_MODE`: nothing, void, type or example
    /// - `TASKSCHEMA_PRETTY`: true/false
    /// - `TASKSCHEMA_LOG`: default log level
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let file_config = match explicit {
            Some(path) => Self::read_file(path)?,
            None => Self::config_path()
                .filter(|path| path.exists())
                .map(|path| Self::read_file(&path))
                .transpose()?
                .unwrap_or_default(),
        };
        Self::resolve(file_config, EnvConfig::read())
    }

    fn read_file(path: &Path) -> Result<FileConfig> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("parsing config file {}", path.display()))
    }

    pub(crate) fn resolve(file: FileConfig, env: EnvConfig) -> Result<Self> {
        let mode = match env
            .mode
            .and_then(normalize_optional)
            .or(file.mode.and_then(normalize_optional))
        {
            Some(mode) => mode
                .parse()
                .with_context(|| format!("invalid synthesis mode '{}'", mode))?,
            None => SynthesisMode::default(),
        };

        let env_pretty = match env.pretty.and_then(normalize_optional) {
            Some(value) => Some(
                parse_bool(&value)
                    .with_context(|| format!("{} must be true or false, got '{}'", ENV_PRETTY, value))?,
            ),
            None => None,
        };
        let pretty = env_pretty.or(file.pretty).unwrap_or_else(default_pretty);

        let log_level = env
            .log_level
            .and_then(normalize_optional)
            .or(file.log_level.and_then(normalize_optional))
            .unwrap_or_else(default_log_level);

        Ok(Self {
            mode,
            pretty,
            log_level,
        })
    }

    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(contents: &str) -> FileConfig {
        toml::from_str(contents).unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = CliConfig::resolve(FileConfig::default(), EnvConfig::default()).unwrap();
        assert_eq!(config, CliConfig::default());
        assert_eq!(config.mode, SynthesisMode::Type);
        assert!(config.pretty);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_file_values() {
        let config = CliConfig::resolve(
            file("mode = \"example\"\npretty = false\nlog_level = \"warn\"\n"),
            EnvConfig::default(),
        )
        .unwrap();
        assert_eq!(config.mode, SynthesisMode::Example);
        assert!(!config.pretty);
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn test_env_overrides_file() {
        let env = EnvConfig {
            mode: Some("void".to_string()),
            pretty: Some("yes".to_string()),
            log_level: Some("  ".to_string()),
        };
        let config =
            CliConfig::resolve(file("mode = \"example\"\npretty = false\nlog_level = \"warn\""), env)
                .unwrap();
        assert_eq!(config.mode, SynthesisMode::Void);
        assert!(config.pretty);
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn test_invalid_values_are_errors() {
        let env = EnvConfig {
            mode: Some("random".to_string()),
            ..Default::default()
        };
        assert!(CliConfig::resolve(FileConfig::default(), env).is_err());

        let env = EnvConfig {
            pretty: Some("maybe".to_string()),
            ..Default::default()
        };
        assert!(CliConfig::resolve(FileConfig::default(), env).is_err());
    }

    #[test]
    fn test_with_pretty() {
        assert!(!CliConfig::default().with_pretty(false).pretty);
    }
}
