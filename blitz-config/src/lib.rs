//! Configuration for blitzhttp routers
//!
//! `BlitzConfig` is read from a TOML or JSON file, then overlaid with
//! `BLITZ_`-prefixed environment variables, then validated. It builds the
//! pieces of a server that are configurable: router options, the `Auth`
//! middleware and logging.

pub mod env;
pub mod error;
pub mod loader;
pub mod validation;

pub use env::{DEFAULT_PREFIX, EnvLoader};
pub use error::{ConfigError, Result};
pub use loader::{ConfigLoader, FileFormat};
pub use validation::{ConfigValidator, Validate};

use blitz_core::{
    Auth, DEFAULT_AUTH_HEADER, LogConfig, LogFormat, LogLevel, LogOutput, Middleware, Router,
    RouterOptions,
};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Settings for the bundled `Auth` middleware
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    /// Header that must be present and non-empty
    pub header: String,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            header: DEFAULT_AUTH_HEADER.to_string(),
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    pub level: LogLevel,
    pub format: LogFormat,
    /// `stdout`, `stderr`, or a file path
    pub output: String,
    pub env_filter: Option<String>,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Json,
            output: "stdout".to_string(),
            env_filter: None,
        }
    }
}

/// Complete configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BlitzConfig {
    pub router: RouterOptions,
    pub auth: AuthSettings,
    pub log: LogSettings,
}

impl BlitzConfig {
    /// Parse from a string in the given format and validate.
    ///
    /// `Env` content is applied as overrides on top of the defaults.
    pub fn parse(content: &str, format: FileFormat) -> Result<Self> {
        Self::from_value(ConfigLoader::new(format).parse(content)?, format)
    }

    fn from_value(value: serde_json::Value, format: FileFormat) -> Result<Self> {
        let config = match format {
            FileFormat::Env => {
                let vars = value
                    .as_object()
                    .map(|map| {
                        map.iter()
                            .filter_map(|(k, v)| v.as_str().map(|v| (k.clone(), v.to_string())))
                            .collect::<Vec<_>>()
                    })
                    .unwrap_or_default();
                let overrides = EnvLoader::default().load_from(vars);
                Self::default().with_overrides(&overrides)?
            }
            FileFormat::Json | FileFormat::Toml => serde_json::from_value(value)
                .map_err(|e| ConfigError::DeserializationError(e.to_string()))?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Load a file, format chosen by extension
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let loader = ConfigLoader::auto(path)?;
        Self::from_value(loader.load_file(path)?, loader.format())
    }

    /// Defaults overlaid with `BLITZ_*` process environment variables
    pub fn from_env() -> Result<Self> {
        let config = Self::default().with_overrides(&EnvLoader::default().load())?;
        config.validate()?;
        Ok(config)
    }

    /// Full load: optional `.env`, optional file, then the environment.
    ///
    /// A missing `.env` is not an error; a missing config file is.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        dotenvy::dotenv().ok();

        let base = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        let config = base.with_overrides(&EnvLoader::default().load())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides keyed `section__field`, as produced by [`EnvLoader`].
    /// Unknown keys are ignored.
    pub fn with_overrides(mut self, vars: &HashMap<String, String>) -> Result<Self> {
        for (key, value) in vars {
            match key.as_str() {
                "router__auto_options" => {
                    self.router.auto_options = parse_bool(value, key)?;
                }
                "router__allow" => {
                    self.router.allow = value
                        .split(',')
                        .map(str::trim)
                        .filter(|m| !m.is_empty())
                        .map(str::to_uppercase)
                        .collect();
                }
                "auth__header" => self.auth.header = value.clone(),
                "log__level" => self.log.level = ConfigValidator::log_level(value, key)?,
                "log__format" => self.log.format = parse_log_format(value)?,
                "log__output" => self.log.output = value.clone(),
                "log__env_filter" => self.log.env_filter = Some(value.clone()),
                _ => {}
            }
        }
        Ok(self)
    }

    /// A router carrying these router options
    pub fn router(&self) -> Router {
        Router::with_options(self.router.clone())
    }

    /// `Auth` middleware checking the configured header
    pub fn auth(&self) -> Arc<dyn Middleware> {
        Arc::new(Auth::new().with_header(self.auth.header.clone()))
    }

    pub fn log_config(&self) -> LogConfig {
        let output = match self.log.output.as_str() {
            "stdout" => LogOutput::Stdout,
            "stderr" => LogOutput::Stderr,
            path => LogOutput::File(path.to_string()),
        };
        let config = LogConfig::new()
            .level(self.log.level)
            .format(self.log.format)
            .output(output);
        match &self.log.env_filter {
            Some(filter) => config.with_env_filter(filter.clone()),
            None => config,
        }
    }
}

impl Validate for BlitzConfig {
    fn validate(&self) -> Result<()> {
        ConfigValidator::http_methods(&self.router.allow, "router.allow")?;
        if self.router.auto_options && self.router.allow.is_empty() {
            return Err(ConfigError::ValidationError(
                "router.allow cannot be empty while auto_options is on".to_string(),
            ));
        }
        ConfigValidator::not_empty(&self.auth.header, "auth.header")?;
        ConfigValidator::not_empty(&self.log.output, "log.output")?;
        Ok(())
    }
}

fn parse_bool(value: &str, key: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::ValidationError(format!(
            "{} must be a boolean, got {:?}",
            key, value
        ))),
    }
}

fn parse_log_format(value: &str) -> Result<LogFormat> {
    match value.trim().to_lowercase().as_str() {
        "json" => Ok(LogFormat::Json),
        "plain" => Ok(LogFormat::Plain),
        "pretty" => Ok(LogFormat::Pretty),
        "compact" => Ok(LogFormat::Compact),
        other => Err(ConfigError::ValidationError(format!(
            "log.format must be json, plain, pretty or compact, got {:?}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let config = BlitzConfig::default();
        assert!(config.router.auto_options);
        assert_eq!(
            config.router.allow_header(),
            "GET,POST,PUT,DELETE,PATCH,OPTIONS"
        );
        assert_eq!(config.auth.header, "Authorization");
        assert_eq!(config.log.level, LogLevel::Info);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_toml() {
        let config = BlitzConfig::parse(
            r#"
            [router]
            auto_options = false

            [auth]
            header = "X-Api-Key"

            [log]
            level = "debug"
            format = "compact"
            "#,
            FileFormat::Toml,
        )
        .unwrap();

        assert!(!config.router.auto_options);
        assert_eq!(config.router.allow.len(), 6);
        assert_eq!(config.auth.header, "X-Api-Key");
        assert_eq!(config.log.level, LogLevel::Debug);
        assert_eq!(config.log.format, LogFormat::Compact);
    }

    #[test]
    fn test_parse_json_partial() {
        let json = r#"{"router": {"allow": ["GET", "OPTIONS"]}}"#;
        let config = BlitzConfig::parse(json, FileFormat::Json).unwrap();
        assert_eq!(config.router.allow_header(), "GET,OPTIONS");
        assert!(config.router.auto_options);
    }

    #[test]
    fn test_parse_env_content() {
        let config = BlitzConfig::parse(
            "BLITZ_AUTH__HEADER=X-Token\nBLITZ_ROUTER__AUTO_OPTIONS=off\n",
            FileFormat::Env,
        )
        .unwrap();
        assert_eq!(config.auth.header, "X-Token");
        assert!(!config.router.auto_options);
    }

    #[test]
    fn test_unknown_log_level_is_rejected() {
        let json = r#"{"log": {"level": "loud"}}"#;
        let err = BlitzConfig::parse(json, FileFormat::Json).unwrap_err();
        assert!(matches!(err, ConfigError::DeserializationError(_)));
    }

    #[test]
    fn test_overrides() {
        let config = BlitzConfig::default()
            .with_overrides(&vars(&[
                ("router__allow", "get, post ,options"),
                ("log__level", "warn"),
                ("log__format", "pretty"),
                ("log__env_filter", "blitz_core=trace"),
                ("unrelated", "x"),
            ]))
            .unwrap();

        assert_eq!(config.router.allow_header(), "GET,POST,OPTIONS");
        assert_eq!(config.log.level, LogLevel::Warn);
        assert_eq!(config.log.format, LogFormat::Pretty);
        assert_eq!(config.log.env_filter.as_deref(), Some("blitz_core=trace"));
    }

    #[test]
    fn test_bad_overrides() {
        for (key, value) in [
            ("router__auto_options", "maybe"),
            ("log__level", "loud"),
            ("log__format", "xml"),
        ] {
            let result = BlitzConfig::default().with_overrides(&vars(&[(key, value)]));
            assert!(result.is_err(), "{key}={value}");
        }
    }

    #[test]
    fn test_validation() {
        let mut config = BlitzConfig::default();
        config.router.allow.push("BREW".to_string());
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));

        let mut config = BlitzConfig::default();
        config.auth.header = String::new();
        assert!(config.validate().is_err());

        let mut config = BlitzConfig::default();
        config.router.allow.clear();
        assert!(config.validate().is_err());
        config.router.auto_options = false;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_log_config() {
        let mut config = BlitzConfig::default();
        config.log.output = "stderr".to_string();
        assert_eq!(config.log_config().output, LogOutput::Stderr);

        config.log.output = "/var/log/blitz.log".to_string();
        assert_eq!(
            config.log_config().output,
            LogOutput::File("/var/log/blitz.log".to_string())
        );
    }

    #[test]
    fn test_builds_router_with_options() {
        let mut config = BlitzConfig::default();
        config.router.auto_options = false;
        let router = config.router();
        assert!(!router.options().auto_options);
    }

    #[test]
    fn test_config_error_converts_to_core_error() {
        let err: blitz_core::Error = ConfigError::ValidationError("x".into()).into();
        assert_eq!(err.status_code(), 500);
    }
}
