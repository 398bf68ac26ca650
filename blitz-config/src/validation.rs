//! Configuration validation

use crate::{ConfigError, Result};

/// Trait for validating configuration
pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// Configuration validator with rules
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate that a value is not empty or blank
    pub fn not_empty(value: &str, field: &str) -> Result<()> {
        if value.trim().is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "{} cannot be empty",
                field
            )));
        }
        Ok(())
    }

    /// Validate that every entry names an HTTP method the router knows
    pub fn http_methods(values: &[String], field: &str) -> Result<()> {
        for value in values {
            if blitz_core::HttpMethod::from_str(value).is_none() {
                return Err(ConfigError::ValidationError(format!(
                    "{} contains unknown HTTP method {:?}",
                    field, value
                )));
            }
        }
        Ok(())
    }

    /// Validate that a value parses as a log level
    pub fn log_level(value: &str, field: &str) -> Result<blitz_core::LogLevel> {
        blitz_core::LogLevel::from_str(value).ok_or_else(|| {
            ConfigError::ValidationError(format!("{} is not a log level: {:?}", field, value))
        })
    }
}
