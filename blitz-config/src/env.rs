//! Environment variable loading
//!
//! Variables map onto settings by section, separated by a double underscore:
//! `BLITZ_ROUTER__AUTO_OPTIONS=false` sets `router.auto_options`.

use std::collections::HashMap;
use std::env;

/// Prefix used when none is given
pub const DEFAULT_PREFIX: &str = "BLITZ";

/// Environment variable loader
#[derive(Debug, Clone)]
pub struct EnvLoader {
    prefix: Option<String>,
}

impl EnvLoader {
    pub fn new(prefix: Option<String>) -> Self {
        Self { prefix }
    }

    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// Load matching process environment variables, keyed by lower-cased
    /// name with the prefix removed
    pub fn load(&self) -> HashMap<String, String> {
        self.load_from(env::vars())
    }

    /// Same as [`EnvLoader::load`] over an explicit set of variables
    pub fn load_from<I, K, V>(&self, vars: I) -> HashMap<String, String>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut config = HashMap::new();

        for (key, value) in vars {
            let key = key.as_ref().to_uppercase();
            let trimmed = match &self.prefix {
                Some(prefix) => match key.strip_prefix(&prefix.to_uppercase()) {
                    Some(rest) if rest.starts_with('_') => rest.trim_start_matches('_'),
                    _ => continue,
                },
                None => key.as_str(),
            };
            config.insert(trimmed.to_lowercase(), value.into());
        }

        config
    }
}

impl Default for EnvLoader {
    fn default() -> Self {
        Self::new(Some(DEFAULT_PREFIX.to_string()))
    }
}
