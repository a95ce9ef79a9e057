//! The host CLI configuration capability and its implementations.
//!
//! # Design
//! - `HostConfig` is the only seam the query engine sees; it never errors,
//!   a failed lookup is reported as "not found".
//! - `DcosCliConfig` mirrors the host CLI's own precedence: environment form
//!   of the key first, then `dcos config show <key>`.
//! - `StaticConfig` backs tests and counts lookups so caching can be asserted.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::process::Command;
use std::sync::{Mutex, PoisonError, RwLock};

use crate::error::{ConfigError, ConfigResult};
use crate::keys::env_name;

/// Read-only view of the host CLI's cached configuration.
pub trait HostConfig: Send + Sync {
    /// Return the value stored under `key`, or `None` when it is not set.
    fn get(&self, key: &str) -> Option<String>;
}

/// Look up an optional value, treating blank values as absent.
pub fn optional_value(host: &dyn HostConfig, key: &str) -> Option<String> {
    host.get(key)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Look up a value that must be present.
///
/// # Errors
///
/// Returns [`ConfigError::MissingRequired`] when the value is absent or blank.
pub fn required_value(
    host: &dyn HostConfig,
    key: &'static str,
    description: &'static str,
    hint: &'static str,
) -> ConfigResult<String> {
    optional_value(host, key).ok_or(ConfigError::MissingRequired {
        key,
        description,
        hint,
    })
}

type EnvLookup = Box<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// `HostConfig` backed by the `dcos` executable.
pub struct DcosCliConfig {
    binary: PathBuf,
    env: EnvLookup,
}

impl DcosCliConfig {
    /// Use `dcos` from `PATH` and the process environment.
    #[must_use]
    pub fn new() -> Self {
        Self {
            binary: PathBuf::from("dcos"),
            env: Box::new(|name| std::env::var(name).ok()),
        }
    }

    /// Use a specific host CLI executable.
    #[must_use]
    pub fn with_binary(mut self, binary: impl Into<PathBuf>) -> Self {
        self.binary = binary.into();
        self
    }

    /// Replace the environment lookup.
    #[must_use]
    pub fn with_env_lookup(
        mut self,
        lookup: impl Fn(&str) -> Option<String> + Send + Sync + 'static,
    ) -> Self {
        self.env = Box::new(lookup);
        self
    }

    fn run_config_show(&self, key: &str) -> Option<String> {
        let output = match Command::new(&self.binary)
            .args(["config", "show", key])
            .output()
        {
            Ok(output) => output,
            Err(err) => {
                tracing::debug!(
                    binary = %self.binary.display(),
                    key,
                    error = %err,
                    "host CLI could not be executed"
                );
                return None;
            }
        };

        if !output.status.success() {
            tracing::debug!(key, status = %output.status, "host CLI has no value for key");
            return None;
        }

        let value = String::from_utf8_lossy(&output.stdout).trim().to_string();
        (!value.is_empty()).then_some(value)
    }
}

impl Default for DcosCliConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for DcosCliConfig {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("DcosCliConfig")
            .field("binary", &self.binary)
            .finish_non_exhaustive()
    }
}

impl HostConfig for DcosCliConfig {
    fn get(&self, key: &str) -> Option<String> {
        if let Some(value) = (self.env)(&env_name(key)).filter(|value| !value.is_empty()) {
            tracing::debug!(key, "using host config value from environment");
            return Some(value);
        }
        self.run_config_show(key)
    }
}

/// In-memory `HostConfig` that records how often each key was read.
#[derive(Debug, Default)]
pub struct StaticConfig {
    values: RwLock<HashMap<String, String>>,
    lookups: Mutex<HashMap<String, usize>>,
}

impl StaticConfig {
    /// Empty configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(self, key: &str, value: &str) -> Self {
        self.set(key, value);
        self
    }

    /// Insert or replace a value.
    pub fn set(&self, key: &str, value: &str) {
        self.values
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
    }

    /// Remove a value.
    pub fn remove(&self, key: &str) {
        self.values
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }

    /// Number of times `key` was read through [`HostConfig::get`].
    #[must_use]
    pub fn lookups(&self, key: &str) -> usize {
        self.lookups
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .copied()
            .unwrap_or(0)
    }
}

impl HostConfig for StaticConfig {
    fn get(&self, key: &str) -> Option<String> {
        *self
            .lookups
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(key.to_string())
            .or_default() += 1;
        self.values
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::{DCOS_URL, DCOS_URL_HINT, SSL_VERIFY};

    #[test]
    fn env_value_wins_over_host_binary() {
        let config = DcosCliConfig::new()
            .with_binary("/definitely/missing/dcos")
            .with_env_lookup(|name| (name == "DCOS_URL").then(|| "https://env.example".into()));

        assert_eq!(
            config.get(DCOS_URL).as_deref(),
            Some("https://env.example")
        );
    }

    #[test]
    fn missing_binary_reports_not_found() {
        let config = DcosCliConfig::new()
            .with_binary("/definitely/missing/dcos")
            .with_env_lookup(|_| None);

        assert!(config.get(SSL_VERIFY).is_none());
    }

    #[test]
    fn blank_env_value_is_ignored() {
        let config = DcosCliConfig::new()
            .with_binary("/definitely/missing/dcos")
            .with_env_lookup(|_| Some(String::new()));

        assert!(config.get(DCOS_URL).is_none());
    }

    #[test]
    fn static_config_counts_lookups() {
        let config = StaticConfig::new().with(DCOS_URL, "https://cluster");
        assert_eq!(config.lookups(DCOS_URL), 0);
        let _ = config.get(DCOS_URL);
        let _ = config.get(DCOS_URL);
        assert_eq!(config.lookups(DCOS_URL), 2);
        assert_eq!(config.lookups(SSL_VERIFY), 0);
    }

    #[test]
    fn static_config_values_can_change() {
        let config = StaticConfig::new().with(SSL_VERIFY, "false");
        config.set(SSL_VERIFY, "true");
        assert_eq!(config.get(SSL_VERIFY).as_deref(), Some("true"));
        config.remove(SSL_VERIFY);
        assert!(config.get(SSL_VERIFY).is_none());
    }

    #[test]
    fn required_value_rejects_blank() {
        let config = StaticConfig::new().with(DCOS_URL, "   ");
        let err = required_value(&config, DCOS_URL, "DC/OS Cluster URL", DCOS_URL_HINT)
            .expect_err("blank value should be rejected");
        assert!(matches!(err, ConfigError::MissingRequired { key, .. } if key == DCOS_URL));
    }

    #[test]
    fn optional_value_trims() {
        let config = StaticConfig::new().with(DCOS_URL, " https://cluster \n");
        assert_eq!(
            optional_value(&config, DCOS_URL).as_deref(),
            Some("https://cluster")
        );
    }
}
