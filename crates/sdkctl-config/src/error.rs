//! Error types for host configuration lookups.

use thiserror::Error;

/// Primary error type for host configuration lookups.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A required value was not present in the host CLI configuration.
    #[error("Unable to retrieve configuration value {description} ({key}) from the CLI.\n{hint}")]
    MissingRequired {
        /// Config key that was looked up.
        key: &'static str,
        /// Human readable name of the value.
        description: &'static str,
        /// Remediation shown to the operator.
        hint: &'static str,
    },
}

/// Convenience alias for configuration results.
pub type ConfigResult<T> = Result<T, ConfigError>;
