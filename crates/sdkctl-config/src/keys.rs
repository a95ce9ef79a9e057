//! Host CLI configuration keys and override variables.
//!
//! # Design
//! - Keep every key the client reads in one place so lookups stay auditable.
//! - Override variables are listed in precedence order.

/// Cluster base URL. Required.
pub const DCOS_URL: &str = "core.dcos_url";
/// Bearer token issued by `dcos auth login`. Optional.
pub const DCOS_ACS_TOKEN: &str = "core.dcos_acs_token";
/// TLS verification policy: `true`, `false`, or a CA bundle path. Optional.
pub const SSL_VERIFY: &str = "core.ssl_verify";
/// Package registry base URL override. Optional.
pub const COSMOS_URL: &str = "package.cosmos_url";

/// Variables that override the auth token, first set wins.
pub const AUTH_TOKEN_ENV: [&str; 2] = ["DCOS_AUTH_TOKEN", "AUTH_TOKEN"];
/// Variables that override the cluster URL, first set wins.
pub const CLUSTER_URL_ENV: [&str; 2] = ["DCOS_URI", "DCOS_URL"];

/// Remediation shown when the cluster URL cannot be found.
pub const DCOS_URL_HINT: &str =
    "Run 'dcos config set core.dcos_url http://your-cluster.com' to configure.";

/// Environment variable the host CLI consults before its config file.
///
/// `core.*` keys drop their section (`core.ssl_verify` -> `DCOS_SSL_VERIFY`),
/// other sections keep it (`package.cosmos_url` -> `DCOS_PACKAGE_COSMOS_URL`).
#[must_use]
pub fn env_name(key: &str) -> String {
    let trimmed = key.strip_prefix("core.").unwrap_or(key);
    let mut name = String::from("DCOS_");
    for ch in trimmed.chars() {
        name.push(if ch == '.' { '_' } else { ch.to_ascii_uppercase() });
    }
    name
}
