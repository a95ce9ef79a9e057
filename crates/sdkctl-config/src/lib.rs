#![forbid(unsafe_code)]
#![deny(
    unused_must_use,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls
)]
#![warn(missing_docs, unreachable_pub, unused)]

//! Access to the host CLI's cached cluster configuration.
//!
//! Layout: `keys.rs` (config keys and override variables), `host.rs`
//! (`HostConfig` capability plus the `dcos`-backed and in-memory
//! implementations), `overrides.rs` (flag/env override resolution),
//! `error.rs` (`ConfigError`).

pub mod error;
pub mod host;
pub mod keys;
pub mod overrides;

pub use error::{ConfigError, ConfigResult};
pub use host::{DcosCliConfig, HostConfig, StaticConfig, optional_value, required_value};
pub use overrides::{first_env, first_env_with};
