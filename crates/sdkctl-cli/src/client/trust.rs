//! TLS trust resolution.
//!
//! # Design
//! - The state is derived from `core.ssl_verify` once per session and never
//!   re-derived; `--force-insecure` bypasses the cache entirely.
//! - Applying the state to a `reqwest::ClientBuilder` is the only place a CA
//!   bundle is read from disk.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use once_cell::sync::OnceCell;
use reqwest::{Certificate, ClientBuilder};
use sdkctl_config::{HostConfig, keys::SSL_VERIFY, optional_value};

use crate::client::error::QueryError;

/// Resolved certificate validation policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrustState {
    /// Nothing resolved yet.
    Unknown,
    /// Certificate validation disabled.
    Unverified,
    /// Validate against the built-in roots.
    Verified,
    /// Validate against the PEM bundle at this path only.
    SpecificCert(PathBuf),
}

/// Decides which trust policy applies to cluster requests.
#[derive(Debug, Default)]
pub struct TrustResolver {
    force_insecure: bool,
    ca_cert_path: Option<PathBuf>,
    state: OnceCell<TrustState>,
}

impl TrustResolver {
    /// Resolver honoring the `--force-insecure` and `--custom-cert-path` flags.
    #[must_use]
    pub fn new(force_insecure: bool, ca_cert_path: Option<PathBuf>) -> Self {
        Self {
            force_insecure,
            ca_cert_path,
            state: OnceCell::new(),
        }
    }

    /// Resolve the trust state, reading the host configuration on first use only.
    pub fn resolve(&self, host: &dyn HostConfig) -> TrustState {
        if self.force_insecure {
            return TrustState::Unverified;
        }
        self.state
            .get_or_init(|| {
                let state = derive_state(
                    optional_value(host, SSL_VERIFY),
                    self.ca_cert_path.as_deref(),
                );
                tracing::debug!(?state, "resolved TLS trust state");
                state
            })
            .clone()
    }

    /// The state as currently known, without consulting the host.
    #[must_use]
    pub fn current(&self) -> TrustState {
        if self.force_insecure {
            return TrustState::Unverified;
        }
        self.state.get().cloned().unwrap_or(TrustState::Unknown)
    }
}

fn derive_state(ssl_verify: Option<String>, explicit_ca: Option<&Path>) -> TrustState {
    let explicit = explicit_ca.map(Path::to_path_buf);
    match ssl_verify {
        Some(value) if value.eq_ignore_ascii_case("false") => TrustState::Unverified,
        Some(value) if value.eq_ignore_ascii_case("true") => {
            explicit.map_or(TrustState::Verified, TrustState::SpecificCert)
        }
        Some(path) => TrustState::SpecificCert(explicit.unwrap_or_else(|| PathBuf::from(path))),
        None => explicit.map_or(TrustState::Verified, TrustState::SpecificCert),
    }
}

/// Configure `builder` for `state`.
///
/// # Errors
///
/// Returns [`QueryError::CertificateRead`] when a `SpecificCert` bundle cannot
/// be read or holds no parsable certificate.
pub fn apply_trust(
    state: &TrustState,
    builder: ClientBuilder,
) -> Result<ClientBuilder, QueryError> {
    match state {
        TrustState::Unverified => Ok(builder.danger_accept_invalid_certs(true)),
        TrustState::Unknown | TrustState::Verified => Ok(builder),
        TrustState::SpecificCert(path) => {
            let pem = fs::read(path).map_err(|cause| QueryError::CertificateRead {
                path: path.clone(),
                cause,
            })?;
            let certificates =
                Certificate::from_pem_bundle(&pem).map_err(|err| QueryError::CertificateRead {
                    path: path.clone(),
                    cause: io::Error::new(io::ErrorKind::InvalidData, err.to_string()),
                })?;
            if certificates.is_empty() {
                return Err(QueryError::CertificateRead {
                    path: path.clone(),
                    cause: io::Error::new(
                        io::ErrorKind::InvalidData,
                        "no PEM certificates found in bundle",
                    ),
                });
            }
            tracing::debug!(
                path = %path.display(),
                count = certificates.len(),
                "installing custom CA bundle"
            );
            Ok(certificates
                .into_iter()
                .fold(builder.tls_built_in_root_certs(false), |builder, cert| {
                    builder.add_root_certificate(cert)
                }))
        }
    }
}
