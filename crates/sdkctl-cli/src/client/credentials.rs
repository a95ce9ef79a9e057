//! Bearer token resolution.

use once_cell::sync::OnceCell;
use sdkctl_config::{HostConfig, keys::DCOS_ACS_TOKEN, optional_value};

/// Token attached to cluster requests. An empty token means anonymous access.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    token: Option<String>,
}

impl Credentials {
    /// Credentials carrying `token`; blank tokens are treated as anonymous.
    #[must_use]
    pub fn bearer(token: impl Into<String>) -> Self {
        let token = token.into();
        Self {
            token: (!token.trim().is_empty()).then(|| token.trim().to_string()),
        }
    }

    /// Anonymous credentials.
    #[must_use]
    pub const fn anonymous() -> Self {
        Self { token: None }
    }

    /// Raw token, if any.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Value for the `Authorization` header.
    #[must_use]
    pub fn header_value(&self) -> Option<String> {
        self.token.as_ref().map(|token| format!("token={token}"))
    }
}

/// Resolves the token from overrides or the host configuration.
#[derive(Debug, Default)]
pub struct CredentialResolver {
    override_token: Option<String>,
    cached: OnceCell<Credentials>,
}

impl CredentialResolver {
    /// Resolver with an optional override from `--custom-auth-token` or the
    /// token environment variables.
    #[must_use]
    pub fn new(override_token: Option<String>) -> Self {
        Self {
            override_token: override_token.filter(|token| !token.trim().is_empty()),
            cached: OnceCell::new(),
        }
    }

    /// Resolve credentials; the host is consulted at most once per session.
    pub fn resolve(&self, host: &dyn HostConfig) -> Credentials {
        if let Some(token) = &self.override_token {
            return Credentials::bearer(token.as_str());
        }
        self.cached
            .get_or_init(|| {
                optional_value(host, DCOS_ACS_TOKEN).map_or_else(Credentials::anonymous, |token| {
                    tracing::debug!("using auth token from host configuration");
                    Credentials::bearer(token)
                })
            })
            .clone()
    }
}
